use async_trait::async_trait;
use netadmin_core::Resource;
use serde_json::Value;

use crate::controller::{FormController, FormError, FormMode, SubmitOutcome};
use crate::draft::Draft;
use crate::schema::FormSchema;
use crate::validate::ValidationErrors;

/// Entity-erased view of a [`FormController`], so a page can hold any
/// entity's form as `Box<dyn FormSession>`.
#[async_trait]
pub trait FormSession: Send + Sync {
    fn entity(&self) -> &'static str;

    fn label(&self) -> &'static str;

    fn mode(&self) -> FormMode;

    fn schema(&self) -> &FormSchema;

    fn set_field(&self, name: &str, value: &str) -> Result<(), FormError>;

    fn validate(&self) -> ValidationErrors;

    fn reset(&self);

    fn draft(&self) -> Draft;

    fn errors(&self) -> ValidationErrors;

    fn is_busy(&self) -> bool;

    fn is_dirty(&self) -> bool;

    /// Submit; a saved record comes back as JSON.
    async fn submit(&self) -> Result<SubmitOutcome<Value>, FormError>;
}

#[async_trait]
impl<E: Resource> FormSession for FormController<E> {
    fn entity(&self) -> &'static str {
        E::NAME
    }

    fn label(&self) -> &'static str {
        E::LABEL
    }

    fn mode(&self) -> FormMode {
        FormController::mode(self)
    }

    fn schema(&self) -> &FormSchema {
        FormController::schema(self)
    }

    fn set_field(&self, name: &str, value: &str) -> Result<(), FormError> {
        FormController::set_field(self, name, value)
    }

    fn validate(&self) -> ValidationErrors {
        FormController::validate(self)
    }

    fn reset(&self) {
        FormController::reset(self)
    }

    fn draft(&self) -> Draft {
        FormController::draft(self)
    }

    fn errors(&self) -> ValidationErrors {
        FormController::errors(self)
    }

    fn is_busy(&self) -> bool {
        FormController::is_busy(self)
    }

    fn is_dirty(&self) -> bool {
        FormController::is_dirty(self)
    }

    async fn submit(&self) -> Result<SubmitOutcome<Value>, FormError> {
        Ok(match FormController::submit(self).await? {
            SubmitOutcome::Saved(response) => {
                let record = serde_json::to_value(&response.data)
                    .map_err(|e| FormError::Contract(format!("{} response: {}", E::NAME, e)))?;
                SubmitOutcome::Saved(response.map(|_| record))
            }
            SubmitOutcome::Invalid(errors) => SubmitOutcome::Invalid(errors),
            SubmitOutcome::Busy => SubmitOutcome::Busy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::tests::form;

    #[tokio::test]
    async fn erased_session_drives_controller() {
        let (api, _, ctrl) = form();
        let session: Box<dyn FormSession> = Box::new(ctrl);

        assert_eq!(session.entity(), "ont");
        assert_eq!(session.mode(), FormMode::Create);
        session.set_field("serialNumber", "ZTEG7").unwrap();
        session.set_field("locationId", "1").unwrap();
        assert!(session.is_dirty());

        let outcome = session.submit().await.unwrap();
        let SubmitOutcome::Saved(resp) = outcome else {
            panic!("expected Saved");
        };
        assert_eq!(resp.data["serialNumber"], "ZTEG7");
        assert_eq!(resp.data["id"], "new-1");
        assert_eq!(api.calls().len(), 1);
    }

    #[tokio::test]
    async fn erased_session_reports_invalid() {
        let (_, _, ctrl) = form();
        let session: Box<dyn FormSession> = Box::new(ctrl);

        let outcome = session.submit().await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Invalid(ref e) if e.contains("serialNumber")));
        assert_eq!(session.errors().len(), 2);
        session.reset();
        assert!(session.errors().is_empty());
    }
}
