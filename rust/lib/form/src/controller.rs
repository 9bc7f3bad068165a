use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use netadmin_core::{ApiResponse, Resource};
use netadmin_flux::StateStore;
use netadmin_query::{MutationHook, MutationOutcome, MutationRequest, QueryError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::draft::Draft;
use crate::schema::FormSchema;
use crate::validate::ValidationErrors;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormMode {
    Create,
    Update,
}

impl FormMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormMode::Create => "create",
            FormMode::Update => "update",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FormError {
    /// The backend rejected or never received the mutation.
    #[error(transparent)]
    Request(#[from] QueryError),

    /// Misuse of the controller, e.g. an update without a record id.
    #[error("contract violation: {0}")]
    Contract(String),

    #[error("{entity} has no field '{field}'")]
    UnknownField { entity: &'static str, field: String },
}

/// Result of [`FormController::submit`].
#[derive(Debug, Clone)]
pub enum SubmitOutcome<R> {
    /// Mutation accepted; the record as returned by the backend.
    Saved(ApiResponse<R>),
    /// Validation failed; nothing was sent.
    Invalid(ValidationErrors),
    /// Another submit of this controller is still in flight; nothing was sent.
    Busy,
}

struct Session {
    mode: FormMode,
    snapshot: Draft,
    draft: Draft,
    errors: ValidationErrors,
    /// Bumped by every `initialize`.
    epoch: u64,
}

/// Lifecycle of one draft across create and update sessions.
///
/// All methods take `&self`: a page holds the controller while the submit
/// future is pending and can still read the draft, errors and busy flag.
/// At most one mutation is in flight per controller.
///
/// State is mirrored to the store under `form/{entity}/draft`,
/// `form/{entity}/errors` and `form/{entity}/busy`.
pub struct FormController<E: Resource> {
    schema: Arc<FormSchema>,
    mutation: MutationHook<E>,
    store: Arc<StateStore>,
    session: Mutex<Session>,
    busy: AtomicBool,
}

impl<E: Resource> FormController<E> {
    /// Controller in create mode with a fresh template.
    pub fn new(schema: impl Into<Arc<FormSchema>>, mutation: MutationHook<E>, store: Arc<StateStore>) -> Self {
        let schema = schema.into();
        let template = schema.template(today());
        let ctrl = Self {
            schema,
            mutation,
            store,
            session: Mutex::new(Session {
                mode: FormMode::Create,
                snapshot: template.clone(),
                draft: template,
                errors: ValidationErrors::new(),
                epoch: 0,
            }),
            busy: AtomicBool::new(false),
        };
        ctrl.publish();
        ctrl
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn entity(&self) -> &'static str {
        self.schema.entity
    }

    /// Start a session.
    ///
    /// Create mode ignores `source` and loads the schema template. Update
    /// mode copies the whitelisted fields of `source`, which must carry an
    /// identifier.
    pub fn initialize(&self, mode: FormMode, source: Option<&E>) -> Result<(), FormError> {
        let draft = match mode {
            FormMode::Create => self.schema.template(today()),
            FormMode::Update => {
                let record = source.ok_or_else(|| {
                    FormError::Contract(format!("{} update needs a source record", E::NAME))
                })?;
                let id = record.id().ok_or_else(|| {
                    FormError::Contract(format!("{} record has no id", E::NAME))
                })?;
                let value = serde_json::to_value(record)
                    .map_err(|e| FormError::Contract(format!("{} record: {}", E::NAME, e)))?;
                self.schema.draft_from(id, &value)
            }
        };

        debug!(entity = E::NAME, mode = mode.as_str(), id = draft.id(), "form initialized");
        {
            let mut session = self.lock();
            session.mode = mode;
            session.snapshot = draft.clone();
            session.draft = draft;
            session.errors = ValidationErrors::new();
            session.epoch += 1;
        }
        self.publish();
        Ok(())
    }

    /// Change one field of the draft. No validation runs.
    pub fn set_field(&self, name: &str, value: impl Into<String>) -> Result<(), FormError> {
        if !self.schema.has_field(name) {
            return Err(FormError::UnknownField {
                entity: self.schema.entity,
                field: name.to_string(),
            });
        }
        let draft = {
            let mut session = self.lock();
            session.draft.set(name, value);
            session.draft.clone()
        };
        self.store.set(&self.path("draft"), draft);
        Ok(())
    }

    /// Check every rule against the current draft and keep the result as
    /// the visible error set.
    pub fn validate(&self) -> ValidationErrors {
        let errors = {
            let mut session = self.lock();
            let errors = self.schema.validate(&session.draft);
            session.errors = errors.clone();
            errors
        };
        self.store.set(&self.path("errors"), errors.clone());
        errors
    }

    /// Validate, then send the draft as one create or update mutation.
    ///
    /// Returns `Busy` without any request while an earlier submit is in
    /// flight, and `Invalid` without any request when a rule fails.
    /// Backend failures come back as [`FormError::Request`] and are not
    /// retried.
    pub async fn submit(&self) -> Result<SubmitOutcome<E>, FormError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!(entity = E::NAME, "submit ignored, previous submit in flight");
            return Ok(SubmitOutcome::Busy);
        }
        let _busy = BusyGuard(self);
        self.store.set(&self.path("busy"), true);

        let errors = self.validate();
        if !errors.is_empty() {
            info!(entity = E::NAME, fields = %errors, "submit blocked by validation");
            return Ok(SubmitOutcome::Invalid(errors));
        }

        let (mode, draft, epoch) = {
            let session = self.lock();
            (session.mode, session.draft.clone(), session.epoch)
        };
        let data = self.schema.payload(&draft);
        let request = match mode {
            FormMode::Create => MutationRequest::Create { data },
            FormMode::Update => {
                let id = draft.id().ok_or_else(|| {
                    FormError::Contract(format!("{} update draft has no id", E::NAME))
                })?;
                MutationRequest::Update {
                    id: id.to_string(),
                    data,
                }
            }
        };

        let response = match self.mutation.mutate_async(request).await? {
            MutationOutcome::Saved(response) => response,
            MutationOutcome::Deleted { id, .. } => {
                return Err(FormError::Contract(format!("{} {} was deleted by a form submit", E::NAME, id)));
            }
        };

        {
            let mut session = self.lock();
            if session.epoch != epoch {
                debug!(entity = E::NAME, "form re-initialized during submit, keeping new session");
                return Ok(SubmitOutcome::Saved(response));
            }
            match mode {
                FormMode::Create => {
                    let template = self.schema.template(today());
                    session.snapshot = template.clone();
                    session.draft = template;
                }
                FormMode::Update => session.snapshot = draft,
            }
            session.errors = ValidationErrors::new();
        }
        self.publish();
        Ok(SubmitOutcome::Saved(response))
    }

    /// Restore the draft to its last initialized snapshot and clear errors.
    pub fn reset(&self) {
        {
            let mut session = self.lock();
            session.draft = session.snapshot.clone();
            session.errors = ValidationErrors::new();
        }
        self.publish();
    }

    pub fn mode(&self) -> FormMode {
        self.lock().mode
    }

    pub fn draft(&self) -> Draft {
        self.lock().draft.clone()
    }

    pub fn errors(&self) -> ValidationErrors {
        self.lock().errors.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// `true` if the draft differs from its snapshot.
    pub fn is_dirty(&self) -> bool {
        let session = self.lock();
        session.draft != session.snapshot
    }

    pub fn mutation(&self) -> &MutationHook<E> {
        &self.mutation
    }

    fn path(&self, leaf: &str) -> String {
        format!("form/{}/{}", self.schema.entity, leaf)
    }

    fn publish(&self) {
        let (draft, errors) = {
            let session = self.lock();
            (session.draft.clone(), session.errors.clone())
        };
        self.store.set(&self.path("draft"), draft);
        self.store.set(&self.path("errors"), errors);
        self.store.set(&self.path("busy"), self.is_busy());
    }
}

/// Releases the busy flag however `submit` ends.
struct BusyGuard<'a, E: Resource>(&'a FormController<E>);

impl<E: Resource> Drop for BusyGuard<'_, E> {
    fn drop(&mut self) {
        self.0.busy.store(false, Ordering::SeqCst);
        self.0.store.set(&self.0.path("busy"), false);
    }
}

fn today() -> chrono::NaiveDate {
    chrono::Utc::now().date_naive()
}
