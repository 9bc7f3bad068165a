//! Entity Form Controller.
//!
//! One generic controller drives every entity form. An entity contributes
//! only a [`FormSchema`]: the editable fields and the rule table checked
//! on every validation pass.
//!
//! ```ignore
//! let form = FormController::new(ont_schema(), hooks.mutation(), store);
//! form.initialize(FormMode::Update, Some(&record))?;
//! form.set_field("serialNumber", "ZTEG1234")?;
//! match form.submit().await? {
//!     SubmitOutcome::Saved(resp) => println!("saved {:?}", resp.data.id()),
//!     SubmitOutcome::Invalid(errors) => println!("{}", errors),
//!     SubmitOutcome::Busy => {}
//! }
//! ```

pub mod controller;
pub mod draft;
pub mod schema;
pub mod session;
pub mod validate;

pub use controller::{FormController, FormError, FormMode, SubmitOutcome};
pub use draft::Draft;
pub use schema::{FieldDef, FieldDefault, FieldKind, FormSchema};
pub use session::FormSession;
pub use validate::{Check, Rule, ValidationErrors, parse_date};
