//! User self-registration: live field sanitizing, full-form validation and
//! submission to the identity provider and profile document store.

pub mod controller;
pub mod form;
pub mod notify;
pub mod orchestrator;
pub mod sanitize;
pub mod validation;

pub use controller::{RegistrationForm, SubmissionPhase, SubmitOutcome};
pub use form::{Field, FormState};
pub use notify::{
    APPLICATION_ROOT, Navigator, Notification, Notifier, RecordingSurface, Severity, SurfaceEvent,
};
pub use orchestrator::{
    ProfileDocument, Registered, RegistrationOutcome, RegistrationService, outcome_notification,
};
pub use sanitize::sanitize;
pub use validation::{CleanRecord, ErrorMap, validate};
