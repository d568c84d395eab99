//! Form controller owning one registration form instance.

use super::form::{Field, FormState};
use super::notify::{APPLICATION_ROOT, Navigator, Notification, Notifier};
use super::orchestrator::{RegistrationOutcome, RegistrationService, outcome_notification};
use super::sanitize::sanitize;
use super::validation::{ErrorMap, validate};

/// Title of the notification raised for validation failures
pub const TITLE_INVALID_FORM: &str = "Error en el formulario";

/// Where a form instance is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionPhase {
    Editing,
    Submitting,
    Registered,
}

/// What a call to [`RegistrationForm::submit`] did
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Validation failed; the errors are on the form
    Invalid,
    /// The external calls ran
    Completed(RegistrationOutcome),
    /// A previous submission of this instance never finished
    AlreadySubmitting,
    /// This instance already registered a user
    AlreadyRegistered,
}

/// One registration form: its values, its errors and its submission phase.
#[derive(Debug)]
pub struct RegistrationForm {
    state: FormState,
    errors: ErrorMap,
    phase: SubmissionPhase,
}

impl Default for RegistrationForm {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistrationForm {
    /// A form with every field empty
    pub fn new() -> Self {
        Self {
            state: FormState::default(),
            errors: ErrorMap::new(),
            phase: SubmissionPhase::Editing,
        }
    }

    /// A form filled in from a full set of raw values, each going through [`Self::edit`]
    pub fn from_state(raw: &FormState) -> Self {
        let mut form = Self::new();
        for field in Field::ALL {
            form.edit(field, raw.get(field));
        }
        form
    }

    /// Apply one user edit: sanitize the value, store it, clear the field's error.
    pub fn edit(&mut self, field: Field, raw: &str) {
        self.state.set(field, sanitize(field, raw));
        self.errors.clear(field);
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    /// Validate and, when clean, register.
    ///
    /// Each call emits at most one notification. Only a successful registration
    /// navigates, and always to the application root. The form values are left
    /// untouched whatever happens.
    pub async fn submit(
        &mut self,
        service: &RegistrationService,
        notifier: &dyn Notifier,
        navigator: &dyn Navigator,
    ) -> SubmitOutcome {
        match self.phase {
            SubmissionPhase::Submitting => return SubmitOutcome::AlreadySubmitting,
            SubmissionPhase::Registered => return SubmitOutcome::AlreadyRegistered,
            SubmissionPhase::Editing => {}
        }

        let record = match validate(&self.state) {
            Ok(record) => record,
            Err(errors) => {
                let fields: Vec<Field> = errors.fields().collect();
                tracing::debug!(?fields, "registration form invalid");
                if let Some((_, message)) = errors.first() {
                    notifier.notify(Notification::error(TITLE_INVALID_FORM, message));
                }
                self.errors = errors;
                return SubmitOutcome::Invalid;
            }
        };
        self.errors = ErrorMap::new();

        self.phase = SubmissionPhase::Submitting;
        let outcome = service.submit(&record).await;

        notifier.notify(outcome_notification(&outcome));
        if outcome.is_ok() {
            self.phase = SubmissionPhase::Registered;
            navigator.navigate_to(APPLICATION_ROOT);
        } else {
            self.phase = SubmissionPhase::Editing;
        }

        SubmitOutcome::Completed(outcome)
    }
}
