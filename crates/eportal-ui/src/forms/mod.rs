//! Form controllers.
//!
//! Each form owns its field values, one error slot per validated field, a
//! [`FormPhase`] and an optional inline banner. Forms only hold state and run
//! validators; submitting and handling backend results is the reducer's job.

mod forgot_password;
mod login;
mod profile;
mod register;

use std::collections::BTreeMap;

use eportal_core::validation::FieldError;
use eportal_types::NotificationKind;

pub use self::forgot_password::ForgotPasswordForm;
pub use self::login::LoginForm;
pub use self::profile::ProfileForm;
pub use self::register::RegisterForm;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormKind {
    Login,
    ForgotPassword,
    Register,
    Profile,
}

impl FormKind {
    pub fn label(self) -> &'static str {
        match self {
            FormKind::Login => "login",
            FormKind::ForgotPassword => "forgot-password",
            FormKind::Register => "register",
            FormKind::Profile => "profile",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    NationalId,
    Password,
    Name,
    PasswordConfirmation,
    /// Existing password, asked for before changing it.
    CurrentPassword,
}

/// Submission state machine shared by every form.
///
/// `Idle → Validating → Submitting → {Success, Failed}`; any edit outside
/// `Submitting` returns to `Idle` (or `Validating` while errors remain).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormPhase {
    #[default]
    Idle,
    Validating,
    Submitting,
    Success,
    Failed,
}

impl FormPhase {
    /// Whether the submit control is enabled.
    pub fn can_submit(self) -> bool {
        self != FormPhase::Submitting
    }
}

/// Inline message rendered above a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: NotificationKind,
    pub message: String,
}

impl Banner {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }
}

/// Per-field validation errors. An absent entry means the field is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, FieldError>);

impl FieldErrors {
    pub fn get(&self, field: Field) -> Option<FieldError> {
        self.0.get(&field).copied()
    }

    /// Stores the outcome of validating `field`.
    pub fn record(&mut self, field: Field, outcome: Result<(), FieldError>) {
        match outcome {
            Ok(()) => {
                self.0.remove(&field);
            }
            Err(err) => {
                self.0.insert(field, err);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, FieldError)> + '_ {
        self.0.iter().map(|(field, err)| (*field, *err))
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

/// Bookkeeping shared by all forms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormStatus {
    pub errors: FieldErrors,
    pub phase: FormPhase,
    pub banner: Option<Banner>,
}

impl FormStatus {
    /// Phase after a field changed.
    pub(crate) fn after_edit(&mut self) {
        if self.phase == FormPhase::Submitting {
            return;
        }
        self.banner = None;
        self.phase = if self.errors.is_empty() {
            FormPhase::Idle
        } else {
            FormPhase::Validating
        };
    }

    /// Records a full validation pass; returns whether submission may proceed.
    pub(crate) fn after_validate_all(&mut self) -> bool {
        if self.errors.is_empty() {
            true
        } else {
            self.phase = FormPhase::Validating;
            self.banner = None;
            false
        }
    }

    pub(crate) fn submitting(&mut self) {
        self.phase = FormPhase::Submitting;
        self.banner = None;
    }

    pub(crate) fn succeeded(&mut self, banner: Option<Banner>) {
        self.phase = FormPhase::Success;
        self.banner = banner;
    }

    pub(crate) fn failed(&mut self, message: String) {
        self.phase = FormPhase::Failed;
        self.banner = Some(Banner::error(message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_errors_record_and_clear() {
        let mut errors = FieldErrors::default();
        errors.record(Field::NationalId, Err(FieldError::NationalIdLength));
        assert_eq!(errors.get(Field::NationalId), Some(FieldError::NationalIdLength));
        assert!(!errors.is_empty());

        errors.record(Field::NationalId, Ok(()));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_edit_during_submit_keeps_phase() {
        let mut status = FormStatus::default();
        status.submitting();
        status.after_edit();
        assert_eq!(status.phase, FormPhase::Submitting);
        assert!(!status.phase.can_submit());
    }

    #[test]
    fn test_edit_after_failure_returns_to_idle_and_clears_banner() {
        let mut status = FormStatus::default();
        status.failed("Cannot reach the server.".to_string());
        status.after_edit();
        assert_eq!(status.phase, FormPhase::Idle);
        assert!(status.banner.is_none());
    }
}
