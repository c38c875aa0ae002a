use eportal_core::validation::{validate_national_id, validate_password};
use eportal_types::Credentials;

use super::{Field, FormStatus};

/// National ID + password login form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub national_id: String,
    pub password: String,
    pub status: FormStatus,
}

impl LoginForm {
    /// Applies an edit and re-validates that field.
    ///
    /// Returns false for fields this form does not have.
    pub fn edit(&mut self, field: Field, value: String) -> bool {
        match field {
            Field::NationalId => {
                self.status
                    .errors
                    .record(Field::NationalId, validate_national_id(&value));
                self.national_id = value;
            }
            Field::Password => {
                self.status
                    .errors
                    .record(Field::Password, validate_password(&value));
                self.password = value;
            }
            Field::Name | Field::PasswordConfirmation | Field::CurrentPassword => return false,
        }
        self.status.after_edit();
        true
    }

    /// Re-runs every validator.
    pub fn validate_all(&mut self) -> bool {
        let errors = &mut self.status.errors;
        errors.record(Field::NationalId, validate_national_id(&self.national_id));
        errors.record(Field::Password, validate_password(&self.password));
        self.status.after_validate_all()
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.national_id.clone(), self.password.clone())
    }
}
