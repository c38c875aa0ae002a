use eportal_core::validation::{
    validate_full_name, validate_national_id, validate_new_password,
    validate_password_confirmation,
};
use eportal_types::RegisterRequest;

use super::{Field, FormStatus};

/// New account form: national ID, full name, password and its confirmation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterForm {
    pub national_id: String,
    pub name: String,
    pub password: String,
    pub confirmation: String,
    pub status: FormStatus,
}

impl RegisterForm {
    pub fn edit(&mut self, field: Field, value: String) -> bool {
        match field {
            Field::NationalId => {
                self.status
                    .errors
                    .record(field, validate_national_id(&value));
                self.national_id = value;
            }
            Field::Name => {
                self.status.errors.record(field, validate_full_name(&value));
                self.name = value;
            }
            Field::Password => {
                self.status
                    .errors
                    .record(field, validate_new_password(&value));
                self.password = value;
                // A confirmation typed first must follow the password.
                if !self.confirmation.is_empty() {
                    self.status.errors.record(
                        Field::PasswordConfirmation,
                        validate_password_confirmation(&self.password, &self.confirmation),
                    );
                }
            }
            Field::PasswordConfirmation => {
                self.status
                    .errors
                    .record(field, validate_password_confirmation(&self.password, &value));
                self.confirmation = value;
            }
            Field::CurrentPassword => return false,
        }
        self.status.after_edit();
        true
    }

    pub fn validate_all(&mut self) -> bool {
        let errors = &mut self.status.errors;
        errors.record(Field::NationalId, validate_national_id(&self.national_id));
        errors.record(Field::Name, validate_full_name(&self.name));
        errors.record(Field::Password, validate_new_password(&self.password));
        errors.record(
            Field::PasswordConfirmation,
            validate_password_confirmation(&self.password, &self.confirmation),
        );
        self.status.after_validate_all()
    }

    pub fn request(&self) -> RegisterRequest {
        RegisterRequest {
            national_id: self.national_id.clone(),
            name: self.name.trim().to_string(),
            password: self.password.clone(),
        }
    }

    pub(crate) fn clear_secrets(&mut self) {
        self.password.clear();
        self.confirmation.clear();
    }
}
