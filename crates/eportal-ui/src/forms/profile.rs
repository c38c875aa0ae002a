use eportal_core::validation::{
    FieldError, validate_display_name, validate_optional_new_password,
    validate_password_confirmation,
};
use eportal_types::{UpdateProfileRequest, User};

use super::{Field, FormStatus};

/// Settings of the signed-in user: display name and an optional password
/// change. `Field::Password` is the new password here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub name: String,
    pub current_password: String,
    pub new_password: String,
    pub confirmation: String,
    pub status: FormStatus,
}

/// The current password is only needed when the password changes.
fn check_current_password(current: &str, new_password: &str) -> Result<(), FieldError> {
    if !new_password.is_empty() && current.is_empty() {
        Err(FieldError::PasswordEmpty)
    } else {
        Ok(())
    }
}

fn check_confirmation(new_password: &str, confirmation: &str) -> Result<(), FieldError> {
    if new_password.is_empty() && confirmation.is_empty() {
        Ok(())
    } else {
        validate_password_confirmation(new_password, confirmation)
    }
}

impl ProfileForm {
    /// Fills the name from the session unless the user already typed one.
    pub fn prefill(&mut self, user: &User) {
        if self.name.is_empty()
            && let Some(name) = &user.name
        {
            self.name.clone_from(name);
        }
    }

    pub fn edit(&mut self, field: Field, value: String) -> bool {
        match field {
            Field::Name => {
                self.status
                    .errors
                    .record(field, validate_display_name(&value));
                self.name = value;
            }
            Field::CurrentPassword => {
                self.status
                    .errors
                    .record(field, check_current_password(&value, &self.new_password));
                self.current_password = value;
            }
            Field::Password => {
                self.status
                    .errors
                    .record(field, validate_optional_new_password(&value));
                self.new_password = value;
                if !self.confirmation.is_empty() {
                    self.status.errors.record(
                        Field::PasswordConfirmation,
                        check_confirmation(&self.new_password, &self.confirmation),
                    );
                }
                if self.status.errors.get(Field::CurrentPassword).is_some() {
                    self.status.errors.record(
                        Field::CurrentPassword,
                        check_current_password(&self.current_password, &self.new_password),
                    );
                }
            }
            Field::PasswordConfirmation => {
                self.status
                    .errors
                    .record(field, check_confirmation(&self.new_password, &value));
                self.confirmation = value;
            }
            Field::NationalId => return false,
        }
        self.status.after_edit();
        true
    }

    pub fn validate_all(&mut self) -> bool {
        let errors = &mut self.status.errors;
        errors.record(Field::Name, validate_display_name(&self.name));
        errors.record(
            Field::Password,
            validate_optional_new_password(&self.new_password),
        );
        errors.record(
            Field::PasswordConfirmation,
            check_confirmation(&self.new_password, &self.confirmation),
        );
        errors.record(
            Field::CurrentPassword,
            check_current_password(&self.current_password, &self.new_password),
        );
        self.status.after_validate_all()
    }

    pub fn request(&self) -> UpdateProfileRequest {
        let changes_password = !self.new_password.is_empty();
        UpdateProfileRequest {
            name: self.name.trim().to_string(),
            password: changes_password.then(|| self.current_password.clone()),
            new_password: changes_password.then(|| self.new_password.clone()),
        }
    }

    pub(crate) fn clear_secrets(&mut self) {
        self.current_password.clear();
        self.new_password.clear();
        self.confirmation.clear();
    }
}
