use eportal_core::validation::validate_national_id;
use eportal_types::ForgotPasswordRequest;

use super::{Field, FormStatus};

/// Password reset request, keyed by national ID.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForgotPasswordForm {
    pub national_id: String,
    pub status: FormStatus,
}

impl ForgotPasswordForm {
    pub fn edit(&mut self, field: Field, value: String) -> bool {
        if field != Field::NationalId {
            return false;
        }
        self.status
            .errors
            .record(Field::NationalId, validate_national_id(&value));
        self.national_id = value;
        self.status.after_edit();
        true
    }

    pub fn validate_all(&mut self) -> bool {
        self.status
            .errors
            .record(Field::NationalId, validate_national_id(&self.national_id));
        self.status.after_validate_all()
    }

    pub fn request(&self) -> ForgotPasswordRequest {
        ForgotPasswordRequest {
            national_id: self.national_id.clone(),
        }
    }
}
