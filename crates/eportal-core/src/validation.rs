//! Field validators for the portal forms.
//!
//! All validators are pure and total: every input string yields either
//! `Ok(())` or one specific `FieldError`, never a panic.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Required length of a national ID, in characters.
pub const NATIONAL_ID_LEN: usize = 11;
/// Minimum login password length.
pub const MIN_PASSWORD_LEN: usize = 6;
/// Minimum length for a password chosen at registration.
pub const MIN_NEW_PASSWORD_LEN: usize = 8;
/// Minimum length of a display name, in characters.
pub const MIN_NAME_LEN: usize = 2;

static NATIONAL_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{11}$").expect("national id pattern is valid"));

static FULL_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-ZğüşıöçĞÜŞİÖÇ ]+$").expect("full name pattern is valid")
});

const SPECIAL_CHARS: &[char] = &['?', '@', '!', '#', '%', '+', '-', '*'];

/// Why a field value was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    NationalIdEmpty,
    /// Too short or too long.
    NationalIdLength,
    NationalIdNonDigit,
    PasswordEmpty,
    PasswordTooShort,
    NameEmpty,
    NameInvalid,
    NameTooShort,
    PasswordWeak,
    PasswordMismatch,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            FieldError::NationalIdEmpty => "National ID cannot be empty",
            FieldError::NationalIdLength => "National ID must be 11 digits",
            FieldError::NationalIdNonDigit => "National ID must contain digits only",
            FieldError::PasswordEmpty => "Password cannot be empty",
            FieldError::PasswordTooShort => "Password must be at least 6 characters",
            FieldError::NameEmpty => "Name cannot be empty",
            FieldError::NameInvalid => "Name may contain letters and spaces only",
            FieldError::NameTooShort => "Name must be at least 2 characters",
            FieldError::PasswordWeak => {
                "Password must be at least 8 characters and include an upper-case letter, \
                 a lower-case letter, a digit and one of ?@!#%+-*"
            }
            FieldError::PasswordMismatch => "Passwords do not match",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for FieldError {}

/// Checks an 11-digit national ID.
///
/// Empty input is reported first, then any length other than 11, and only
/// an 11-character value with non-digits is reported as such.
///
/// # Errors
/// Returns the specific reason the value is not a national ID.
pub fn validate_national_id(value: &str) -> Result<(), FieldError> {
    if NATIONAL_ID_RE.is_match(value) {
        return Ok(());
    }
    let len = value.chars().count();
    if len == 0 {
        Err(FieldError::NationalIdEmpty)
    } else if len != NATIONAL_ID_LEN {
        Err(FieldError::NationalIdLength)
    } else {
        Err(FieldError::NationalIdNonDigit)
    }
}

/// Checks a login password.
///
/// # Errors
/// `PasswordEmpty` or `PasswordTooShort`.
pub fn validate_password(value: &str) -> Result<(), FieldError> {
    let len = value.chars().count();
    if len == 0 {
        Err(FieldError::PasswordEmpty)
    } else if len < MIN_PASSWORD_LEN {
        Err(FieldError::PasswordTooShort)
    } else {
        Ok(())
    }
}

/// Checks a display name entered at registration.
///
/// # Errors
/// `NameEmpty` for blank input, `NameInvalid` for anything but letters and
/// spaces, then `NameTooShort` below two letters.
pub fn validate_full_name(value: &str) -> Result<(), FieldError> {
    if value.trim().is_empty() {
        Err(FieldError::NameEmpty)
    } else if !FULL_NAME_RE.is_match(value) {
        Err(FieldError::NameInvalid)
    } else {
        check_name_length(value)
    }
}

/// Checks the display name on the profile form. Any characters are allowed.
///
/// # Errors
/// `NameEmpty` or `NameTooShort`.
pub fn validate_display_name(value: &str) -> Result<(), FieldError> {
    if value.trim().is_empty() {
        Err(FieldError::NameEmpty)
    } else {
        check_name_length(value)
    }
}

fn check_name_length(value: &str) -> Result<(), FieldError> {
    if value.trim().chars().count() < MIN_NAME_LEN {
        Err(FieldError::NameTooShort)
    } else {
        Ok(())
    }
}

/// Checks the optional new password of the profile form; empty keeps the
/// current password.
///
/// # Errors
/// `PasswordTooShort`.
pub fn validate_optional_new_password(value: &str) -> Result<(), FieldError> {
    if value.is_empty() {
        Ok(())
    } else {
        validate_password(value)
    }
}

/// Checks the strength of a password chosen at registration.
///
/// # Errors
/// `PasswordEmpty` or `PasswordWeak`.
pub fn validate_new_password(value: &str) -> Result<(), FieldError> {
    if value.is_empty() {
        return Err(FieldError::PasswordEmpty);
    }
    let strong = value.chars().count() >= MIN_NEW_PASSWORD_LEN
        && value.chars().any(|c| c.is_ascii_uppercase())
        && value.chars().any(|c| c.is_ascii_lowercase())
        && value.chars().any(|c| c.is_ascii_digit())
        && value.chars().any(|c| SPECIAL_CHARS.contains(&c));
    if strong {
        Ok(())
    } else {
        Err(FieldError::PasswordWeak)
    }
}

/// # Errors
/// `PasswordMismatch` when the two entries differ.
pub fn validate_password_confirmation(password: &str, confirmation: &str) -> Result<(), FieldError> {
    if password == confirmation {
        Ok(())
    } else {
        Err(FieldError::PasswordMismatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_national_id_accepts_eleven_digits() {
        assert_eq!(validate_national_id("12345678901"), Ok(()));
        assert_eq!(validate_national_id("00000000000"), Ok(()));
    }

    #[test]
    fn test_national_id_empty() {
        assert_eq!(validate_national_id(""), Err(FieldError::NationalIdEmpty));
    }

    #[test]
    fn test_national_id_wrong_length_collapses_short_and_long() {
        for value in ["123", "1234567890", "123456789012", "12a", "abcdefghijkl"] {
            assert_eq!(
                validate_national_id(value),
                Err(FieldError::NationalIdLength),
                "{value:?}"
            );
        }
        assert_eq!(
            validate_national_id("123").unwrap_err().to_string(),
            "National ID must be 11 digits"
        );
    }

    #[test]
    fn test_national_id_non_digit_at_correct_length() {
        for value in ["1234567890a", "12345 78901", "١٢٣٤٥٦٧٨٩٠١", "ğğğğğğğğğğğ"] {
            assert_eq!(
                validate_national_id(value),
                Err(FieldError::NationalIdNonDigit),
                "{value:?}"
            );
        }
    }

    #[test]
    fn test_national_id_trailing_newline_rejected() {
        assert_eq!(
            validate_national_id("12345678901\n"),
            Err(FieldError::NationalIdLength)
        );
    }

    #[test]
    fn test_password_rules() {
        assert_eq!(validate_password(""), Err(FieldError::PasswordEmpty));
        for short in ["a", "abcde", "12345"] {
            assert_eq!(validate_password(short), Err(FieldError::PasswordTooShort));
        }
        assert_eq!(validate_password("secret"), Ok(()));
        assert_eq!(validate_password("secret1"), Ok(()));
        assert_eq!(validate_password("şifreğ"), Ok(()));
    }

    #[test]
    fn test_full_name_rules() {
        assert_eq!(validate_full_name("Çağla Öztürk"), Ok(()));
        assert_eq!(validate_full_name("   "), Err(FieldError::NameEmpty));
        assert_eq!(validate_full_name("R2D2"), Err(FieldError::NameInvalid));
    }

    #[test]
    fn test_single_letter_name_too_short() {
        assert_eq!(validate_full_name("A"), Err(FieldError::NameTooShort));
        assert_eq!(validate_full_name(" Ç "), Err(FieldError::NameTooShort));
        assert_eq!(validate_full_name("Ali"), Ok(()));
        // Charset is reported before length.
        assert_eq!(validate_full_name("1"), Err(FieldError::NameInvalid));
        assert_eq!(
            validate_full_name("A").unwrap_err().to_string(),
            "Name must be at least 2 characters"
        );
    }

    #[test]
    fn test_display_name_rules() {
        assert_eq!(validate_display_name(""), Err(FieldError::NameEmpty));
        assert_eq!(validate_display_name("Z"), Err(FieldError::NameTooShort));
        assert_eq!(validate_display_name("Dr. Ayşe"), Ok(()));
    }

    #[test]
    fn test_optional_new_password() {
        assert_eq!(validate_optional_new_password(""), Ok(()));
        assert_eq!(
            validate_optional_new_password("abc"),
            Err(FieldError::PasswordTooShort)
        );
        assert_eq!(validate_optional_new_password("abcdef"), Ok(()));
    }

    #[test]
    fn test_new_password_strength() {
        assert_eq!(validate_new_password("Secret1!"), Ok(()));
        assert_eq!(validate_new_password(""), Err(FieldError::PasswordEmpty));
        for weak in ["Secret1", "secret1!", "SECRET1!", "Secretx!", "Secret12"] {
            assert_eq!(validate_new_password(weak), Err(FieldError::PasswordWeak), "{weak}");
        }
    }

    #[test]
    fn test_password_confirmation() {
        assert_eq!(validate_password_confirmation("Secret1!", "Secret1!"), Ok(()));
        assert_eq!(
            validate_password_confirmation("Secret1!", "Secret1?"),
            Err(FieldError::PasswordMismatch)
        );
    }
}
