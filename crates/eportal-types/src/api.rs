//! Request and response payloads of the portal backend.
//!
//! Field names follow the backend's JSON, which mixes Turkish and English
//! (`isim` is the display name, `TCNo`/`tcNo`/`tcno` the national ID).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::session::{Permissions, User};

/// `{ module: { action: granted } }` as sent by the backend.
pub type PermissionMatrix = BTreeMap<String, BTreeMap<String, bool>>;

/// Body of `POST /api/auth/login`.
#[derive(Clone, Serialize)]
pub struct LoginRequest {
    /// The national ID; the backend calls it `username`.
    pub username: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of `POST /api/auth/forgot-password`.
#[derive(Debug, Clone, Serialize)]
pub struct ForgotPasswordRequest {
    #[serde(rename = "tcNo")]
    pub national_id: String,
}

/// Body of `POST /api/auth/register`.
#[derive(Clone, Serialize)]
pub struct RegisterRequest {
    #[serde(rename = "TCNo")]
    pub national_id: String,
    #[serde(rename = "isim")]
    pub name: String,
    pub password: String,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("national_id", &self.national_id)
            .field("name", &self.name)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of `PUT /api/auth/update-profile`.
///
/// The password pair is only sent when the password changes.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct UpdateProfileRequest {
    #[serde(rename = "isim")]
    pub name: String,
    /// Current password, required by the backend to set a new one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(rename = "newPassword", skip_serializing_if = "Option::is_none")]
    pub new_password: Option<String>,
}

impl fmt::Debug for UpdateProfileRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateProfileRequest")
            .field("name", &self.name)
            .field("changes_password", &self.new_password.is_some())
            .finish_non_exhaustive()
    }
}

/// Common `{ status, message, data }` wrapper of backend responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    pub fn is_success(&self) -> bool {
        self.status.as_deref().is_none_or(|s| s == "success")
    }
}

/// `data` of a successful login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginData {
    pub token: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default, alias = "tcNo", alias = "TCNo")]
    pub tcno: Option<String>,
    #[serde(default)]
    pub isim: Option<String>,
    #[serde(default)]
    pub permissions: PermissionMatrix,
}

impl LoginData {
    /// Builds the session identity, falling back to the submitted ID.
    pub fn user(&self, submitted_national_id: &str) -> User {
        let national_id = self
            .tcno
            .clone()
            .or_else(|| self.username.clone())
            .unwrap_or_else(|| submitted_national_id.to_string());
        User {
            id: None,
            national_id,
            name: self.isim.clone(),
            status: None,
        }
    }

    pub fn permissions(&self) -> Permissions {
        Permissions::from_matrix(&self.permissions)
    }
}

/// Response of `GET /api/auth/me`.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentUser {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(alias = "tcNo", alias = "TCNo")]
    pub tcno: String,
    #[serde(default)]
    pub isim: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub permissions: PermissionMatrix,
}

impl CurrentUser {
    pub fn user(&self) -> User {
        User {
            id: self.id,
            national_id: self.tcno.clone(),
            name: self.isim.clone(),
            status: self.status.clone(),
        }
    }
}
