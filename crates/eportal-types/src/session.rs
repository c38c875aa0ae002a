//! Client-side session model.
//!
//! A `Session` is either anonymous or carries exactly one authenticated user
//! together with that user's permissions and bearer token. The permission set
//! lives inside the authenticated variant, so an anonymous session can never
//! report capabilities.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::api::PermissionMatrix;

static NO_PERMISSIONS: Permissions = Permissions(BTreeSet::new());

/// Identity of a portal user as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// 11-digit national ID, also the login name.
    pub national_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl User {
    pub fn new(national_id: impl Into<String>) -> Self {
        Self {
            id: None,
            national_id: national_id.into(),
            name: None,
            status: None,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Name if known, national ID otherwise.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.national_id)
    }
}

/// Capability strings granted to a user, e.g. `"duyurular.edit"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permissions(BTreeSet<String>);

impl Permissions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flattens the backend's `{ module: { action: bool } }` matrix.
    ///
    /// Only granted entries survive, as `"module.action"`.
    pub fn from_matrix(matrix: &PermissionMatrix) -> Self {
        let caps = matrix
            .iter()
            .flat_map(|(module, actions)| {
                actions
                    .iter()
                    .filter(|(_, granted)| **granted)
                    .map(move |(action, _)| format!("{module}.{action}"))
            })
            .collect();
        Self(caps)
    }

    pub fn contains(&self, capability: &str) -> bool {
        self.0.contains(capability)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for Permissions {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// The authenticated half of a session.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub user: User,
    pub permissions: Permissions,
    pub token: String,
}

impl fmt::Debug for AuthenticatedUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticatedUser")
            .field("user", &self.user)
            .field("permissions", &self.permissions)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Current authentication state of the client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    auth: Option<AuthenticatedUser>,
}

impl Session {
    /// The unauthenticated session.
    pub fn anonymous() -> Self {
        Self { auth: None }
    }

    pub fn authenticated(user: User, permissions: Permissions, token: impl Into<String>) -> Self {
        Self {
            auth: Some(AuthenticatedUser {
                user,
                permissions,
                token: token.into(),
            }),
        }
    }

    pub fn from_auth(auth: AuthenticatedUser) -> Self {
        Self { auth: Some(auth) }
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.is_some()
    }

    pub fn user(&self) -> Option<&User> {
        self.auth.as_ref().map(|a| &a.user)
    }

    /// Empty when unauthenticated.
    pub fn permissions(&self) -> &Permissions {
        self.auth
            .as_ref()
            .map_or(&NO_PERMISSIONS, |a| &a.permissions)
    }

    pub fn has_permission(&self, capability: &str) -> bool {
        self.permissions().contains(capability)
    }

    pub fn token(&self) -> Option<&str> {
        self.auth.as_ref().map(|a| a.token.as_str())
    }

    pub fn auth(&self) -> Option<&AuthenticatedUser> {
        self.auth.as_ref()
    }
}

/// Login form input. The password never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub national_id: String,
    pub password: String,
}

impl Credentials {
    pub fn new(national_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            national_id: national_id.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("national_id", &self.national_id)
            .field("password", &"<redacted>")
            .finish()
    }
}
