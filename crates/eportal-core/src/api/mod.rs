//! Portal backend access.
//!
//! `AuthBackend` is the seam between the session/form logic and the network;
//! `HttpBackend` is the reqwest implementation used in production.

mod error;
mod http;

use eportal_types::{
    CurrentUser, ForgotPasswordRequest, LoginData, LoginRequest, RegisterRequest,
    UpdateProfileRequest,
};
use futures_util::future::BoxFuture;

pub use self::error::AuthError;
pub use self::http::HttpBackend;

/// Result type for backend calls.
pub type AuthResult<T> = std::result::Result<T, AuthError>;

/// Authentication endpoints of the portal backend.
pub trait AuthBackend: Send + Sync {
    /// `POST /api/auth/login`.
    fn login<'a>(&'a self, request: &'a LoginRequest) -> BoxFuture<'a, AuthResult<LoginData>>;

    /// `POST /api/auth/forgot-password`; returns the server's confirmation text.
    fn forgot_password<'a>(
        &'a self,
        request: &'a ForgotPasswordRequest,
    ) -> BoxFuture<'a, AuthResult<String>>;

    /// `POST /api/auth/register`; returns the server's confirmation text.
    fn register<'a>(&'a self, request: &'a RegisterRequest) -> BoxFuture<'a, AuthResult<String>>;

    /// `GET /api/auth/me` with a bearer token.
    fn current_user<'a>(&'a self, token: &'a str) -> BoxFuture<'a, AuthResult<CurrentUser>>;

    /// `PUT /api/auth/update-profile` with a bearer token; returns the
    /// server's confirmation text.
    fn update_profile<'a>(
        &'a self,
        token: &'a str,
        request: &'a UpdateProfileRequest,
    ) -> BoxFuture<'a, AuthResult<String>>;
}
