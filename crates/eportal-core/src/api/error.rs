//! Classification of backend failures.

use std::fmt;

use serde_json::Value;

/// Failure of a backend call, classified for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// 401: wrong national ID or password, or an expired token.
    InvalidCredentials,
    /// 404: no user with this national ID.
    NotFound,
    /// 429: the backend is throttling this client.
    RateLimited,
    /// 5xx.
    ServerError { status: u16 },
    /// The request never produced an HTTP response (connect, DNS, timeout).
    NetworkUnreachable,
    /// An authenticated call was attempted without a session.
    NotAuthenticated,
    /// 400/409 with a message the backend meant for the user.
    Rejected { status: u16, message: String },
    /// Anything else. The detail is for logs only.
    Unexpected(String),
}

impl AuthError {
    /// Classifies a non-success HTTP status.
    ///
    /// The body is only consulted for 400/409, whose `message` field is shown
    /// to the user; every other body stays out of the user-facing text.
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            401 => AuthError::InvalidCredentials,
            404 => AuthError::NotFound,
            429 => AuthError::RateLimited,
            500..=599 => AuthError::ServerError { status },
            400 | 409 => match server_message(body) {
                Some(message) => AuthError::Rejected { status, message },
                None => AuthError::Unexpected(format!("HTTP {status} without message")),
            },
            _ => AuthError::Unexpected(format!("HTTP {status}")),
        }
    }

    /// Classifies a transport error from reqwest.
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() || err.is_request() {
            AuthError::NetworkUnreachable
        } else if err.is_decode() || err.is_body() {
            AuthError::Unexpected(format!("Malformed response: {err}"))
        } else if let Some(status) = err.status() {
            AuthError::from_status(status.as_u16(), "")
        } else {
            AuthError::Unexpected(err.to_string())
        }
    }

    /// Text shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::InvalidCredentials => {
                "Invalid national ID or password. Please check your details.".to_string()
            }
            AuthError::NotFound => "No user is registered with this national ID.".to_string(),
            AuthError::RateLimited => {
                "Too many requests. Please wait a while and try again.".to_string()
            }
            AuthError::ServerError { .. } => {
                "The server could not complete the request. Please try again later.".to_string()
            }
            AuthError::NetworkUnreachable => {
                "Cannot reach the server. Please check your internet connection.".to_string()
            }
            AuthError::NotAuthenticated => {
                "You are not logged in. Please log in first.".to_string()
            }
            AuthError::Rejected { message, .. } => message.clone(),
            AuthError::Unexpected(_) => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "invalid credentials (HTTP 401)"),
            AuthError::NotFound => write!(f, "unknown identity (HTTP 404)"),
            AuthError::RateLimited => write!(f, "rate limited (HTTP 429)"),
            AuthError::ServerError { status } => write!(f, "server error (HTTP {status})"),
            AuthError::NetworkUnreachable => write!(f, "network unreachable"),
            AuthError::NotAuthenticated => write!(f, "no active session"),
            AuthError::Rejected { status, message } => {
                write!(f, "rejected (HTTP {status}): {message}")
            }
            AuthError::Unexpected(detail) => write!(f, "unexpected failure: {detail}"),
        }
    }
}

impl std::error::Error for AuthError {}

/// Extracts `message` from a `{ "status": "error", "message": ... }` body.
fn server_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    let message = json.get("message")?.as_str()?.trim();
    (!message.is_empty()).then(|| message.to_string())
}
