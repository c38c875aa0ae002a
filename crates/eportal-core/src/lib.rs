//! Core portal client library (config, validation, backend, session, notifications).

pub mod api;
pub mod config;
pub mod credentials;
pub mod logging;
pub mod notifications;
pub mod session;
pub mod validation;
