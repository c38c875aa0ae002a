//! Effect handlers: async functions that perform one backend call and return
//! the completion event for the reducer.

use std::sync::Arc;

use eportal_core::api::AuthBackend;
use eportal_core::session::SessionStore;
use eportal_types::{Credentials, ForgotPasswordRequest, RegisterRequest, UpdateProfileRequest};

use crate::common::TaskId;
use crate::events::UiEvent;

pub async fn login(session: Arc<SessionStore>, task: TaskId, credentials: Credentials) -> UiEvent {
    let result = session.login(&credentials).await;
    UiEvent::LoginFinished { task, result }
}

pub async fn forgot_password(
    backend: Arc<dyn AuthBackend>,
    task: TaskId,
    request: ForgotPasswordRequest,
) -> UiEvent {
    let result = backend.forgot_password(&request).await;
    UiEvent::ForgotPasswordFinished { task, result }
}

pub async fn register(
    backend: Arc<dyn AuthBackend>,
    task: TaskId,
    request: RegisterRequest,
) -> UiEvent {
    let result = backend.register(&request).await;
    UiEvent::RegisterFinished { task, result }
}

pub async fn update_profile(
    session: Arc<SessionStore>,
    task: TaskId,
    request: UpdateProfileRequest,
) -> UiEvent {
    let result = session.update_profile(&request).await;
    UiEvent::ProfileFinished { task, result }
}
