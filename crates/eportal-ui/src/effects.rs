//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! They cover I/O and task spawning only, so the reducer stays pure.

use eportal_types::{
    Credentials, ForgotPasswordRequest, NotificationKind, RegisterRequest, UpdateProfileRequest,
};

use crate::common::TaskId;

#[derive(Debug)]
pub enum UiEffect {
    /// Log in through the session store; reply with `LoginFinished`.
    SpawnLogin {
        task: TaskId,
        credentials: Credentials,
    },

    /// Reply with `ForgotPasswordFinished`.
    SpawnForgotPassword {
        task: TaskId,
        request: ForgotPasswordRequest,
    },

    /// Reply with `RegisterFinished`.
    SpawnRegister {
        task: TaskId,
        request: RegisterRequest,
    },

    /// Update the profile through the session store; reply with `ProfileFinished`.
    SpawnUpdateProfile {
        task: TaskId,
        request: UpdateProfileRequest,
    },

    /// Show a transient notification.
    Notify {
        message: String,
        kind: NotificationKind,
    },

    /// Clear the session.
    Logout,
}
