//! Events consumed by the reducer.

use eportal_core::api::AuthError;
use eportal_types::Session;

use crate::common::TaskId;
use crate::forms::{Field, FormKind};
use crate::state::Route;

#[derive(Debug)]
pub enum UiEvent {
    /// A field value changed.
    Edit {
        form: FormKind,
        field: Field,
        value: String,
    },
    /// The submit control was activated.
    Submit(FormKind),

    LoginFinished {
        task: TaskId,
        result: Result<Session, AuthError>,
    },
    ForgotPasswordFinished {
        task: TaskId,
        result: Result<String, AuthError>,
    },
    RegisterFinished {
        task: TaskId,
        result: Result<String, AuthError>,
    },
    ProfileFinished {
        task: TaskId,
        result: Result<String, AuthError>,
    },

    /// The session store published a new session.
    SessionChanged(Session),
    Navigate(Route),
    Logout,
}
