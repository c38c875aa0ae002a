//! Framework-agnostic form controllers for the portal's account pages.
//!
//! A rendering layer feeds [`events::UiEvent`]s into a [`FormRuntime`] and
//! reads back [`AppState`]; everything with side effects stays in the runtime.

pub mod common;
pub mod effects;
pub mod events;
pub mod forms;
pub mod runtime;
pub mod state;
pub mod update;

pub use runtime::{FormRuntime, Services};
pub use state::{AppState, Route};
