//! Form reducer (update function).
//!
//! All state mutations happen here. The runtime calls `update(state, event)`
//! and executes the returned effects.

use eportal_core::api::AuthError;
use eportal_types::{NotificationKind, Session};
use tracing::debug;

use crate::common::TaskId;
use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::forms::{Banner, Field, FormKind};
use crate::state::{AppState, Route};

/// The main reducer function.
///
/// Takes the current state and an event, mutates state, and returns effects
/// for the runtime to execute.
pub fn update(state: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Edit { form, field, value } => {
            handle_edit(state, form, field, value);
            vec![]
        }
        UiEvent::Submit(kind) => handle_submit(state, kind),
        UiEvent::LoginFinished { task, result } => handle_login_finished(state, task, result),
        UiEvent::ForgotPasswordFinished { task, result } => {
            handle_forgot_password_finished(state, task, result)
        }
        UiEvent::RegisterFinished { task, result } => handle_register_finished(state, task, result),
        UiEvent::ProfileFinished { task, result } => handle_profile_finished(state, task, result),
        UiEvent::SessionChanged(session) => {
            state.set_session(session);
            vec![]
        }
        UiEvent::Navigate(route) => {
            state.navigate(route);
            vec![]
        }
        UiEvent::Logout => vec![UiEffect::Logout],
    }
}

fn handle_edit(state: &mut AppState, form: FormKind, field: Field, value: String) {
    let accepted = match form {
        FormKind::Login => state.login.edit(field, value),
        FormKind::ForgotPassword => state.forgot_password.edit(field, value),
        FormKind::Register => state.register.edit(field, value),
        FormKind::Profile => state.profile.edit(field, value),
    };
    if !accepted {
        debug!(form = form.label(), ?field, "ignoring edit for unknown field");
    }
}

fn handle_submit(state: &mut AppState, kind: FormKind) -> Vec<UiEffect> {
    if !state.status(kind).phase.can_submit() || state.tasks.state(kind).is_running() {
        debug!(form = kind.label(), "submit ignored while a request is in flight");
        return vec![];
    }

    let valid = match kind {
        FormKind::Login => state.login.validate_all(),
        FormKind::ForgotPassword => state.forgot_password.validate_all(),
        FormKind::Register => state.register.validate_all(),
        FormKind::Profile => state.profile.validate_all(),
    };
    if !valid {
        debug!(form = kind.label(), "submit blocked by field errors");
        return vec![];
    }

    let task = state.task_seq.next_id();
    state.tasks.state_mut(kind).start(task);
    state.status_mut(kind).submitting();

    let effect = match kind {
        FormKind::Login => UiEffect::SpawnLogin {
            task,
            credentials: state.login.credentials(),
        },
        FormKind::ForgotPassword => UiEffect::SpawnForgotPassword {
            task,
            request: state.forgot_password.request(),
        },
        FormKind::Register => UiEffect::SpawnRegister {
            task,
            request: state.register.request(),
        },
        FormKind::Profile => UiEffect::SpawnUpdateProfile {
            task,
            request: state.profile.request(),
        },
    };
    vec![effect]
}

/// Clears the active task for `kind`; false for stale completions.
fn finish(state: &mut AppState, kind: FormKind, task: TaskId) -> bool {
    let active = state.tasks.state_mut(kind).finish_if_active(task);
    if !active {
        debug!(form = kind.label(), task = task.0, "ignoring stale completion");
    }
    active
}

fn failure(state: &mut AppState, kind: FormKind, err: &AuthError) -> Vec<UiEffect> {
    debug!(form = kind.label(), error = %err, "request failed");
    let message = err.user_message();
    state.status_mut(kind).failed(message.clone());
    vec![UiEffect::Notify {
        message,
        kind: NotificationKind::Error,
    }]
}

fn handle_login_finished(
    state: &mut AppState,
    task: TaskId,
    result: Result<Session, AuthError>,
) -> Vec<UiEffect> {
    if !finish(state, FormKind::Login, task) {
        return vec![];
    }
    match result {
        Ok(session) => {
            state.login.status.succeeded(None);
            state.login.password.clear();
            state.set_session(session);
            state.navigate(Route::Panel);
            vec![]
        }
        Err(err) => failure(state, FormKind::Login, &err),
    }
}

fn handle_forgot_password_finished(
    state: &mut AppState,
    task: TaskId,
    result: Result<String, AuthError>,
) -> Vec<UiEffect> {
    if !finish(state, FormKind::ForgotPassword, task) {
        return vec![];
    }
    match result {
        Ok(message) => {
            state
                .forgot_password
                .status
                .succeeded(Some(Banner::success(message.clone())));
            vec![UiEffect::Notify {
                message,
                kind: NotificationKind::Success,
            }]
        }
        Err(err) => failure(state, FormKind::ForgotPassword, &err),
    }
}

fn handle_register_finished(
    state: &mut AppState,
    task: TaskId,
    result: Result<String, AuthError>,
) -> Vec<UiEffect> {
    if !finish(state, FormKind::Register, task) {
        return vec![];
    }
    match result {
        Ok(message) => {
            state
                .register
                .status
                .succeeded(Some(Banner::success(message.clone())));
            state.register.clear_secrets();
            if state.login.national_id.is_empty() {
                state.login.national_id = state.register.national_id.clone();
            }
            state.navigate(Route::Login);
            vec![UiEffect::Notify {
                message,
                kind: NotificationKind::Success,
            }]
        }
        Err(err) => failure(state, FormKind::Register, &err),
    }
}

/// The renamed user arrives separately as `SessionChanged`.
fn handle_profile_finished(
    state: &mut AppState,
    task: TaskId,
    result: Result<String, AuthError>,
) -> Vec<UiEffect> {
    if !finish(state, FormKind::Profile, task) {
        return vec![];
    }
    match result {
        Ok(message) => {
            state
                .profile
                .status
                .succeeded(Some(Banner::success(message.clone())));
            state.profile.clear_secrets();
            vec![UiEffect::Notify {
                message,
                kind: NotificationKind::Success,
            }]
        }
        Err(err) => failure(state, FormKind::Profile, &err),
    }
}

#[cfg(test)]
mod tests {
    use eportal_core::validation::FieldError;
    use eportal_types::{Permissions, User};

    use super::*;
    use crate::forms::FormPhase;

    fn edit(state: &mut AppState, form: FormKind, field: Field, value: &str) {
        update(
            state,
            UiEvent::Edit {
                form,
                field,
                value: value.to_string(),
            },
        );
    }

    fn filled_login() -> AppState {
        let mut state = AppState::new(Session::anonymous());
        edit(&mut state, FormKind::Login, Field::NationalId, "12345678901");
        edit(&mut state, FormKind::Login, Field::Password, "secret1");
        state
    }

    fn authenticated() -> Session {
        Session::authenticated(
            User::new("12345678901"),
            ["duyurular.view"].into_iter().collect::<Permissions>(),
            "tok",
        )
    }

    fn spawned_login_task(effects: &[UiEffect]) -> TaskId {
        match effects {
            [UiEffect::SpawnLogin { task, credentials }] => {
                assert_eq!(credentials.national_id, "12345678901");
                *task
            }
            other => panic!("expected one SpawnLogin, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_national_id_blocks_network() {
        let mut state = AppState::new(Session::anonymous());
        edit(&mut state, FormKind::Login, Field::NationalId, "123");
        edit(&mut state, FormKind::Login, Field::Password, "secret1");

        let effects = update(&mut state, UiEvent::Submit(FormKind::Login));
        assert!(effects.is_empty());
        assert_eq!(state.login.status.phase, FormPhase::Validating);
        assert_eq!(
            state.login.status.errors.get(Field::NationalId),
            Some(FieldError::NationalIdLength)
        );
        assert_eq!(
            state.login.status.errors.get(Field::NationalId).unwrap().to_string(),
            "National ID must be 11 digits"
        );
        assert!(!state.tasks.is_any_running());
    }

    #[test]
    fn test_duplicate_submit_while_pending_is_ignored() {
        let mut state = filled_login();
        let first = update(&mut state, UiEvent::Submit(FormKind::Login));
        spawned_login_task(&first);
        assert_eq!(state.login.status.phase, FormPhase::Submitting);

        let second = update(&mut state, UiEvent::Submit(FormKind::Login));
        assert!(second.is_empty());

        // Editing while submitting does not re-enable submit.
        edit(&mut state, FormKind::Login, Field::Password, "secret12");
        assert!(update(&mut state, UiEvent::Submit(FormKind::Login)).is_empty());
    }

    #[test]
    fn test_login_success_navigates_without_notification() {
        let mut state = filled_login();
        let task = spawned_login_task(&update(&mut state, UiEvent::Submit(FormKind::Login)));

        let effects = update(
            &mut state,
            UiEvent::LoginFinished {
                task,
                result: Ok(authenticated()),
            },
        );
        assert!(effects.is_empty());
        assert_eq!(state.route, Route::Panel);
        assert!(state.session.is_authenticated());
        assert_eq!(state.login.status.phase, FormPhase::Success);
        assert!(state.login.password.is_empty());
    }

    #[test]
    fn test_login_failure_notifies_and_reenables_submit() {
        let mut state = filled_login();
        let task = spawned_login_task(&update(&mut state, UiEvent::Submit(FormKind::Login)));

        let effects = update(
            &mut state,
            UiEvent::LoginFinished {
                task,
                result: Err(AuthError::InvalidCredentials),
            },
        );
        match effects.as_slice() {
            [UiEffect::Notify { message, kind }] => {
                assert_eq!(*kind, NotificationKind::Error);
                assert_eq!(*message, AuthError::InvalidCredentials.user_message());
            }
            other => panic!("expected Notify, got {other:?}"),
        }
        assert_eq!(state.login.status.phase, FormPhase::Failed);
        assert!(state.login.status.banner.is_some());
        assert_eq!(state.route, Route::Login);
        assert!(!state.session.is_authenticated());

        // Retry is possible straight away.
        spawned_login_task(&update(&mut state, UiEvent::Submit(FormKind::Login)));
    }

    #[test]
    fn test_stale_completion_is_ignored() {
        let mut state = filled_login();
        let task = spawned_login_task(&update(&mut state, UiEvent::Submit(FormKind::Login)));

        let effects = update(
            &mut state,
            UiEvent::LoginFinished {
                task: TaskId(task.0 + 100),
                result: Err(AuthError::NetworkUnreachable),
            },
        );
        assert!(effects.is_empty());
        assert_eq!(state.login.status.phase, FormPhase::Submitting);
    }

    #[test]
    fn test_forgot_password_rate_limited() {
        let mut state = AppState::new(Session::anonymous());
        update(&mut state, UiEvent::Navigate(Route::ForgotPassword));
        edit(
            &mut state,
            FormKind::ForgotPassword,
            Field::NationalId,
            "12345678901",
        );
        let effects = update(&mut state, UiEvent::Submit(FormKind::ForgotPassword));
        let task = match effects.as_slice() {
            [UiEffect::SpawnForgotPassword { task, request }] => {
                assert_eq!(request.national_id, "12345678901");
                *task
            }
            other => panic!("expected SpawnForgotPassword, got {other:?}"),
        };

        let effects = update(
            &mut state,
            UiEvent::ForgotPasswordFinished {
                task,
                result: Err(AuthError::RateLimited),
            },
        );
        match effects.as_slice() {
            [UiEffect::Notify { message, .. }] => {
                assert!(message.to_lowercase().contains("too many requests"));
            }
            other => panic!("expected Notify, got {other:?}"),
        }
        assert!(!state.session.is_authenticated());
        assert_eq!(state.route, Route::ForgotPassword);
    }

    #[test]
    fn test_register_success_returns_to_login() {
        let mut state = AppState::new(Session::anonymous());
        update(&mut state, UiEvent::Navigate(Route::Register));
        edit(&mut state, FormKind::Register, Field::NationalId, "12345678901");
        edit(&mut state, FormKind::Register, Field::Name, "Ali Veli");
        edit(&mut state, FormKind::Register, Field::Password, "Secret1!");
        edit(
            &mut state,
            FormKind::Register,
            Field::PasswordConfirmation,
            "Secret1!",
        );

        let effects = update(&mut state, UiEvent::Submit(FormKind::Register));
        let [UiEffect::SpawnRegister { task, .. }] = effects.as_slice() else {
            panic!("expected SpawnRegister, got {effects:?}");
        };
        let effects = update(
            &mut state,
            UiEvent::RegisterFinished {
                task: *task,
                result: Ok("Kayıt başarılı".to_string()),
            },
        );
        assert!(matches!(
            effects.as_slice(),
            [UiEffect::Notify {
                kind: NotificationKind::Success,
                ..
            }]
        ));
        assert_eq!(state.route, Route::Login);
        assert_eq!(state.login.national_id, "12345678901");
        assert!(state.register.password.is_empty());
    }

    #[test]
    fn test_session_changes_drive_route_guard() {
        let mut state = AppState::new(Session::anonymous());
        update(&mut state, UiEvent::SessionChanged(authenticated()));
        assert_eq!(state.route, Route::Panel);

        update(&mut state, UiEvent::SessionChanged(Session::anonymous()));
        assert_eq!(state.route, Route::Login);

        update(&mut state, UiEvent::Navigate(Route::Panel));
        assert_eq!(state.route, Route::Login);
    }

    #[test]
    fn test_logout_emits_effect_only() {
        let mut state = AppState::new(authenticated());
        let effects = update(&mut state, UiEvent::Logout);
        assert!(matches!(effects.as_slice(), [UiEffect::Logout]));
        // The route changes once the store publishes the anonymous session.
        assert_eq!(state.route, Route::Panel);
    }

    fn signed_in_settings() -> AppState {
        let session = Session::authenticated(
            User::new("12345678901").with_name("Ayşe Yılmaz"),
            Permissions::new(),
            "tok",
        );
        let mut state = AppState::new(session);
        update(&mut state, UiEvent::Navigate(Route::Settings));
        state
    }

    #[test]
    fn test_profile_short_name_blocks_network() {
        let mut state = signed_in_settings();
        assert_eq!(state.profile.name, "Ayşe Yılmaz");
        edit(&mut state, FormKind::Profile, Field::Name, "A");

        assert!(update(&mut state, UiEvent::Submit(FormKind::Profile)).is_empty());
        assert_eq!(
            state.profile.status.errors.get(Field::Name),
            Some(FieldError::NameTooShort)
        );
        assert!(!state.tasks.is_any_running());
    }

    #[test]
    fn test_profile_success_clears_passwords_and_notifies() {
        let mut state = signed_in_settings();
        edit(&mut state, FormKind::Profile, Field::CurrentPassword, "secret1");
        edit(&mut state, FormKind::Profile, Field::Password, "secret2");
        edit(&mut state, FormKind::Profile, Field::PasswordConfirmation, "secret2");

        let task = match update(&mut state, UiEvent::Submit(FormKind::Profile)).as_slice() {
            [UiEffect::SpawnUpdateProfile { task, request }] => {
                assert_eq!(request.name, "Ayşe Yılmaz");
                assert_eq!(request.new_password.as_deref(), Some("secret2"));
                *task
            }
            other => panic!("expected SpawnUpdateProfile, got {other:?}"),
        };

        let effects = update(
            &mut state,
            UiEvent::ProfileFinished {
                task,
                result: Ok("Profil güncellendi".to_string()),
            },
        );
        assert!(matches!(
            effects.as_slice(),
            [UiEffect::Notify { kind: NotificationKind::Success, .. }]
        ));
        assert_eq!(state.profile.status.phase, FormPhase::Success);
        assert!(state.profile.current_password.is_empty());
        assert!(state.profile.new_password.is_empty());
        assert!(state.profile.confirmation.is_empty());
        assert_eq!(state.route, Route::Settings);
    }

    #[test]
    fn test_profile_requires_session() {
        let mut state = AppState::new(Session::anonymous());
        update(&mut state, UiEvent::Navigate(Route::Settings));
        assert_eq!(state.route, Route::Login);
    }
}
