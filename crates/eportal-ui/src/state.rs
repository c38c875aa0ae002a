//! Application state for the form controllers.

use eportal_types::Session;

use crate::common::{TaskSeq, Tasks};
use crate::forms::{
    ForgotPasswordForm, FormKind, FormStatus, LoginForm, ProfileForm, RegisterForm,
};

/// Pages the portal navigates between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    ForgotPassword,
    Register,
    /// Authenticated landing page.
    Panel,
    /// Profile settings of the signed-in user.
    Settings,
}

impl Route {
    pub fn requires_auth(self) -> bool {
        matches!(self, Route::Panel | Route::Settings)
    }

    /// Applies the route guard: anonymous users cannot reach the panel and
    /// signed-in users skip the account pages.
    pub fn guarded(self, authenticated: bool) -> Route {
        match (self.requires_auth(), authenticated) {
            (true, false) => Route::Login,
            (false, true) => Route::Panel,
            _ => self,
        }
    }
}

#[derive(Debug)]
pub struct AppState {
    pub route: Route,
    /// Last session published by the store.
    pub session: Session,
    pub login: LoginForm,
    pub forgot_password: ForgotPasswordForm,
    pub register: RegisterForm,
    pub profile: ProfileForm,
    pub tasks: Tasks,
    pub task_seq: TaskSeq,
}

impl AppState {
    pub fn new(session: Session) -> Self {
        let route = Route::Login.guarded(session.is_authenticated());
        let mut profile = ProfileForm::default();
        if let Some(user) = session.user() {
            profile.prefill(user);
        }
        Self {
            route,
            session,
            login: LoginForm::default(),
            forgot_password: ForgotPasswordForm::default(),
            register: RegisterForm::default(),
            profile,
            tasks: Tasks::default(),
            task_seq: TaskSeq::default(),
        }
    }

    pub fn status(&self, kind: FormKind) -> &FormStatus {
        match kind {
            FormKind::Login => &self.login.status,
            FormKind::ForgotPassword => &self.forgot_password.status,
            FormKind::Register => &self.register.status,
            FormKind::Profile => &self.profile.status,
        }
    }

    pub(crate) fn status_mut(&mut self, kind: FormKind) -> &mut FormStatus {
        match kind {
            FormKind::Login => &mut self.login.status,
            FormKind::ForgotPassword => &mut self.forgot_password.status,
            FormKind::Register => &mut self.register.status,
            FormKind::Profile => &mut self.profile.status,
        }
    }

    pub(crate) fn navigate(&mut self, route: Route) {
        self.route = route.guarded(self.session.is_authenticated());
    }

    /// Adopts a published session and re-applies the route guard.
    ///
    /// The profile form follows the signed-in user and is reset on sign-out.
    pub(crate) fn set_session(&mut self, session: Session) {
        self.session = session;
        match self.session.user() {
            Some(user) => self.profile.prefill(user),
            None => self.profile = ProfileForm::default(),
        }
        self.navigate(self.route);
    }
}

#[cfg(test)]
mod tests {
    use eportal_types::{Permissions, User};

    use super::*;

    #[test]
    fn test_initial_route_follows_session() {
        assert_eq!(AppState::new(Session::anonymous()).route, Route::Login);
        let session = Session::authenticated(User::new("12345678901"), Permissions::new(), "t");
        assert_eq!(AppState::new(session).route, Route::Panel);
    }

    #[test]
    fn test_route_guard() {
        assert_eq!(Route::Panel.guarded(false), Route::Login);
        assert_eq!(Route::Register.guarded(false), Route::Register);
        assert_eq!(Route::ForgotPassword.guarded(true), Route::Panel);
        assert_eq!(Route::Panel.guarded(true), Route::Panel);
        assert_eq!(Route::Settings.guarded(false), Route::Login);
        assert_eq!(Route::Settings.guarded(true), Route::Settings);
    }

    #[test]
    fn test_profile_follows_session() {
        let user = User::new("12345678901").with_name("Ayşe Yılmaz");
        let session = Session::authenticated(user, Permissions::new(), "t");
        let mut state = AppState::new(session);
        assert_eq!(state.profile.name, "Ayşe Yılmaz");

        state.set_session(Session::anonymous());
        assert!(state.profile.name.is_empty());
        assert_eq!(state.route, Route::Login);
    }
}
