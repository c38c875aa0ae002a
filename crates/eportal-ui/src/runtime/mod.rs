//! Form runtime: owns the state, executes effects.
//!
//! All side effects happen here. The reducer stays pure and produces effects;
//! this module executes them.
//!
//! ## Inbox Pattern
//!
//! Spawned handlers and the session watcher send `UiEvent`s to `inbox_tx`.
//! The runtime drains `inbox_rx` and feeds each event back through the
//! reducer, so state is only ever mutated on the runtime's side.

mod handlers;

use std::future::Future;
use std::sync::Arc;

use eportal_core::api::AuthBackend;
use eportal_core::notifications::NotificationPresenter;
use eportal_core::session::SessionStore;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::AppState;
use crate::update;

/// Services the runtime drives, created once at startup.
#[derive(Clone)]
pub struct Services {
    pub session: Arc<SessionStore>,
    pub backend: Arc<dyn AuthBackend>,
    pub notifications: NotificationPresenter,
}

pub struct FormRuntime {
    pub state: AppState,
    services: Services,
    inbox_tx: mpsc::UnboundedSender<UiEvent>,
    inbox_rx: mpsc::UnboundedReceiver<UiEvent>,
    session_watch: JoinHandle<()>,
}

impl FormRuntime {
    /// Creates the runtime and starts forwarding session changes.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(services: Services) -> Self {
        let state = AppState::new(services.session.get_session());
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        let session_watch = spawn_session_watch(&services.session, inbox_tx.clone());
        Self {
            state,
            services,
            inbox_tx,
            inbox_rx,
            session_watch,
        }
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Runs one event through the reducer and executes its effects.
    pub fn dispatch(&mut self, event: UiEvent) {
        let effects = update::update(&mut self.state, event);
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    /// Dispatches every event already waiting in the inbox.
    pub fn drain_inbox(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.inbox_rx.try_recv() {
            self.dispatch(event);
            handled += 1;
        }
        handled
    }

    /// Waits until no backend call is in flight, dispatching completions as
    /// they arrive, then drains whatever else is queued.
    pub async fn settle(&mut self) {
        while self.state.tasks.is_any_running() {
            match self.inbox_rx.recv().await {
                Some(event) => self.dispatch(event),
                None => break,
            }
        }
        tokio::task::yield_now().await;
        self.drain_inbox();
    }

    fn spawn_effect<F>(&self, fut: F)
    where
        F: Future<Output = UiEvent> + Send + 'static,
    {
        let tx = self.inbox_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(fut.await);
        });
    }

    fn execute_effect(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::SpawnLogin { task, credentials } => {
                debug!(task = task.0, "spawning login");
                self.spawn_effect(handlers::login(
                    Arc::clone(&self.services.session),
                    task,
                    credentials,
                ));
            }
            UiEffect::SpawnForgotPassword { task, request } => {
                debug!(task = task.0, "spawning forgot-password");
                self.spawn_effect(handlers::forgot_password(
                    Arc::clone(&self.services.backend),
                    task,
                    request,
                ));
            }
            UiEffect::SpawnRegister { task, request } => {
                debug!(task = task.0, "spawning register");
                self.spawn_effect(handlers::register(
                    Arc::clone(&self.services.backend),
                    task,
                    request,
                ));
            }
            UiEffect::SpawnUpdateProfile { task, request } => {
                debug!(task = task.0, "spawning profile update");
                self.spawn_effect(handlers::update_profile(
                    Arc::clone(&self.services.session),
                    task,
                    request,
                ));
            }
            UiEffect::Notify { message, kind } => {
                self.services.notifications.show(message, kind);
            }
            UiEffect::Logout => self.services.session.logout(),
        }
    }
}

impl Drop for FormRuntime {
    fn drop(&mut self) {
        self.session_watch.abort();
    }
}

fn spawn_session_watch(
    session: &SessionStore,
    tx: mpsc::UnboundedSender<UiEvent>,
) -> JoinHandle<()> {
    let mut rx = session.subscribe();
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let current = rx.borrow_and_update().clone();
            if tx.send(UiEvent::SessionChanged(current)).is_err() {
                break;
            }
        }
    })
}
