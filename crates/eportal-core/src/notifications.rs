//! Single-slot presenter for transient notifications.
//!
//! At most one notification is visible. Showing a new one retires the current
//! one and cancels its auto-dismiss timer. Timer expiry and explicit dismissal
//! both end in [`NotificationPresenter::dismiss`], which only acts while the
//! given id is still current, so repeated or racing dismissals are no-ops.
//!
//! Rendering layers observe the slot through [`NotificationPresenter::subscribe`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use eportal_types::{Notification, NotificationId, NotificationKind};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::NotificationsConfig;

struct Active {
    notification: Notification,
    cancel: CancellationToken,
}

struct Slot {
    next_id: u64,
    current: Option<Active>,
}

struct Shared {
    slot: Mutex<Slot>,
    tx: watch::Sender<Option<Notification>>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn dismiss(&self, id: NotificationId) -> bool {
        let mut slot = self.lock();
        if slot
            .current
            .as_ref()
            .is_none_or(|active| active.notification.id != id)
        {
            return false;
        }
        if let Some(active) = slot.current.take() {
            active.cancel.cancel();
        }
        self.tx.send_replace(None);
        true
    }
}

/// Process-wide notification slot. Cheap to clone; clones share the slot.
#[derive(Clone)]
pub struct NotificationPresenter {
    shared: Arc<Shared>,
    default_duration: Duration,
}

impl NotificationPresenter {
    pub fn new(default_duration: Duration) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            shared: Arc::new(Shared {
                slot: Mutex::new(Slot {
                    next_id: 1,
                    current: None,
                }),
                tx,
            }),
            default_duration,
        }
    }

    pub fn from_config(config: &NotificationsConfig) -> Self {
        Self::new(config.duration())
    }

    pub fn default_duration(&self) -> Duration {
        self.default_duration
    }

    /// Shows `message` for the configured default duration.
    pub fn show(&self, message: impl Into<String>, kind: NotificationKind) -> NotificationId {
        self.show_for(message, kind, self.default_duration)
    }

    /// Shows `message`, replacing whatever is visible, and schedules its
    /// dismissal after `duration`.
    ///
    /// Auto-dismiss needs a tokio runtime; without one the notification stays
    /// until dismissed or superseded.
    pub fn show_for(
        &self,
        message: impl Into<String>,
        kind: NotificationKind,
        duration: Duration,
    ) -> NotificationId {
        let cancel = CancellationToken::new();
        let notification = {
            let mut slot = self.shared.lock();
            let id = NotificationId(slot.next_id);
            slot.next_id = slot.next_id.wrapping_add(1);

            if let Some(previous) = slot.current.take() {
                previous.cancel.cancel();
                debug!(id = previous.notification.id.0, "notification superseded");
            }

            let notification = Notification {
                id,
                message: message.into(),
                kind,
                duration,
            };
            slot.current = Some(Active {
                notification: notification.clone(),
                cancel: cancel.clone(),
            });
            self.shared.tx.send_replace(Some(notification.clone()));
            notification
        };

        let id = notification.id;
        debug!(id = id.0, kind = %kind, "notification shown");
        self.schedule_dismiss(id, duration, cancel);
        id
    }

    fn schedule_dismiss(&self, id: NotificationId, duration: Duration, cancel: CancellationToken) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(id = id.0, "no async runtime; notification will not auto-dismiss");
            return;
        };
        let shared = Arc::clone(&self.shared);
        handle.spawn(async move {
            tokio::select! {
                () = cancel.cancelled() => {}
                () = tokio::time::sleep(duration) => {
                    if shared.dismiss(id) {
                        debug!(id = id.0, "notification expired");
                    }
                }
            }
        });
    }

    /// Removes the notification if it is still visible.
    ///
    /// Returns whether anything was removed; stale or repeated ids are no-ops.
    pub fn dismiss(&self, id: NotificationId) -> bool {
        self.shared.dismiss(id)
    }

    /// The visible notification, if any.
    pub fn current(&self) -> Option<Notification> {
        self.shared
            .lock()
            .current
            .as_ref()
            .map(|active| active.notification.clone())
    }

    /// Receiver that yields the visible notification on every change.
    pub fn subscribe(&self) -> watch::Receiver<Option<Notification>> {
        self.shared.tx.subscribe()
    }
}

impl std::fmt::Debug for NotificationPresenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationPresenter")
            .field("current", &self.current())
            .field("default_duration", &self.default_duration)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn presenter() -> NotificationPresenter {
        NotificationPresenter::new(Duration::from_millis(4000))
    }

    fn cancel_token_of_current(presenter: &NotificationPresenter) -> CancellationToken {
        presenter
            .shared
            .lock()
            .current
            .as_ref()
            .map(|active| active.cancel.clone())
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_dismiss_after_duration() {
        let presenter = presenter();
        let id = presenter.show("Saved", NotificationKind::Success);
        assert_eq!(presenter.current().unwrap().id, id);

        tokio::time::sleep(Duration::from_millis(3999)).await;
        assert!(presenter.current().is_some());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(presenter.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_show_twice_keeps_one_and_cancels_first_timer() {
        let presenter = presenter();
        let first = presenter.show_for("first", NotificationKind::Info, Duration::from_millis(100));
        let first_cancel = cancel_token_of_current(&presenter);

        let second =
            presenter.show_for("second", NotificationKind::Error, Duration::from_millis(1000));
        assert!(first_cancel.is_cancelled());

        let visible = presenter.current().unwrap();
        assert_eq!(visible.id, second);
        assert_eq!(visible.message, "second");
        assert_ne!(first, second);

        // Past the first timer's deadline, the second is untouched.
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(presenter.current().unwrap().id, second);

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(presenter.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_is_idempotent() {
        let presenter = presenter();
        let id = presenter.show("hello", NotificationKind::Warning);

        assert!(presenter.dismiss(id));
        assert!(!presenter.dismiss(id));
        assert!(presenter.current().is_none());

        // Timer firing after an explicit dismiss changes nothing.
        tokio::time::sleep(Duration::from_millis(5000)).await;
        assert!(presenter.current().is_none());
        assert!(!presenter.dismiss(id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_superseded_handle_is_noop() {
        let presenter = presenter();
        let first = presenter.show("first", NotificationKind::Info);
        let second = presenter.show("second", NotificationKind::Info);

        assert!(!presenter.dismiss(first));
        assert_eq!(presenter.current().unwrap().id, second);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_after_expiry_is_noop() {
        let presenter = presenter();
        let id = presenter.show_for("brief", NotificationKind::Info, Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(presenter.current().is_none());
        assert!(!presenter.dismiss(id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscriber_sees_show_and_dismiss() {
        let presenter = presenter();
        let mut rx = presenter.subscribe();
        assert!(rx.borrow_and_update().is_none());

        let id = presenter.show("hi", NotificationKind::Success);
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().as_ref().map(|n| n.id), Some(id));

        presenter.dismiss(id);
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_none());
    }

    #[test]
    fn test_show_without_runtime_keeps_notification() {
        let presenter = presenter();
        let id = presenter.show("no runtime", NotificationKind::Info);
        assert_eq!(presenter.current().unwrap().id, id);
        assert!(presenter.dismiss(id));
    }
}
