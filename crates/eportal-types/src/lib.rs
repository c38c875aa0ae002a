//! Plain data shared across the portal client crates.
//!
//! Nothing in here performs I/O; the core and UI crates own behavior.

pub mod api;
pub mod notification;
pub mod session;

pub use api::{
    ApiEnvelope, CurrentUser, ForgotPasswordRequest, LoginData, LoginRequest, PermissionMatrix,
    RegisterRequest, UpdateProfileRequest,
};
pub use notification::{Notification, NotificationId, NotificationKind};
pub use session::{AuthenticatedUser, Credentials, Permissions, Session, User};
