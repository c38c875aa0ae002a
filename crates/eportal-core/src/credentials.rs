//! Persisted session credentials.
//!
//! The session store only needs `load`/`save`/`clear`; the file-backed store
//! keeps them in `<EPORTAL_HOME>/session.json` with restricted permissions
//! (0600). Tokens are never logged or displayed in full.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use eportal_types::{AuthenticatedUser, Permissions, Session, User};
use serde::{Deserialize, Serialize};

use crate::config::paths;

pub(crate) fn now_millis_u64() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|d| u64::try_from(d.as_millis()).ok())
        .unwrap_or(u64::MAX)
}

/// What survives a restart of the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredentials {
    #[serde(flatten)]
    pub auth: AuthenticatedUser,
    /// Expiry in milliseconds since epoch, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at_ms: Option<u64>,
}

impl StoredCredentials {
    pub fn new(user: User, permissions: Permissions, token: String) -> Self {
        let expires_at_ms = jwt_expiry_ms(&token);
        Self {
            auth: AuthenticatedUser {
                user,
                permissions,
                token,
            },
            expires_at_ms,
        }
    }

    /// Snapshot of an authenticated session, `None` when anonymous.
    pub fn from_session(session: &Session) -> Option<Self> {
        let auth = session.auth()?;
        Some(Self::new(
            auth.user.clone(),
            auth.permissions.clone(),
            auth.token.clone(),
        ))
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at_ms
            .is_some_and(|expires| now_millis_u64() >= expires)
    }

    pub fn into_session(self) -> Session {
        Session::from_auth(self.auth)
    }
}

/// Reads the `exp` claim (seconds) of a JWT and returns it in milliseconds.
///
/// Opaque tokens yield `None`.
pub fn jwt_expiry_ms(token: &str) -> Option<u64> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return None;
    }
    let decoded = URL_SAFE_NO_PAD.decode(parts[1].trim_end_matches('=')).ok()?;
    let json: serde_json::Value = serde_json::from_slice(&decoded).ok()?;
    json.get("exp")?.as_u64()?.checked_mul(1000)
}

/// Returns a masked version of a token for display (first 8 chars + ...).
pub fn mask_token(token: &str) -> String {
    if token.chars().count() <= 16 {
        return "***".to_string();
    }
    let prefix: String = token.chars().take(8).collect();
    format!("{prefix}...")
}

/// Storage for the persisted session.
pub trait CredentialStore: Send + Sync {
    /// Returns the stored credentials, if any.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be read or parsed.
    fn load(&self) -> Result<Option<StoredCredentials>>;

    /// Replaces the stored credentials.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be written.
    fn save(&self, credentials: &StoredCredentials) -> Result<()>;

    /// Removes any stored credentials. Clearing an empty store succeeds.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be removed.
    fn clear(&self) -> Result<()>;
}

/// JSON file store.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<EPORTAL_HOME>/session.json`.
    pub fn default_location() -> Self {
        Self::new(paths::credentials_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<StoredCredentials>> {
        let path = &self.path;
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read session from {}", path.display()))?;

        serde_json::from_str(&contents)
            .map(Some)
            .with_context(|| format!("Failed to parse session from {}", path.display()))
    }

    fn save(&self, credentials: &StoredCredentials) -> Result<()> {
        let path = &self.path;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents =
            serde_json::to_string_pretty(credentials).context("Failed to serialize session")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(path)
                .with_context(|| format!("Failed to open {} for writing", path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }

        #[cfg(not(unix))]
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(path)
                .with_context(|| format!("Failed to open {} for writing", path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }

        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to remove {}", self.path.display())),
        }
    }
}

/// In-process store; nothing outlives the value.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    slot: Mutex<Option<StoredCredentials>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credentials(credentials: StoredCredentials) -> Self {
        Self {
            slot: Mutex::new(Some(credentials)),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<StoredCredentials>> {
        self.slot
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<StoredCredentials>> {
        Ok(self.lock().clone())
    }

    fn save(&self, credentials: &StoredCredentials) -> Result<()> {
        *self.lock() = Some(credentials.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.lock() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    fn jwt_with_exp(exp_secs: u64) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"12345678901","exp":{exp_secs}}}"#));
        format!("{header}.{payload}.signature")
    }

    fn sample(token: String) -> StoredCredentials {
        StoredCredentials::new(
            User::new("12345678901").with_name("Ayşe"),
            ["duyurular.view"].into_iter().collect(),
            token,
        )
    }

    #[test]
    fn test_jwt_expiry_decoded() {
        let token = jwt_with_exp(1_700_000_000);
        assert_eq!(jwt_expiry_ms(&token), Some(1_700_000_000_000));
        assert_eq!(jwt_expiry_ms("opaque-token"), None);
        assert_eq!(jwt_expiry_ms("a.%%%.c"), None);
    }

    #[test]
    fn test_expiry_check() {
        let past = sample(jwt_with_exp(1));
        assert!(past.is_expired());

        let future_secs = now_millis_u64() / 1000 + 3600;
        let valid = sample(jwt_with_exp(future_secs));
        assert!(!valid.is_expired());

        let opaque = sample("opaque".to_string());
        assert!(!opaque.is_expired());
    }

    #[test]
    fn test_file_store_save_load_clear() {
        let dir = tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("nested").join("session.json"));

        assert!(store.load().unwrap().is_none());

        let creds = sample("opaque-token".to_string());
        store.save(&creds).unwrap();
        assert_eq!(store.load().unwrap(), Some(creds));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        store.clear().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_restricts_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("session.json"));
        store.save(&sample("opaque-token".to_string())).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_file_store_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();

        let err = FileCredentialStore::new(path).load().unwrap_err();
        assert!(err.to_string().contains("Failed to parse session"));
    }

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("short"), "***");
        assert_eq!(mask_token("abcdefghijklmnopqrstuvwxyz"), "abcdefgh...");
    }

    #[test]
    fn test_session_snapshot_roundtrip() {
        let creds = sample("opaque-token".to_string());
        let session = creds.clone().into_session();
        assert!(session.is_authenticated());
        assert_eq!(StoredCredentials::from_session(&session), Some(creds));
        assert_eq!(StoredCredentials::from_session(&Session::anonymous()), None);
    }
}
