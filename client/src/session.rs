//! Session token persistence.
//!
//! The session store holds at most one opaque bearer credential. There is no
//! expiry tracking and no refresh: the stored token is used verbatim until the
//! backend rejects it.
//!
//! Two implementations are provided:
//!
//! - [`FileSessionStore`]: persists the token in a fixed file (`token`) inside
//!   the session directory, readable by the owner only.
//! - [`MemorySessionStore`]: process-local storage for tests and one-shot use.
//!
//! # Example
//!
//! ```no_run
//! use hookboard_client::session::{FileSessionStore, SessionStore};
//! use std::path::Path;
//!
//! let store = FileSessionStore::new(Path::new("/home/user/.hookboard"));
//! store.set_token("eyJhbGciOi...").unwrap();
//! assert!(store.get_token().is_some());
//! store.remove_token().unwrap();
//! ```

use std::fmt;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing::{debug, warn};
use zeroize::Zeroizing;

/// File name of the persisted token within the session directory.
pub const TOKEN_FILE: &str = "token";

/// Errors that can occur while persisting or clearing the session token.
#[derive(Error, Debug)]
pub enum SessionError {
    /// File system I/O error.
    #[error("session storage error: {0}")]
    Io(#[from] std::io::Error),

    /// Refused to store an empty credential.
    #[error("session token cannot be empty")]
    EmptyToken,
}

/// An opaque bearer credential.
///
/// The backing string is wiped from memory on drop and never printed by
/// `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(Zeroizing<String>);

impl SessionToken {
    /// Wraps a raw credential string.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(Zeroizing::new(token.into()))
    }

    /// Returns the raw credential for attaching to a request.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

/// Storage for the single active session credential.
pub trait SessionStore: Send + Sync {
    /// Returns the current credential, or `None` when no session is stored.
    fn get_token(&self) -> Option<SessionToken>;

    /// Persists a credential, replacing any previous one.
    fn set_token(&self, token: &str) -> Result<(), SessionError>;

    /// Clears the stored credential. Clearing an empty store succeeds.
    fn remove_token(&self) -> Result<(), SessionError>;

    /// Returns true if a credential is currently stored.
    fn has_token(&self) -> bool {
        self.get_token().is_some()
    }
}

/// Session store backed by a file in the user's session directory.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    /// Creates a store rooted at `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    /// Full path of the token file.
    #[must_use]
    pub fn token_path(&self) -> PathBuf {
        self.dir.join(TOKEN_FILE)
    }
}

impl SessionStore for FileSessionStore {
    fn get_token(&self) -> Option<SessionToken> {
        let path = self.token_path();
        match fs::read_to_string(&path) {
            Ok(contents) => {
                let contents = Zeroizing::new(contents);
                let trimmed = contents.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(SessionToken::new(trimmed))
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read session token");
                None
            }
        }
    }

    fn set_token(&self, token: &str) -> Result<(), SessionError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(SessionError::EmptyToken);
        }

        fs::create_dir_all(&self.dir)?;

        let path = self.token_path();
        let mut file = File::create(&path)?;
        file.write_all(token.as_bytes())?;

        // Owner read/write only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&path, perms)?;
        }

        debug!(path = %path.display(), "Session token stored");
        Ok(())
    }

    fn remove_token(&self) -> Result<(), SessionError> {
        let path = self.token_path();
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "Session token removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionError::Io(e)),
        }
    }
}

/// Session store that keeps the token in memory only.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    token: Mutex<Option<SessionToken>>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `token`.
    #[must_use]
    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(SessionToken::new(token))),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<SessionToken>> {
        // A poisoned lock still holds a valid Option.
        self.token.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionStore for MemorySessionStore {
    fn get_token(&self) -> Option<SessionToken> {
        self.slot().clone()
    }

    fn set_token(&self, token: &str) -> Result<(), SessionError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(SessionError::EmptyToken);
        }
        *self.slot() = Some(SessionToken::new(token));
        Ok(())
    }

    fn remove_token(&self) -> Result<(), SessionError> {
        *self.slot() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_store_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(temp_dir.path());

        assert!(store.get_token().is_none());
        assert!(!store.has_token());

        store.set_token("abc.def.ghi").unwrap();
        assert_eq!(store.get_token().unwrap().expose(), "abc.def.ghi");

        store.remove_token().unwrap();
        assert!(store.get_token().is_none());
    }

    #[test]
    fn file_store_replaces_previous_token() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(temp_dir.path());

        store.set_token("first").unwrap();
        store.set_token("second").unwrap();
        assert_eq!(store.get_token().unwrap().expose(), "second");
    }

    #[test]
    fn file_store_creates_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b");
        let store = FileSessionStore::new(&nested);

        store.set_token("tok").unwrap();
        assert!(nested.join(TOKEN_FILE).exists());
    }

    #[test]
    fn file_store_remove_when_absent_is_ok() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(temp_dir.path());
        assert!(store.remove_token().is_ok());
    }

    #[test]
    fn file_store_treats_blank_file_as_absent() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(TOKEN_FILE), "  \n").unwrap();
        let store = FileSessionStore::new(temp_dir.path());
        assert!(store.get_token().is_none());
    }

    #[test]
    fn file_store_rejects_empty_token() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(temp_dir.path());
        assert!(matches!(store.set_token(""), Err(SessionError::EmptyToken)));
    }

    #[cfg(unix)]
    #[test]
    fn file_store_sets_owner_only_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(temp_dir.path());
        store.set_token("secret").unwrap();

        let mode = std::fs::metadata(store.token_path())
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemorySessionStore::new();
        assert!(store.get_token().is_none());

        store.set_token("tok").unwrap();
        assert!(store.has_token());

        store.remove_token().unwrap();
        assert!(!store.has_token());
    }

    #[test]
    fn memory_store_with_token() {
        let store = MemorySessionStore::with_token("preset");
        assert_eq!(store.get_token().unwrap().expose(), "preset");
    }

    #[test]
    fn token_debug_is_redacted() {
        let token = SessionToken::new("super-secret");
        let printed = format!("{:?}", token);
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("redacted"));
    }
}
