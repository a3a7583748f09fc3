//! Credential storage for the current session.
//!
//! A single bearer token is held at a time. [`FileCredentialStore`] keeps it in
//! the per-user runtime directory so restarting the client inside the same
//! login session picks it up again; [`MemoryCredentialStore`] never touches
//! the disk.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::{debug, warn};

/// Name of the slot the raw token is stored under.
pub const TOKEN_SLOT: &str = "authToken";

const SESSION_DIR: &str = "stockdesk";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to write credential to {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to remove credential at {path}: {source}")]
    Remove { path: PathBuf, source: io::Error },
}

/// Holds at most one bearer token.
pub trait CredentialStore: Send + Sync {
    /// Store a token, replacing any previous one.
    ///
    /// # Errors
    /// Returns an error if the token could not be persisted.
    fn set(&self, token: SecretString) -> Result<(), SessionError>;

    /// The current token, if any.
    fn get(&self) -> Option<SecretString>;

    /// Forget the current token.
    ///
    /// # Errors
    /// Returns an error if the persisted token could not be removed.
    fn clear(&self) -> Result<(), SessionError>;
}

fn copy_secret(secret: &SecretString) -> SecretString {
    SecretString::from(secret.expose_secret().to_string())
}

#[derive(Default)]
pub struct MemoryCredentialStore {
    token: RwLock<Option<SecretString>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn set(&self, token: SecretString) -> Result<(), SessionError> {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
        Ok(())
    }

    fn get(&self) -> Option<SecretString> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(copy_secret)
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Token persisted as a raw string in `<dir>/authToken`.
///
/// The file is loaded once on open; `get()` serves the cached copy.
pub struct FileCredentialStore {
    path: PathBuf,
    token: RwLock<Option<SecretString>>,
}

impl FileCredentialStore {
    /// Open the store in the default session directory.
    ///
    /// Prefers `$XDG_RUNTIME_DIR`, which is wiped when the user logs out,
    /// and falls back to the cache directory.
    pub fn open_default() -> Self {
        let directory = dirs::runtime_dir()
            .or_else(dirs::cache_dir)
            .unwrap_or_else(std::env::temp_dir)
            .join(SESSION_DIR);
        Self::open(directory)
    }

    /// Open the store in `directory`, loading any token already there.
    pub fn open(directory: impl Into<PathBuf>) -> Self {
        let path = directory.into().join(TOKEN_SLOT);
        let token = load_token(&path);
        debug!(path = %path.display(), present = token.is_some(), "Opened credential store");
        Self {
            path,
            token: RwLock::new(token),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn load_token(path: &Path) -> Option<SecretString> {
    match fs::read_to_string(path) {
        Ok(raw) => {
            let raw = raw.trim();
            (!raw.is_empty()).then(|| SecretString::from(raw.to_string()))
        }
        Err(error) if error.kind() == io::ErrorKind::NotFound => None,
        Err(error) => {
            warn!(path = %path.display(), %error, "Ignoring unreadable credential");
            None
        }
    }
}

fn write_token(path: &Path, token: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    // `mode` only applies when the file is created.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(token.as_bytes())
}

impl CredentialStore for FileCredentialStore {
    fn set(&self, token: SecretString) -> Result<(), SessionError> {
        write_token(&self.path, token.expose_secret()).map_err(|source| SessionError::Write {
            path: self.path.clone(),
            source,
        })?;
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
        debug!("Stored credential");
        Ok(())
    }

    fn get(&self) -> Option<SecretString> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(copy_secret)
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("Cleared credential");
                Ok(())
            }
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SessionError::Remove {
                path: self.path.clone(),
                source,
            }),
        }
    }
}
