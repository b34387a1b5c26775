//! Bearer-token storage.
//!
//! The interactive console keeps the token in memory for the lifetime of the
//! process; the one-shot CLI persists it to a file between invocations. Clearing the
//! store is how a forced logout (401 from the backend) is carried out.

use crate::{ClientError, ClientResult};
use cartao_core::AccessToken;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

pub trait TokenStore: Send + Sync {
    fn load(&self) -> ClientResult<Option<AccessToken>>;
    fn store(&self, token: &AccessToken) -> ClientResult<()>;
    fn clear(&self) -> ClientResult<()>;
}

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<AccessToken>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> ClientResult<Option<AccessToken>> {
        Ok(self
            .token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn store(&self, token: &AccessToken) -> ClientResult<()> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Token kept in a single file, removed on logout.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> ClientResult<Option<AccessToken>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(AccessToken::new(contents).ok()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ClientError::TokenStore(e)),
        }
    }

    fn store(&self, token: &AccessToken) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(ClientError::TokenStore)?;
            }
        }
        fs::write(&self.path, token.as_str()).map_err(ClientError::TokenStore)?;
        restrict_permissions(&self.path)?;
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::TokenStore(e)),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> ClientResult<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(ClientError::TokenStore)
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> ClientResult<()> {
    Ok(())
}
