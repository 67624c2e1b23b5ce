//! Bearer token storage.
//!
//! The token is read before every request and cleared when the backend
//! answers 401. When a path is configured it survives restarts as a small
//! JSON file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::errors::{ApiError, Result};

/// On-disk shape of the persisted token.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedToken {
    access_token: String,
}

/// Shared handle to the current access token.
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    token: Arc<RwLock<Option<String>>>,
    path: Option<PathBuf>,
}

impl TokenStore {
    /// Token kept in memory only.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Token persisted to `path`; an existing file is loaded eagerly.
    pub fn persistent(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let token = load_token(&path);
        Self {
            token: Arc::new(RwLock::new(token)),
            path: Some(path),
        }
    }

    pub fn get(&self) -> Option<String> {
        self.token.read().clone()
    }

    /// Store a new token, writing it through to disk when persistent.
    pub fn set(&self, token: impl Into<String>) -> Result<()> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ApiError::Validation("access token is empty".to_string()));
        }
        if let Some(path) = &self.path {
            let body = serde_json::to_vec(&PersistedToken {
                access_token: token.clone(),
            })?;
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).ok();
            }
            std::fs::write(path, body)
                .map_err(|e| ApiError::Config(format!("cannot write {}: {}", path.display(), e)))?;
        }
        *self.token.write() = Some(token);
        Ok(())
    }

    /// Forget the token. Never fails; a stale file is logged and left behind.
    pub fn clear(&self) {
        *self.token.write() = None;
        if let Some(path) = &self.path {
            if path.exists() {
                if let Err(e) = std::fs::remove_file(path) {
                    tracing::warn!("Failed to remove token file {}: {}", path.display(), e);
                }
            }
        }
    }

    /// Value for the Authorization header, if a token is present.
    pub fn bearer(&self) -> Option<String> {
        self.get().map(|token| format!("Bearer {}", token))
    }
}

fn load_token(path: &Path) -> Option<String> {
    let raw = std::fs::read(path).ok()?;
    match serde_json::from_slice::<PersistedToken>(&raw) {
        Ok(persisted) if !persisted.access_token.is_empty() => Some(persisted.access_token),
        Ok(_) => None,
        Err(e) => {
            tracing::warn!("Ignoring unreadable token file {}: {}", path.display(), e);
            None
        }
    }
}
