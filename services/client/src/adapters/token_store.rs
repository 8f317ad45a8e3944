//! services/client/src/adapters/token_store.rs
//!
//! Concrete implementations of the `TokenStore` port: a JSON file that
//! survives restarts, and an in-memory store for embedding and tests.

use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use unbind_core::domain::Token;
use unbind_core::ports::{PortError, PortResult, TokenStore};

/// On-disk layout: a single object with the token under the fixed key `token`.
#[derive(Serialize, Deserialize, Default)]
struct SessionFile {
    #[serde(default)]
    token: Option<String>,
}

/// Persists the bearer token in a JSON file.
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

fn io_error(path: &Path, e: std::io::Error) -> PortError {
    PortError::Unexpected(format!("Token file {}: {}", path.display(), e))
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> PortResult<Option<Token>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(&self.path, e)),
        };
        let file: SessionFile = serde_json::from_str(&raw).map_err(|e| {
            PortError::Unexpected(format!("Token file {} is corrupt: {}", self.path.display(), e))
        })?;
        Ok(file.token.filter(|t| !t.is_empty()).map(Token::new))
    }

    fn save(&self, token: &Token) -> PortResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }
        let file = SessionFile {
            token: Some(token.as_str().to_string()),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        std::fs::write(&self.path, json).map_err(|e| io_error(&self.path, e))
    }

    fn clear(&self) -> PortResult<bool> {
        // A corrupt file still gets removed; it just did not hold a usable token.
        let had_token = self.load().unwrap_or(None).is_some();
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(had_token),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error(&self.path, e)),
        }
    }
}

/// Keeps the token in process memory only.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<Token>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: Token) -> Self {
        Self {
            token: RwLock::new(Some(token)),
        }
    }
}

fn poisoned() -> PortError {
    PortError::Unexpected("token lock poisoned".to_string())
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> PortResult<Option<Token>> {
        Ok(self.token.read().map_err(|_| poisoned())?.clone())
    }

    fn save(&self, token: &Token) -> PortResult<()> {
        *self.token.write().map_err(|_| poisoned())? = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> PortResult<bool> {
        Ok(self.token.write().map_err(|_| poisoned())?.take().is_some())
    }
}
