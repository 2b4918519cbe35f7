//! Token storage backends.
//!
//! The session token lives behind [`TokenStorage`] so the shell can plug in
//! the platform's persistent store while tests substitute an in-memory one.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use eyre::{OptionExt, Result, WrapErr};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::RwLock;

/// Abstract storage for the single session token.
#[async_trait]
pub trait TokenStorage: Send + Sync {
    async fn load_token(&self) -> Result<Option<String>>;
    async fn save_token(&self, token: &str) -> Result<()>;
    async fn remove_token(&self) -> Result<()>;
}

/// Process-local token storage. Cheap to clone; clones share the token.
#[derive(Clone, Debug, Default)]
pub struct MemoryTokenStorage {
    token: Arc<RwLock<Option<String>>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStorage for MemoryTokenStorage {
    async fn load_token(&self) -> Result<Option<String>> {
        Ok(self.token.read().await.clone())
    }

    async fn save_token(&self, token: &str) -> Result<()> {
        *self.token.write().await = Some(token.to_owned());
        Ok(())
    }

    async fn remove_token(&self) -> Result<()> {
        *self.token.write().await = None;
        Ok(())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionFile {
    token: Option<String>,
}

/// File-backed token storage under the platform config directory.
///
/// The token survives process restarts until explicitly removed.
#[derive(Clone, Debug)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    /// Storage at the default location, `<config dir>/labdesk/session.toml`.
    pub fn new() -> Result<Self> {
        let config_dir = dirs::config_dir().ok_or_eyre("could not find config directory")?;
        Ok(Self {
            path: config_dir.join("labdesk").join("session.toml"),
        })
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl TokenStorage for FileTokenStorage {
    async fn load_token(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)
            .await
            .wrap_err("failed to read session file")?;

        let session: SessionFile = toml::from_str(&contents).wrap_err("invalid session file")?;

        Ok(session.token)
    }

    async fn save_token(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let session = SessionFile {
            token: Some(token.to_owned()),
        };
        let contents = toml::to_string_pretty(&session)?;

        fs::write(&self.path, contents)
            .await
            .wrap_err("failed to write session file")?;

        Ok(())
    }

    async fn remove_token(&self) -> Result<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).wrap_err("failed to remove session file"),
        }
    }
}
