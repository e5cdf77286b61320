use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::sync::Mutex;
use tracing::info;

use super::record::SessionRecord;

/// Durable storage for the session record.
///
/// The flow only ever holds one record; `load` on an empty store returns
/// the default (no transcript, no pending payment).
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self) -> Result<SessionRecord>;
    async fn save(&self, record: &SessionRecord) -> Result<()>;
    async fn clear(&self) -> Result<()>;
}

#[async_trait::async_trait]
impl<T: SessionStore + ?Sized> SessionStore for std::sync::Arc<T> {
    async fn load(&self) -> Result<SessionRecord> {
        (**self).load().await
    }

    async fn save(&self, record: &SessionRecord) -> Result<()> {
        (**self).save(record).await
    }

    async fn clear(&self) -> Result<()> {
        (**self).clear().await
    }
}

/// In-memory store; lives as long as the page would.
#[derive(Default)]
pub struct MemoryStore {
    record: Mutex<SessionRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl SessionStore for MemoryStore {
    async fn load(&self) -> Result<SessionRecord> {
        Ok(self.record.lock().await.clone())
    }

    async fn save(&self, record: &SessionRecord) -> Result<()> {
        *self.record.lock().await = record.clone();
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.record.lock().await = SessionRecord::default();
        Ok(())
    }
}

/// File-backed store: survives the full-page navigation to the payment
/// origin. Saves go through a sibling temp file and a rename so a crash
/// mid-write never leaves a half-written record.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("tmp")
    }
}

#[async_trait::async_trait]
impl SessionStore for JsonFileStore {
    async fn load(&self) -> Result<SessionRecord> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("Corrupt session record at {}", self.path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(SessionRecord::default()),
            Err(e) => Err(e).with_context(|| {
                format!("Failed to read session record at {}", self.path.display())
            }),
        }
    }

    async fn save(&self, record: &SessionRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("Failed to create session store directory")?;
        }

        let bytes = serde_json::to_vec_pretty(record)?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, &bytes)
            .await
            .with_context(|| format!("Failed to write session record at {}", temp.display()))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .context("Failed to install session record")?;

        info!("Session record saved to {}", self.path.display());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| {
                format!("Failed to clear session record at {}", self.path.display())
            }),
        }
    }
}
