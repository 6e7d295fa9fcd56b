use crate::domain::ports::TokenProvider;
use crate::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

/// Persists a random device token in a file, creating it on first use.
pub struct FileTokenProvider {
    path: PathBuf,
    cached: Mutex<Option<String>>,
}

impl FileTokenProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cached: Mutex::new(None),
        }
    }
}

#[async_trait]
impl TokenProvider for FileTokenProvider {
    async fn token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            return Ok(token.clone());
        }

        let token = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) if !contents.trim().is_empty() => contents.trim().to_string(),
            Ok(_) => self.create().await?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => self.create().await?,
            Err(e) => return Err(e.into()),
        };
        *cached = Some(token.clone());
        Ok(token)
    }
}

impl FileTokenProvider {
    async fn create(&self) -> Result<String> {
        let token = Uuid::new_v4().to_string().to_uppercase();
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, &token).await?;
        info!(path = %self.path.display(), "created device token");
        Ok(token)
    }
}
