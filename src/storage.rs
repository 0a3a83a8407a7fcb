use std::{
    collections::HashMap,
    path::PathBuf,
    sync::Mutex,
};

use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

/// Destination for uploaded blog images.
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Stores `body` under `file_name` and returns the path recorded on the blog.
    /// An existing object with the same name is replaced.
    async fn put_object(&self, file_name: &str, body: Bytes, content_type: &str)
        -> anyhow::Result<String>;
}

/// Keeps only the final path component so a client cannot write outside the root.
pub fn sanitize_file_name(raw: &str) -> Option<String> {
    let name = raw.rsplit(|c| c == '/' || c == '\\').next()?.trim();
    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    Some(name.to_string())
}

#[derive(Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl StorageClient for LocalStorage {
    async fn put_object(
        &self,
        file_name: &str,
        body: Bytes,
        content_type: &str,
    ) -> anyhow::Result<String> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("create upload dir {}", self.root.display()))?;
        let path = self.root.join(file_name);
        tokio::fs::write(&path, &body)
            .await
            .with_context(|| format!("write upload {}", path.display()))?;
        debug!(path = %path.display(), content_type, bytes = body.len(), "upload stored");
        Ok(path.to_string_lossy().replace('\\', "/"))
    }
}

/// Holds uploads in memory; used by tests.
#[derive(Default)]
pub struct MemoryStorage {
    objects: Mutex<HashMap<String, (Bytes, String)>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, file_name: &str) -> Option<Bytes> {
        self.objects
            .lock()
            .ok()?
            .get(file_name)
            .map(|(body, _)| body.clone())
    }
}

#[async_trait]
impl StorageClient for MemoryStorage {
    async fn put_object(
        &self,
        file_name: &str,
        body: Bytes,
        content_type: &str,
    ) -> anyhow::Result<String> {
        self.objects
            .lock()
            .map_err(|_| anyhow::anyhow!("storage lock poisoned"))?
            .insert(file_name.to_string(), (body, content_type.to_string()));
        Ok(format!("uploads/{}", file_name))
    }
}
