//! [`Backend`] adapter over the durable [`Engine`].

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::Config;
use crate::engine::Engine;
use crate::error::{BackendError, BackendResult};

use super::Backend;

/// Durable backend: every engine call runs on tokio's blocking pool
#[derive(Clone)]
pub struct EngineBackend {
    engine: Arc<Engine>,
}

impl EngineBackend {
    /// Open (or create) the engine under `config.data_dir`
    pub async fn open(config: Config) -> BackendResult<Self> {
        let engine = tokio::task::spawn_blocking(move || Engine::open(config))
            .await
            .map_err(|e| BackendError::Task(e.to_string()))??;

        Ok(Self {
            engine: Arc::new(engine),
        })
    }

    /// Wrap an already-open engine
    pub fn from_engine(engine: Engine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    async fn run<T, F>(&self, op: F) -> BackendResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Engine) -> BackendResult<T> + Send + 'static,
    {
        let engine = Arc::clone(&self.engine);
        tokio::task::spawn_blocking(move || op(&engine))
            .await
            .map_err(|e| BackendError::Task(e.to_string()))?
    }
}

#[async_trait]
impl Backend for EngineBackend {
    async fn get(&self, key: &[u8]) -> BackendResult<Option<Vec<u8>>> {
        let key = key.to_vec();
        self.run(move |engine| engine.get(&key)).await
    }

    async fn put(&self, key: &[u8], value: &[u8]) -> BackendResult<()> {
        let key = key.to_vec();
        let value = value.to_vec();
        self.run(move |engine| engine.put(&key, &value)).await
    }

    async fn delete(&self, key: &[u8]) -> BackendResult<()> {
        let key = key.to_vec();
        self.run(move |engine| engine.delete(&key)).await
    }

    async fn scan(&self, prefix: &[u8]) -> BackendResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let prefix = prefix.to_vec();
        self.run(move |engine| engine.scan(&prefix)).await
    }

    async fn clear(&self) -> BackendResult<()> {
        self.run(|engine| engine.clear()).await
    }

    async fn close(&self) -> BackendResult<()> {
        self.run(|engine| engine.close()).await
    }
}

impl std::fmt::Debug for EngineBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineBackend")
            .field("data_dir", &self.engine.data_dir())
            .finish_non_exhaustive()
    }
}
