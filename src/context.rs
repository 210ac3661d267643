//! Process-lifetime crypto context.
//!
//! Acquire one `CipherContext` at startup and pass it by reference to every
//! transform. It owns the validated configuration and the bounded worker
//! pool used by the parallel block scheduler; dropping it shuts the pool down.

use crate::config::CipherConfig;
use crate::error::{CipherError, Result};
use rayon::{ThreadPool, ThreadPoolBuilder};

pub struct CipherContext {
    config: CipherConfig,
    pool: ThreadPool,
}

impl CipherContext {
    pub fn new(config: CipherConfig) -> Result<Self> {
        config.validate()?;

        let mut builder =
            ThreadPoolBuilder::new().thread_name(|i| format!("bmpcipher-worker-{}", i));
        if let Some(threads) = config.threads {
            builder = builder.num_threads(threads);
        }
        let pool = builder
            .build()
            .map_err(|e| CipherError::Config(format!("worker pool: {}", e)))?;

        log::debug!(
            "cipher context ready: {} worker(s), {} PBKDF2 iterations",
            pool.current_num_threads(),
            config.iterations
        );

        Ok(Self { config, pool })
    }

    pub fn config(&self) -> &CipherConfig {
        &self.config
    }

    pub fn pool(&self) -> &ThreadPool {
        &self.pool
    }

    pub fn worker_count(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl std::fmt::Debug for CipherContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CipherContext")
            .field("config", &self.config)
            .field("workers", &self.worker_count())
            .finish()
    }
}
