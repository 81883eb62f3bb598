//! Timeout-bounded dispatch of backend commands.
//!
//! Backend commands block (Argon2, file IO), so each one runs on tokio's
//! blocking pool while the caller awaits it with a deadline. There is no
//! cancellation: when the deadline passes the caller gets
//! `BackendTimeout`, and the command itself still runs to completion.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::backend::Backend;
use crate::errors::{PassKeeperError, Result};

#[derive(Clone)]
pub struct BackendCaller {
    backend: Arc<dyn Backend>,
    timeout: Duration,
}

impl BackendCaller {
    pub fn new(backend: Arc<dyn Backend>, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Issue one backend command and wait for its reply.
    pub async fn call<T, F>(&self, operation: &'static str, f: F) -> Result<T>
    where
        F: FnOnce(&dyn Backend) -> T + Send + 'static,
        T: Send + 'static,
    {
        let backend = Arc::clone(&self.backend);
        let task = tokio::task::spawn_blocking(move || f(backend.as_ref()));

        debug!(operation, "backend call issued");
        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(join_err)) => {
                warn!(operation, error = %join_err, "backend call aborted");
                Err(PassKeeperError::BackendUnavailable(format!(
                    "{operation}: {join_err}"
                )))
            }
            Err(_) => {
                warn!(operation, timeout = ?self.timeout, "backend call timed out");
                Err(PassKeeperError::BackendTimeout {
                    operation,
                    secs: self.timeout.as_secs(),
                })
            }
        }
    }
}
