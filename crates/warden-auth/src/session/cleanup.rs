//! Expired and revoked token record cleanup.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{error, info};

use warden_core::error::AppError;

use crate::store::CredentialStore;

/// Handles periodic removal of token records that can no longer validate.
///
/// Validation already rejects such records; cleanup only bounds storage.
#[derive(Clone)]
pub struct TokenCleanup {
    store: Arc<dyn CredentialStore>,
}

impl std::fmt::Debug for TokenCleanup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCleanup").finish()
    }
}

impl TokenCleanup {
    /// Creates a new cleanup handler.
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Runs one cleanup cycle. Returns the number of records removed.
    pub async fn run_cleanup(&self) -> Result<u64, AppError> {
        let removed = self.store.purge_expired_tokens(Utc::now()).await?;
        if removed > 0 {
            info!(removed = removed, "Token cleanup completed");
        }
        Ok(removed)
    }

    /// Spawns a task running a cleanup cycle every `period`.
    ///
    /// Failed cycles are logged and retried on the next tick.
    pub fn spawn(self, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                if let Err(e) = self.run_cleanup().await {
                    error!(error = %e, "Token cleanup failed");
                }
            }
        })
    }
}
