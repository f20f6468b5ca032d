//! Control over the pages the cache serves.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::Result;

/// Takes control of every open client once the cache is activated.
#[async_trait]
pub trait ClientController: Send + Sync {
    async fn claim(&self) -> Result<()>;
}

/// Controller for a single local process.
#[derive(Debug, Default)]
pub struct LocalClients {
    claimed: AtomicBool,
}

impl LocalClients {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_claimed(&self) -> bool {
        self.claimed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClientController for LocalClients {
    async fn claim(&self) -> Result<()> {
        if !self.claimed.swap(true, Ordering::SeqCst) {
            tracing::debug!("Claimed local clients");
        }
        Ok(())
    }
}
