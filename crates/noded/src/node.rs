// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Node implementation module
//!
//! [`Node`] is the owning process handle the HTTP coordinator serves under:
//! it carries the closing signal, the in-flight-work tracker its teardown
//! waits on, and the mutable config store where bound addresses are recorded.

use http_host::Host;
use tokio_util::{
    sync::CancellationToken,
    task::{TaskTracker, task_tracker::TaskTrackerToken},
};
use tracing::info;

use crate::{config::NodeConfig, store::ConfigStore};

/// The daemon's owning process handle
#[derive(Debug)]
pub struct Node {
    config: NodeConfig,
    store: ConfigStore,
    closing: CancellationToken,
    tasks: TaskTracker,
}

impl Node {
    /// Create a node from configuration, opening its config store
    ///
    /// # Errors
    ///
    /// Returns an error if the configured store file cannot be opened.
    pub fn open(config: NodeConfig) -> anyhow::Result<Self> {
        let store = match &config.store_path {
            Some(path) => ConfigStore::open(path)?,
            None => ConfigStore::in_memory(),
        };
        Ok(Self::with_store(config, store))
    }

    /// Create a node with an explicit config store
    pub fn with_store(config: NodeConfig, store: ConfigStore) -> Self {
        Self {
            config,
            store,
            closing: CancellationToken::new(),
            tasks: TaskTracker::new(),
        }
    }

    /// Node configuration
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// The node's mutable key-value store
    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// Signal every task running under this node to stop
    pub fn begin_shutdown(&self) {
        info!("node shutdown requested");
        self.closing.cancel();
    }

    /// Whether shutdown has been requested
    pub fn is_closing(&self) -> bool {
        self.closing.is_cancelled()
    }

    /// Wait for every tracked task to finish
    ///
    /// Called after [`Node::begin_shutdown`] during daemon teardown.
    pub async fn shutdown(&self) {
        self.tasks.close();
        self.tasks.wait().await;
        info!("node tasks drained");
    }
}

impl Host for Node {
    fn closing(&self) -> CancellationToken {
        self.closing.clone()
    }

    fn track_work(&self) -> TaskTrackerToken {
        self.tasks.token()
    }

    fn put_config(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.store.put(key, value)?;
        Ok(())
    }

    fn get_config(&self, key: &str) -> Option<String> {
        self.store.get(key)
    }
}
