// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Owner collaborator interface
//!
//! The serving coordinator runs under the lifecycle of an owning process (a
//! node daemon) but never owns it. [`Host`] is the narrow surface it depends
//! on: a closing signal, in-flight-work bookkeeping, and a key-value config
//! store where the concrete bound address is recorded.

use tokio_util::{sync::CancellationToken, task::task_tracker::TaskTrackerToken};

/// Capabilities an owning process exposes to the serving coordinator
pub trait Host: Send + Sync {
    /// The owner's closing signal
    ///
    /// The returned token is a cheap clone; any number of observers may wait
    /// on it without blocking the owner.
    fn closing(&self) -> CancellationToken;

    /// Register in-flight work with the owner
    ///
    /// The owner's own teardown waits for all outstanding tokens. Dropping
    /// the token deregisters the work, so holding it across a serving call
    /// guarantees deregistration on every exit path.
    fn track_work(&self) -> TaskTrackerToken;

    /// Persist a value into the owner's config store
    fn put_config(&self, key: &str, value: &str) -> anyhow::Result<()>;

    /// Read a value from the owner's config store
    fn get_config(&self, key: &str) -> Option<String>;
}
