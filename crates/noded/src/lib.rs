// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Node daemon hosting HTTP interfaces
//!
//! This crate provides the owning process the `http-host` coordinator runs
//! under: a [`Node`] with a closing signal, in-flight-work bookkeeping, and a
//! file-backed key-value config store, plus the built-in route features the
//! daemon serves.
//!
//! # Module Structure
//!
//! - [`config`]: node configuration with hierarchical loading and validation
//! - [`node`]: the owner: closing signal, task bookkeeping, config store
//! - [`store`]: the mutable key-value store, optionally persisted as JSON
//! - [`features`]: built-in route features (version, health, redirect, trace)

pub mod config;
pub mod features;
pub mod node;
pub mod store;

pub use config::{Environment, ListenAddr, NodeConfig, ProgressIntervalSeconds};
pub use node::Node;
pub use store::{ConfigStore, StoreError};
