// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Error handling module
//!
//! Error types for handler composition and listener supervision. Every
//! variant is fatal to the call that produced it; nothing in this crate
//! retries. Errors the serve activity reports *because* the coordinator
//! closed it during owner shutdown are deliberately absent here: they are
//! suppressed, not surfaced.

use thiserror::Error;

use crate::endpoint::{Endpoint, EndpointError};

/// Errors composing or running an HTTP interface
#[derive(Debug, Error)]
pub enum ServeError {
    /// A feature failed while the handler was being composed
    #[error("Feature installation failed: {source}")]
    Feature {
        /// Error the feature reported
        source: anyhow::Error,
    },

    /// The listen-address descriptor did not parse
    #[error(transparent)]
    Endpoint(#[from] EndpointError),

    /// The listening socket could not be acquired
    #[error("Failed to bind to {endpoint}: {source}")]
    Bind {
        /// Endpoint that failed to bind
        endpoint: Endpoint,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// The bound address could not be read back from the live socket
    #[error("Failed to read bound address: {source}")]
    Startup {
        /// Underlying IO error
        source: std::io::Error,
    },

    /// The concrete bound address could not be recorded with the owner
    #[error("Failed to record bound address under `{key}`: {source}")]
    Persist {
        /// Config key the write targeted
        key: &'static str,
        /// Error the owner's config store reported
        source: anyhow::Error,
    },

    /// The serve activity terminated unexpectedly outside a closing sequence
    #[error("Server terminated unexpectedly: {source}")]
    Serve {
        /// Underlying IO error
        source: std::io::Error,
    },

    /// The serve activity panicked or was aborted
    #[error("Server task failed: {source}")]
    TaskJoin {
        /// Underlying tokio join error
        #[source]
        source: tokio::task::JoinError,
    },
}

/// Result type for composition and serving operations
pub type ServeResult<T> = Result<T, ServeError>;
