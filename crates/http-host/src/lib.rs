// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! HTTP interface hosting for long-running node daemons
//!
//! This crate turns an ordered list of route-installing features into a single
//! request handler, binds that handler to a listen address given in
//! `/ip4/<host>/tcp/<port>` notation, and supervises the running server under
//! the lifecycle of an owning node: the concrete bound address is recorded in
//! the owner's config store before serving starts, and the server is stopped
//! cleanly when the owner signals closing, even mid-request-stream.
//!
//! # Module Structure
//!
//! - [`endpoint`]: the self-describing listen-address descriptor
//! - [`mux`]: the shared-handle request router features register against
//! - [`feature`]: the route-installing feature contract and handler builder
//! - [`host`]: the owner collaborator interface the coordinator depends on
//! - [`serve`]: listener binding, address recording, and shutdown supervision
//! - [`error`]: error types for composition, binding, and serving
//!
//! # Key Properties
//!
//! - **Top-anchored composition**: a feature may substitute the mux later
//!   features register against, but the served handler stays anchored at the
//!   top-level mux so every registration remains reachable.
//! - **Fail-fast builds**: the first feature error aborts composition before
//!   any network resource is touched.
//! - **Recorded addresses**: the OS-resolved bound address is persisted into
//!   the owner's config store strictly before the accept loop starts.
//! - **Dual-source shutdown**: the coordinator reacts to whichever comes
//!   first (the server exiting on its own, or the owner closing) and waits
//!   out the owner-driven path without a deadline, logging progress.

pub mod endpoint;
pub mod error;
pub mod feature;
pub mod host;
pub mod mux;
pub mod serve;

#[cfg(test)]
pub(crate) mod test_util;

pub use endpoint::{Endpoint, EndpointError};
pub use error::{ServeError, ServeResult};
pub use feature::{BoxFeature, Feature, build_handler};
pub use host::Host;
pub use mux::Mux;
pub use serve::{
    API_ADDRESS_KEY, GracePolicy, listen_and_serve, listen_and_serve_with_policy, serve,
};
