// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Shared-handle request router module
//!
//! This module provides [`Mux`], the routing table features register their
//! handlers against. A `Mux` is a cheaply clonable handle to one shared
//! routing table: registrations made through any clone are visible through
//! every other clone. That property is what lets a feature substitute the mux
//! later features see: it mounts a fresh mux into the current one with
//! [`Mux::delegate`] and hands the fresh handle onward, while the top-level
//! handle still reaches everything.

use std::{
    convert::Infallible,
    sync::{Arc, PoisonError, RwLock},
    task::{Context, Poll},
};

use axum::{
    Router,
    extract::Request,
    response::{IntoResponse, Response},
    routing::MethodRouter,
};
use tower::{Service, ServiceExt, util::Oneshot};

/// A shared handle to one request-routing table
#[derive(Debug, Clone, Default)]
pub struct Mux {
    inner: Arc<RwLock<Router>>,
}

impl Mux {
    /// Create an empty routing table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for `path`
    ///
    /// The registration is visible through every clone of this handle.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route path or conflicts with an
    /// existing registration, matching [`Router::route`].
    pub fn route(&self, path: &str, method_router: MethodRouter) {
        self.update(|router| router.route(path, method_router));
    }

    /// Install `service` as the fallback for every request no registered
    /// route matches
    ///
    /// Routes registered on this mux, before or after delegation, keep
    /// priority over the delegate. Delegating to another [`Mux`] (possibly
    /// wrapped in tower layers) is how a feature mediates requests for
    /// everything installed after it.
    pub fn delegate<S>(&self, service: S)
    where
        S: Service<Request, Error = Infallible> + Clone + Send + Sync + 'static,
        S::Response: IntoResponse,
        S::Future: Send + 'static,
    {
        self.update(|router| router.fallback_service(service));
    }

    /// Snapshot the routing table as an [`axum::Router`] ready to serve
    ///
    /// Delegated sub-muxes stay live handles inside the snapshot, so this is
    /// taken once composition is complete.
    pub fn to_router(&self) -> Router {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn update(&self, f: impl FnOnce(Router) -> Router) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let router = std::mem::take(&mut *inner);
        *inner = f(router);
    }
}

impl Service<Request> for Mux {
    type Response = Response;
    type Error = Infallible;
    type Future = Oneshot<Router, Request>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        self.to_router().oneshot(request)
    }
}
