// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Built-in route features
//!
//! The HTTP surface the daemon installs by default: version and health
//! endpoints, a redirect helper, and a mediating feature that puts every
//! later feature's routes behind request tracing.

use anyhow::Result;
use axum::{
    Json,
    body::Body,
    response::Redirect,
    routing::get,
};
use http_host::{BoxFeature, Host, Mux};
use hyper::Request;
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info_span;

/// Version information served at `/version`
#[derive(Debug, Serialize, Deserialize)]
pub struct VersionInfo {
    /// Daemon version
    pub version: String,
}

/// Liveness report served at `/health`
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthReport {
    /// Service status
    pub status: String,
    /// Daemon version
    pub version: String,
    /// Time the report was produced
    pub timestamp: String,
}

/// Serve the daemon version at `/version`
pub fn version<H: Host>() -> BoxFeature<H> {
    Box::new(|_: &H, mux: Mux| -> Result<Mux> {
        mux.route(
            "/version",
            get(|| async {
                Json(VersionInfo {
                    version: env!("CARGO_PKG_VERSION").to_owned(),
                })
            }),
        );
        Ok(mux)
    })
}

/// Serve a liveness report at `/health`
pub fn health<H: Host>() -> BoxFeature<H> {
    Box::new(|_: &H, mux: Mux| -> Result<Mux> {
        mux.route(
            "/health",
            get(|| async {
                Json(HealthReport {
                    status: "up".to_owned(),
                    version: env!("CARGO_PKG_VERSION").to_owned(),
                    timestamp: chrono::Utc::now().to_rfc3339(),
                })
            }),
        );
        Ok(mux)
    })
}

/// Permanently redirect `from` to `to`
pub fn redirect<H: Host>(from: &str, to: &str) -> BoxFeature<H> {
    let from = from.to_owned();
    let to = to.to_owned();
    Box::new(move |_: &H, mux: Mux| -> Result<Mux> {
        let target = to.clone();
        mux.route(
            &from,
            get(move || async move { Redirect::permanent(&target) }),
        );
        Ok(mux)
    })
}

/// Put every later feature's routes behind request tracing
///
/// Mounts a fresh mux wrapped in a [`TraceLayer`] as the fallback of the
/// current one and returns the fresh handle, so features installed after
/// this one register through the traced mount while earlier registrations
/// stay untouched.
pub fn traced<H: Host>() -> BoxFeature<H> {
    Box::new(|_: &H, mux: Mux| -> Result<Mux> {
        let inner = Mux::new();
        let service = ServiceBuilder::new()
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                info_span!(
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            }))
            .service(inner.clone());
        mux.delegate(service);
        Ok(inner)
    })
}

/// The feature set the daemon serves by default
pub fn default_features<H: Host>() -> Vec<BoxFeature<H>> {
    vec![traced(), version(), health()]
}
