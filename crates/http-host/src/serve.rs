// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Listener lifecycle coordination
//!
//! This module binds a composed handler to a listen address and supervises
//! the running server against two independent termination sources: the serve
//! activity exiting on its own, and the owning process signaling closing.
//!
//! The lifecycle is strictly ordered: the descriptor is resolved, the socket
//! is bound, the concrete bound address is recorded with the owner, and only
//! then does the accept loop start, so any reader of the recorded address
//! sees a live, connectable endpoint. After an owner-driven close the
//! coordinator waits for the server without a deadline, emitting progress
//! records on a fixed cadence; a server stopped intentionally during owner
//! shutdown reports no error.

use std::time::Duration;

use tokio::{net::TcpListener, task::JoinHandle, time::timeout};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{
    endpoint::Endpoint,
    error::{ServeError, ServeResult},
    feature::{BoxFeature, build_handler},
    host::Host,
    mux::Mux,
};

/// Config key the concrete bound address is recorded under
pub const API_ADDRESS_KEY: &str = "addresses.api";

const DEFAULT_PROGRESS_INTERVAL_SECONDS: u64 = 5;

/// Cadence policy for the owner-driven shutdown wait
///
/// The wait itself is unbounded: the coordinator never abandons a server
/// that is still stopping. Only the cadence of the "still waiting" progress
/// records is configurable.
#[derive(Debug, Clone)]
pub struct GracePolicy {
    /// Interval between progress records while waiting for the server to stop
    pub progress_interval: Duration,
}

impl Default for GracePolicy {
    fn default() -> Self {
        Self {
            progress_interval: Duration::from_secs(DEFAULT_PROGRESS_INTERVAL_SECONDS),
        }
    }
}

/// Compose `features` into a handler and serve it at `listen_addr` until the
/// server stops
///
/// Blocks until the server has fully stopped: either it exited on its own
/// (the exit error is returned) or the owner signaled closing (the server is
/// stopped and no error is returned). See [`serve`] for the full lifecycle.
pub async fn listen_and_serve<H: Host>(
    host: &H,
    listen_addr: &str,
    features: &[BoxFeature<H>],
) -> ServeResult<()> {
    listen_and_serve_with_policy(host, listen_addr, features, GracePolicy::default()).await
}

/// [`listen_and_serve`] with an explicit shutdown-progress cadence
pub async fn listen_and_serve_with_policy<H: Host>(
    host: &H,
    listen_addr: &str,
    features: &[BoxFeature<H>],
    policy: GracePolicy,
) -> ServeResult<()> {
    let endpoint: Endpoint = listen_addr.parse()?;
    let handler = build_handler(host, features)?;
    serve(host, endpoint, handler, policy).await
}

/// Bind `handler` at `endpoint`, record the concrete bound address with the
/// owner, and supervise the server until it stops
///
/// The bound address (with any OS-assigned port resolved) is persisted under
/// [`API_ADDRESS_KEY`] before serving starts; a failure to record it tears
/// the listener down instead of serving on an unrecorded address. The serve
/// activity is registered as in-flight work with the owner for the whole
/// time it runs.
pub async fn serve<H: Host>(
    host: &H,
    endpoint: Endpoint,
    handler: Mux,
    policy: GracePolicy,
) -> ServeResult<()> {
    let listener = TcpListener::bind(endpoint.socket_addr())
        .await
        .map_err(|source| ServeError::Bind { endpoint, source })?;

    let bound = Endpoint::from(
        listener
            .local_addr()
            .map_err(|source| ServeError::Startup { source })?,
    );

    host.put_config(API_ADDRESS_KEY, &bound.to_string())
        .map_err(|source| ServeError::Persist {
            key: API_ADDRESS_KEY,
            source,
        })?;
    info!(endpoint = %bound, "api server listening");

    // Deregistered when dropped, on every exit path below.
    let _work = host.track_work();

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone().cancelled_owned();
    let router = handler.to_router();
    let server = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(signal)
            .await
    });

    supervise(bound, server, shutdown, host.closing(), &policy).await
}

/// Wait for whichever comes first: the server exiting on its own, or the
/// owner closing.
async fn supervise(
    endpoint: Endpoint,
    mut server: JoinHandle<std::io::Result<()>>,
    shutdown: CancellationToken,
    closing: CancellationToken,
    policy: &GracePolicy,
) -> ServeResult<()> {
    let result = tokio::select! {
        exited = &mut server => natural_exit(exited),
        () = closing.cancelled() => {
            info!(endpoint = %endpoint, "api server terminating");
            // Stops the accept loop; the error that close provokes on the
            // serve side is expected and discarded below.
            shutdown.cancel();
            loop {
                match timeout(policy.progress_interval, &mut server).await {
                    // A server stopped during owner shutdown is not a failure.
                    Ok(_stopped) => break Ok(()),
                    Err(_tick) => info!(endpoint = %endpoint, "waiting for api server to terminate"),
                }
            }
        }
    };
    info!(endpoint = %endpoint, "api server terminated");
    result
}

fn natural_exit(exited: Result<std::io::Result<()>, tokio::task::JoinError>) -> ServeResult<()> {
    match exited {
        Ok(Ok(())) => Ok(()),
        Ok(Err(source)) => Err(ServeError::Serve { source }),
        Err(source) => Err(ServeError::TaskJoin { source }),
    }
}
