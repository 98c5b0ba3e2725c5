// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Node daemon
//!
//! Hosts the node's HTTP interfaces under coordinated shutdown.

use std::sync::Arc;

use anyhow::Result;
use http_host::Host;
use noded::{Node, NodeConfig, features};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = NodeConfig::from_env()?;
    let node = Arc::new(Node::open(config)?);

    let signal_node = Arc::clone(&node);
    tokio::spawn(async move {
        shutdown_signal_handler(&signal_node).await;
    });

    info!(
        api_addr = %node.config().api_addr.value(),
        environment = %node.config().environment,
        "starting node HTTP interfaces",
    );

    let listen_addr = node.config().api_addr.value().to_owned();
    let policy = node.config().grace_policy();
    let result = http_host::listen_and_serve_with_policy(
        node.as_ref(),
        &listen_addr,
        &features::default_features(),
        policy,
    )
    .await;

    node.shutdown().await;
    result?;

    Ok(())
}

/// Handle shutdown signals and trigger coordinated cancellation
///
/// Listens for SIGINT (Ctrl+C) and SIGTERM and begins node shutdown when one
/// is received.
async fn shutdown_signal_handler(node: &Node) {
    let signal_received = async {
        #[cfg(unix)]
        #[allow(clippy::expect_used)]
        {
            use tokio::signal::unix::{SignalKind, signal};

            let mut sigterm =
                signal(SignalKind::terminate()).expect("Failed to register SIGTERM handler");
            let mut sigint =
                signal(SignalKind::interrupt()).expect("Failed to register SIGINT handler");

            tokio::select! {
                _ = sigterm.recv() => "SIGTERM",
                _ = sigint.recv() => "SIGINT",
            }
        }

        #[cfg(not(unix))]
        #[allow(clippy::expect_used)]
        {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to install CTRL+C signal handler");
            "CTRL+C"
        }
    };

    let closing = node.closing();
    tokio::select! {
        signal_name = signal_received => {
            warn!("Shutdown signal {} received, stopping node...", signal_name);
            node.begin_shutdown();
        },
        () = closing.cancelled() => {
            warn!("Node already closing, shutdown signal handler exiting");
        }
    }
}
