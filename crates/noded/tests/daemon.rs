// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! End-to-end tests for the daemon's HTTP interfaces

use std::{sync::Arc, time::Duration};

use http_host::{API_ADDRESS_KEY, Endpoint, Host, listen_and_serve};
use noded::{ConfigStore, Node, NodeConfig, features};
use tokio::{
    task::JoinHandle,
    time::{sleep, timeout},
};

/// Spin up a node serving the default feature set on an ephemeral port.
fn start_daemon(node: &Arc<Node>) -> JoinHandle<http_host::ServeResult<()>> {
    let node = Arc::clone(node);
    tokio::spawn(async move {
        let listen_addr = node.config().api_addr.value().to_owned();
        listen_and_serve(node.as_ref(), &listen_addr, &features::default_features()).await
    })
}

/// Poll the node's store until the coordinator records the bound address.
async fn recorded_endpoint(node: &Node) -> Endpoint {
    let mut recorded = None;
    for _ in 0..200 {
        if let Some(addr) = node.get_config(API_ADDRESS_KEY) {
            recorded = Some(addr.parse().expect("recorded descriptor must reparse"));
            break;
        }
        sleep(Duration::from_millis(10)).await;
    }
    recorded.expect("bound address was not recorded")
}

#[tokio::test]
async fn serves_version_and_health_on_the_recorded_address() {
    let node = Arc::new(Node::with_store(
        NodeConfig::for_testing(),
        ConfigStore::in_memory(),
    ));
    let server = start_daemon(&node);

    let bound = recorded_endpoint(&node).await;
    assert_ne!(bound.port(), 0);

    let base = format!("http://{}", bound.socket_addr());

    let version: serde_json::Value = reqwest::get(format!("{base}/version"))
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    assert_eq!(version["version"], env!("CARGO_PKG_VERSION"));

    let health: serde_json::Value = reqwest::get(format!("{base}/health"))
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    assert_eq!(health["status"], "up");

    node.begin_shutdown();
    let result = timeout(Duration::from_secs(5), server)
        .await
        .expect("server must stop")
        .expect("serve task must not panic");
    assert!(result.is_ok(), "owner-driven close must not report an error");

    // Teardown completes because the serving work deregistered itself.
    timeout(Duration::from_secs(1), node.shutdown())
        .await
        .expect("node teardown must complete");
}

#[tokio::test]
async fn redirect_feature_answers_with_permanent_redirect() {
    let node = Arc::new(Node::with_store(
        NodeConfig::for_testing(),
        ConfigStore::in_memory(),
    ));
    let server = {
        let node = Arc::clone(&node);
        tokio::spawn(async move {
            let listen_addr = node.config().api_addr.value().to_owned();
            let features = vec![features::redirect("/", "/version"), features::version()];
            listen_and_serve(node.as_ref(), &listen_addr, &features).await
        })
    };

    let bound = recorded_endpoint(&node).await;
    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("client");

    let response = client
        .get(format!("http://{}/", bound.socket_addr()))
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), reqwest::StatusCode::PERMANENT_REDIRECT);
    assert_eq!(
        response
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok()),
        Some("/version")
    );

    node.begin_shutdown();
    timeout(Duration::from_secs(5), server)
        .await
        .expect("server must stop")
        .expect("serve task must not panic")
        .expect("graceful close must be clean");
}

#[tokio::test]
async fn recorded_address_persists_across_store_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store_path = dir.path().join("store.json");

    let mut config = NodeConfig::for_testing();
    config.store_path = Some(store_path.clone());
    let node = Arc::new(Node::open(config).expect("open node"));
    let server = start_daemon(&node);

    let bound = recorded_endpoint(&node).await;

    node.begin_shutdown();
    timeout(Duration::from_secs(5), server)
        .await
        .expect("server must stop")
        .expect("serve task must not panic")
        .expect("graceful close must be clean");

    // A fresh store sees the address the daemon recorded.
    let reopened = ConfigStore::open(&store_path).expect("reopen store");
    assert_eq!(
        reopened.get(API_ADDRESS_KEY).as_deref(),
        Some(bound.to_string().as_str())
    );
}
