// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Shared helpers for unit tests

use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

use axum::{body::Body, extract::Request, http::StatusCode};
use tokio_util::{
    sync::CancellationToken,
    task::{TaskTracker, task_tracker::TaskTrackerToken},
};
use tower::ServiceExt;

use crate::{host::Host, mux::Mux};

/// Minimal in-memory owner for exercising the coordinator
#[derive(Debug, Default)]
pub(crate) struct TestHost {
    closing: CancellationToken,
    tasks: TaskTracker,
    store: Mutex<HashMap<String, String>>,
}

impl TestHost {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

impl Host for TestHost {
    fn closing(&self) -> CancellationToken {
        self.closing.clone()
    }

    fn track_work(&self) -> TaskTrackerToken {
        self.tasks.token()
    }

    fn put_config(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.store
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn get_config(&self, key: &str) -> Option<String> {
        self.store
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

/// Dispatch a GET request through `mux` and read the response body
pub(crate) async fn read_response(mux: &Mux, path: &str) -> (StatusCode, String) {
    let response = mux
        .to_router()
        .oneshot(
            Request::builder()
                .uri(path)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("infallible");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    (status, String::from_utf8_lossy(&bytes).into_owned())
}
