// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Feature contract and handler builder
//!
//! A feature is one composable unit of HTTP surface: it installs routes on
//! the mux it is given and returns the mux later features should register
//! against. Most features return the mux unchanged; a mediating feature
//! mounts a fresh mux into the current one (see [`Mux::delegate`]) and
//! returns the fresh handle so every later installation flows through it.
//!
//! [`build_handler`] folds an ordered feature list into the final handler.
//! Order is significant: the same features in a different order can produce
//! observably different routing once a mediator is involved.

use crate::{
    error::{ServeError, ServeResult},
    host::Host,
    mux::Mux,
};

/// A route-installing configuration step
pub trait Feature<H: Host>: Send + Sync {
    /// Install this feature's routes
    ///
    /// Returns the mux later features should register against: `mux` itself,
    /// or a new mux this feature has mounted so it mediates everything
    /// installed after it.
    fn install(&self, host: &H, mux: Mux) -> anyhow::Result<Mux>;
}

impl<H, F> Feature<H> for F
where
    H: Host,
    F: Fn(&H, Mux) -> anyhow::Result<Mux> + Send + Sync,
{
    fn install(&self, host: &H, mux: Mux) -> anyhow::Result<Mux> {
        self(host, mux)
    }
}

/// A heap-allocated feature, the unit feature lists are built from
pub type BoxFeature<H> = Box<dyn Feature<H>>;

/// Fold an ordered feature list into a single handler
///
/// Each feature is installed against the mux returned by its predecessor.
/// The first failure aborts the build and is returned verbatim; later
/// features are never invoked and no partial handler escapes.
///
/// The returned handler is always the top-level mux, not the last mux a
/// feature returned: a mediating feature changes how its successors register,
/// but the served routing table stays anchored where every registration is
/// reachable.
pub fn build_handler<H: Host>(host: &H, features: &[BoxFeature<H>]) -> ServeResult<Mux> {
    let top = Mux::new();
    let mut current = top.clone();
    for feature in features {
        current = feature
            .install(host, current)
            .map_err(|source| ServeError::Feature { source })?;
    }
    Ok(top)
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    };

    use anyhow::bail;
    use axum::http::{HeaderValue, StatusCode};
    use axum::routing::get;
    use tower::ServiceExt;

    use super::*;
    use crate::test_util::{TestHost, read_response};

    fn route_feature(path: &'static str, reply: &'static str) -> BoxFeature<TestHost> {
        Box::new(move |_: &TestHost, mux: Mux| -> anyhow::Result<Mux> {
            mux.route(path, get(move || async move { reply }));
            Ok(mux)
        })
    }

    /// Mounts a fresh mux that stamps every response it mediates.
    fn stamping_mediator() -> BoxFeature<TestHost> {
        Box::new(|_: &TestHost, mux: Mux| -> anyhow::Result<Mux> {
            let child = Mux::new();
            let stamped = child.clone().map_response(|mut response| {
                response
                    .headers_mut()
                    .insert("x-mediated", HeaderValue::from_static("1"));
                response
            });
            mux.delegate(stamped);
            Ok(child)
        })
    }

    #[tokio::test]
    async fn empty_feature_list_builds() {
        let host = TestHost::new();
        let handler = build_handler(&host, &[]).expect("empty build");
        let (status, _) = read_response(&handler, "/anything").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn first_failure_stops_the_build() {
        let host = TestHost::new();
        let invoked = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&invoked);

        let failing: BoxFeature<TestHost> =
            Box::new(|_: &TestHost, _mux: Mux| -> anyhow::Result<Mux> {
                bail!("route table unavailable")
            });
        let recording: BoxFeature<TestHost> =
            Box::new(move |_: &TestHost, mux: Mux| -> anyhow::Result<Mux> {
                flag.store(true, Ordering::SeqCst);
                Ok(mux)
            });

        let err = build_handler(&host, &[failing, recording]).expect_err("build must fail");
        assert!(matches!(err, ServeError::Feature { .. }));
        assert!(err.to_string().contains("route table unavailable"));
        assert!(!invoked.load(Ordering::SeqCst), "later feature was invoked");
    }

    #[tokio::test]
    async fn handler_stays_anchored_at_the_top() {
        let host = TestHost::new();
        let features = vec![
            route_feature("/early", "early"),
            stamping_mediator(),
            route_feature("/late", "late"),
        ];

        let handler = build_handler(&host, &features).expect("build");

        let (status, body) = read_response(&handler, "/early").await;
        assert_eq!((status, body.as_str()), (StatusCode::OK, "early"));

        // Routes installed after the mediator are still reachable from the top.
        let (status, body) = read_response(&handler, "/late").await;
        assert_eq!((status, body.as_str()), (StatusCode::OK, "late"));
    }

    #[tokio::test]
    async fn order_changes_mediation() {
        let host = TestHost::new();

        let before = build_handler(&host, &[route_feature("/probe", "ok"), stamping_mediator()])
            .expect("build");
        let after = build_handler(&host, &[stamping_mediator(), route_feature("/probe", "ok")])
            .expect("build");

        let request = || {
            axum::extract::Request::builder()
                .uri("/probe")
                .body(axum::body::Body::empty())
                .expect("request")
        };

        // Registered before the mediator: served from the top, no stamp.
        let response = before.to_router().oneshot(request()).await.expect("infallible");
        assert!(!response.headers().contains_key("x-mediated"));

        // Registered after: served through the mediator's mount.
        let response = after.to_router().oneshot(request()).await.expect("infallible");
        assert_eq!(
            response.headers().get("x-mediated"),
            Some(&HeaderValue::from_static("1"))
        );
    }

    #[tokio::test]
    async fn non_overlapping_routes_commute() {
        let host = TestHost::new();
        let forward =
            build_handler(&host, &[route_feature("/a", "a"), route_feature("/b", "b")])
                .expect("build");
        let reverse =
            build_handler(&host, &[route_feature("/b", "b"), route_feature("/a", "a")])
                .expect("build");

        for handler in [forward, reverse] {
            let (_, body) = read_response(&handler, "/a").await;
            assert_eq!(body, "a");
            let (_, body) = read_response(&handler, "/b").await;
            assert_eq!(body, "b");
        }
    }
}
