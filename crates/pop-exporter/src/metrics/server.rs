// SPDX-License-Identifier: GPL-3.0

//! Scrape endpoint serving the exporter's registry in the Prometheus text format.

use super::gather;
use axum::{
	Router,
	extract::State,
	http::{StatusCode, header},
	response::{IntoResponse, Response},
	routing::get,
};
use prometheus::{Registry, TEXT_FORMAT};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Routes answering scrapes on `/` and `/metrics`.
pub fn router(registry: Registry) -> Router {
	Router::new()
		.route("/", get(metrics_handler))
		.route("/metrics", get(metrics_handler))
		.with_state(registry)
}

/// Serve scrapes until `shutdown` is cancelled.
///
/// Values are whatever the registry holds at scrape time, so a scrape during a string of RPC
/// failures sees the last successfully computed values.
pub async fn serve(
	listener: TcpListener,
	registry: Registry,
	shutdown: CancellationToken,
) -> std::io::Result<()> {
	axum::serve(listener, router(registry))
		.with_graceful_shutdown(async move { shutdown.cancelled().await })
		.await
}

async fn metrics_handler(State(registry): State<Registry>) -> Response {
	match gather(&registry) {
		Ok(body) => ([(header::CONTENT_TYPE, TEXT_FORMAT)], body).into_response(),
		Err(e) => {
			log::error!("Failed to encode metrics: {e}");
			StatusCode::INTERNAL_SERVER_ERROR.into_response()
		},
	}
}
