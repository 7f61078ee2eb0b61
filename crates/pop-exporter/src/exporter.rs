// SPDX-License-Identifier: GPL-3.0

//! Exporter wiring and polling loop.

use crate::{
	cache::{BlockCache, DEFAULT_CAPACITY},
	catch_up::CatchUpEngine,
	error::ExporterError,
	metrics::{CacheMetrics, ChainMetrics, RpcMetrics, server},
	rpc::{HttpRpcClient, NodeRpc},
	tasks::Scheduler,
};
use prometheus::Registry;
use std::{
	net::{Ipv4Addr, SocketAddr},
	sync::Arc,
	time::Duration,
};
use tokio::{net::TcpListener, time::Instant};
use tokio_util::sync::CancellationToken;
use url::Url;

/// Default RPC endpoint of a local node.
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:9933/";
/// Default port of the scrape endpoint.
pub const DEFAULT_EXPORTER_PORT: u16 = 8000;
/// Default time between two polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);
/// Default transport timeout of a single RPC call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Exporter settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExporterConfig {
	/// HTTP URL of the node's JSON-RPC endpoint.
	pub rpc_url: Url,
	/// Address the scrape endpoint listens on.
	pub listen_addr: SocketAddr,
	/// Time between the starts of two polling cycles.
	pub poll_interval: Duration,
	/// Number of blocks kept by the block cache after an eviction.
	pub block_cache_size: usize,
	/// Transport timeout of a single RPC call.
	pub request_timeout: Duration,
}

impl Default for ExporterConfig {
	fn default() -> Self {
		Self {
			rpc_url: Url::parse(DEFAULT_RPC_URL).expect("default RPC URL is valid; qed"),
			listen_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_EXPORTER_PORT)),
			poll_interval: DEFAULT_POLL_INTERVAL,
			block_cache_size: DEFAULT_CAPACITY,
			request_timeout: DEFAULT_REQUEST_TIMEOUT,
		}
	}
}

/// Polls a node and serves the derived metrics.
pub struct Exporter {
	config: ExporterConfig,
	registry: Registry,
	engine: CatchUpEngine,
}

impl Exporter {
	/// Create an exporter talking to `config.rpc_url` over HTTP.
	pub fn new(config: ExporterConfig) -> Result<Self, ExporterError> {
		let registry = Registry::new();
		let rpc = HttpRpcClient::new(
			config.rpc_url.clone(),
			config.request_timeout,
			RpcMetrics::register(&registry)?,
		)?;
		Self::with_rpc(config, Arc::new(rpc), registry)
	}

	/// Create an exporter over any node client, registering its metrics into `registry`.
	///
	/// # Arguments
	/// * `config` - Exporter settings; `rpc_url` and `request_timeout` are unused here
	/// * `rpc` - Node client
	/// * `registry` - Registry served on the scrape endpoint
	pub fn with_rpc(
		config: ExporterConfig,
		rpc: Arc<dyn NodeRpc>,
		registry: Registry,
	) -> Result<Self, ExporterError> {
		let cache = BlockCache::new(
			rpc.clone(),
			config.block_cache_size,
			CacheMetrics::register(&registry)?,
		);
		let scheduler = Scheduler::with_default_tasks(rpc.clone(), &registry)?;
		let engine = CatchUpEngine::new(rpc, cache, scheduler, ChainMetrics::register(&registry)?);
		Ok(Self { config, registry, engine })
	}

	pub fn config(&self) -> &ExporterConfig {
		&self.config
	}

	pub fn registry(&self) -> &Registry {
		&self.registry
	}

	pub fn engine(&self) -> &CatchUpEngine {
		&self.engine
	}

	/// Run one polling cycle.
	///
	/// Failed calls and malformed responses end the cycle early and are only logged; the next
	/// cycle retries from the same position.
	///
	/// # Returns
	/// The number of blocks observed, or the fatal error that must stop the exporter.
	pub async fn step(&mut self) -> Result<u64, ExporterError> {
		match self.engine.tick().await {
			Ok(observed) => {
				if observed > 0 {
					log::debug!("Observed {observed} new blocks");
				}
				Ok(observed)
			},
			Err(e) if !e.is_fatal() => {
				log::debug!("Polling cycle aborted: {e}");
				Ok(0)
			},
			Err(e) => Err(e),
		}
	}

	/// Serve metrics and poll the node until `shutdown` is cancelled or a fatal error occurs.
	///
	/// Cancellation is checked between polling cycles; a cycle in progress runs to completion.
	pub async fn run(mut self, shutdown: CancellationToken) -> Result<(), ExporterError> {
		let listener = TcpListener::bind(self.config.listen_addr).await?;
		log::info!(
			"Serving metrics on http://{}, polling {}",
			listener.local_addr()?,
			self.config.rpc_url
		);
		let server =
			tokio::spawn(server::serve(listener, self.registry.clone(), shutdown.clone()));

		let outcome = self.poll(&shutdown).await;
		if let Err(e) = &outcome {
			log::error!("Stopping exporter: {e}");
		}
		shutdown.cancel();

		match server.await {
			Ok(Err(e)) => log::error!("Metrics server failed: {e}"),
			Err(e) => log::error!("Metrics server task failed: {e}"),
			Ok(Ok(())) => {},
		}
		log::info!("Exporter stopped");
		outcome
	}

	async fn poll(&mut self, shutdown: &CancellationToken) -> Result<(), ExporterError> {
		while !shutdown.is_cancelled() {
			let next_tick = Instant::now() + self.config.poll_interval;
			self.step().await?;
			tokio::select! {
				_ = shutdown.cancelled() => {},
				_ = tokio::time::sleep_until(next_tick) => {},
			}
		}
		Ok(())
	}
}
