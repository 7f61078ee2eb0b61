// SPDX-License-Identifier: GPL-3.0

use anyhow::Result;
use clap::Parser;
use pop_exporter::{
	Exporter, ExporterConfig,
	exporter::{DEFAULT_EXPORTER_PORT, DEFAULT_RPC_URL},
};
use std::{
	net::{IpAddr, Ipv4Addr, SocketAddr},
	time::Duration,
};
use tokio_util::sync::CancellationToken;
use url::Url;

/// Exports block, finality and node metrics of a Polkadot SDK node to Prometheus.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
	/// Port the metrics endpoint listens on.
	#[arg(long, alias = "exporter_port", default_value_t = DEFAULT_EXPORTER_PORT)]
	exporter_port: u16,
	/// Address the metrics endpoint listens on.
	#[arg(
		long,
		alias = "exporter_address",
		default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED)
	)]
	exporter_address: IpAddr,
	/// HTTP URL of the node's JSON-RPC endpoint.
	#[arg(long, alias = "rpc_url", default_value = DEFAULT_RPC_URL)]
	rpc_url: Url,
	/// Milliseconds between two polls of the node.
	#[arg(long, default_value_t = 500)]
	poll_interval_ms: u64,
	/// Number of recent blocks kept in memory.
	#[arg(long, default_value_t = 256, value_parser = clap::value_parser!(u64).range(1..))]
	block_cache_size: u64,
	/// Timeout of a single RPC call, in seconds.
	#[arg(long, default_value_t = 10)]
	rpc_timeout_secs: u64,
}

impl Cli {
	fn config(&self) -> ExporterConfig {
		ExporterConfig {
			rpc_url: self.rpc_url.clone(),
			listen_addr: SocketAddr::new(self.exporter_address, self.exporter_port),
			poll_interval: Duration::from_millis(self.poll_interval_ms),
			block_cache_size: self.block_cache_size as usize,
			request_timeout: Duration::from_secs(self.rpc_timeout_secs),
		}
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
	let cli = Cli::parse();

	let exporter = Exporter::new(cli.config())?;
	let shutdown = CancellationToken::new();
	tokio::spawn(cancel_on_signal(shutdown.clone()));

	exporter.run(shutdown).await?;
	Ok(())
}

/// Cancel `shutdown` on Ctrl-C or, on Unix, SIGTERM.
async fn cancel_on_signal(shutdown: CancellationToken) {
	let ctrl_c = async {
		if let Err(e) = tokio::signal::ctrl_c().await {
			log::error!("Failed to listen for Ctrl-C: {e}");
			std::future::pending::<()>().await;
		}
	};

	#[cfg(unix)]
	let terminate = async {
		use tokio::signal::unix::{SignalKind, signal};
		match signal(SignalKind::terminate()) {
			Ok(mut sigterm) => {
				sigterm.recv().await;
			},
			Err(e) => {
				log::error!("Failed to listen for SIGTERM: {e}");
				std::future::pending::<()>().await;
			},
		}
	};
	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => log::info!("Received Ctrl-C, shutting down"),
		_ = terminate => log::info!("Received SIGTERM, shutting down"),
		_ = shutdown.cancelled() => return,
	}
	shutdown.cancel();
}
