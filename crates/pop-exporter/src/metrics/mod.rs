// SPDX-License-Identifier: GPL-3.0

//! Metric handles for the exporter.
//!
//! Every component receives the handles it updates at construction time, registered into an
//! explicit [`Registry`] owned by the exporter. Nothing here is global, so independent
//! exporters (and tests) never share counters.

pub mod server;

use crate::{
	error::{FailureKind, RpcClientError},
	models::{RuntimeInfo, SystemHealth},
	strings::{
		metrics::{chain, exporter, finality, node},
		rpc::RUNTIME_FIELDS,
	},
};
use prometheus::{
	Encoder, Histogram, HistogramOpts, IntCounter, IntGauge, IntGaugeVec, Opts, Registry,
	TextEncoder, core::Collector,
};

/// Register a collector and hand back a handle to it.
fn register<C: Collector + Clone + 'static>(
	registry: &Registry,
	collector: C,
) -> prometheus::Result<C> {
	registry.register(Box::new(collector.clone()))?;
	Ok(collector)
}

fn counter(registry: &Registry, (name, help): (&str, &str)) -> prometheus::Result<IntCounter> {
	register(registry, IntCounter::new(name, help)?)
}

fn gauge(registry: &Registry, (name, help): (&str, &str)) -> prometheus::Result<IntGauge> {
	register(registry, IntGauge::new(name, help)?)
}

/// Gather all metrics of a registry and encode them in the Prometheus text format.
pub fn gather(registry: &Registry) -> prometheus::Result<Vec<u8>> {
	let encoder = TextEncoder::new();
	let mut buffer = Vec::new();
	encoder.encode(&registry.gather(), &mut buffer)?;
	Ok(buffer)
}

/// Outcome tallies of RPC calls.
#[derive(Clone, Debug)]
pub struct RpcMetrics {
	pub(crate) calls: IntCounter,
	pub(crate) success: IntCounter,
	pub(crate) network_error: IntCounter,
	pub(crate) unexpected_status: IntCounter,
	pub(crate) client_error: IntCounter,
	pub(crate) server_error: IntCounter,
	pub(crate) declined: IntCounter,
}

impl RpcMetrics {
	pub fn register(registry: &Registry) -> prometheus::Result<Self> {
		Ok(Self {
			calls: counter(registry, exporter::RPC_CALLS)?,
			success: counter(registry, exporter::RPC_SUCCESS)?,
			network_error: counter(registry, exporter::RPC_NETWORK_ERROR)?,
			unexpected_status: counter(registry, exporter::RPC_UNEXPECTED_STATUS)?,
			client_error: counter(registry, exporter::RPC_4XX_ERROR)?,
			server_error: counter(registry, exporter::RPC_5XX_ERROR)?,
			declined: counter(registry, exporter::RPC_DECLINED)?,
		})
	}

	/// Tally the outcome of one call: exactly one of the outcome counters is incremented.
	pub fn record<T>(&self, outcome: &Result<T, RpcClientError>) {
		self.calls.inc();
		let tally = match outcome {
			Ok(_) => &self.success,
			Err(e) => match e.kind() {
				FailureKind::Network => &self.network_error,
				FailureKind::ClientStatus => &self.client_error,
				FailureKind::ServerStatus => &self.server_error,
				FailureKind::UnexpectedStatus => &self.unexpected_status,
				FailureKind::Declined => &self.declined,
			},
		};
		tally.inc();
	}
}

/// Block cache effectiveness.
#[derive(Clone, Debug)]
pub struct CacheMetrics {
	pub(crate) hits: IntCounter,
	pub(crate) misses: IntCounter,
	pub(crate) evictions: IntCounter,
	pub(crate) size: IntGauge,
}

impl CacheMetrics {
	pub fn register(registry: &Registry) -> prometheus::Result<Self> {
		Ok(Self {
			hits: counter(registry, exporter::CACHE_HITS)?,
			misses: counter(registry, exporter::CACHE_MISSES)?,
			evictions: counter(registry, exporter::CACHE_EVICTIONS)?,
			size: gauge(registry, exporter::CACHE_SIZE)?,
		})
	}
}

/// Metrics driven by the catch-up engine.
#[derive(Clone, Debug)]
pub struct ChainMetrics {
	pub(crate) highest_block: IntGauge,
	pub(crate) blocks: IntCounter,
	pub(crate) extrinsics: IntCounter,
}

impl ChainMetrics {
	pub fn register(registry: &Registry) -> prometheus::Result<Self> {
		Ok(Self {
			highest_block: gauge(registry, chain::HIGHEST_BLOCK)?,
			blocks: counter(registry, chain::BLOCKS)?,
			extrinsics: counter(registry, chain::EXTRINSICS)?,
		})
	}
}

/// Finality lag metrics.
#[derive(Clone, Debug)]
pub struct FinalityMetrics {
	pub(crate) final_block: IntGauge,
	pub(crate) delay_blocks: IntGauge,
	pub(crate) delay_blocks_histogram: Histogram,
}

impl FinalityMetrics {
	pub fn register(registry: &Registry) -> prometheus::Result<Self> {
		let (name, help) = finality::DELAY_BLOCKS_HISTOGRAM;
		Ok(Self {
			final_block: gauge(registry, finality::FINAL_BLOCK)?,
			delay_blocks: gauge(registry, finality::DELAY_BLOCKS)?,
			delay_blocks_histogram: register(
				registry,
				Histogram::with_opts(HistogramOpts::new(name, help))?,
			)?,
		})
	}

	/// Publish the finalized height and its distance to the head.
	pub fn observe(&self, final_height: u64, delay: i64) {
		self.final_block.set(final_height as i64);
		self.delay_blocks.set(delay);
		self.delay_blocks_histogram.observe(delay as f64);
	}
}

/// Static node information published as info-style records.
///
/// An info record is a gauge fixed at 1 whose labels carry the information. Each update resets
/// the vector so only the latest label set is exposed.
#[derive(Clone, Debug)]
pub struct SystemInfoMetrics {
	pub(crate) system: IntGaugeVec,
	pub(crate) runtime: IntGaugeVec,
}

impl SystemInfoMetrics {
	pub fn register(registry: &Registry) -> prometheus::Result<Self> {
		let (name, help) = node::SYSTEM_INFO;
		let system = register(
			registry,
			IntGaugeVec::new(Opts::new(name, help), &node::SYSTEM_INFO_LABELS)?,
		)?;
		let (name, help) = node::RUNTIME_INFO;
		let runtime =
			register(registry, IntGaugeVec::new(Opts::new(name, help), &RUNTIME_FIELDS)?)?;
		Ok(Self { system, runtime })
	}

	pub fn set_system(&self, name: &str, version: &str, chain: &str) {
		self.system.reset();
		self.system.with_label_values(&[name, version, chain]).set(1);
	}

	/// Fields missing from the node's answer are exposed with an empty label value.
	pub fn set_runtime(&self, info: &RuntimeInfo) {
		let values: Vec<&str> = RUNTIME_FIELDS
			.iter()
			.map(|field| info.get(field).map(String::as_str).unwrap_or_default())
			.collect();
		self.runtime.reset();
		self.runtime.with_label_values(&values).set(1);
	}
}

/// Node health gauges.
#[derive(Clone, Debug)]
pub struct HealthMetrics {
	pub(crate) syncing: IntGauge,
	pub(crate) should_have_peers: IntGauge,
	pub(crate) peers: IntGauge,
}

impl HealthMetrics {
	pub fn register(registry: &Registry) -> prometheus::Result<Self> {
		Ok(Self {
			syncing: gauge(registry, node::SYNCING)?,
			should_have_peers: gauge(registry, node::SHOULD_HAVE_PEERS)?,
			peers: gauge(registry, node::PEERS)?,
		})
	}

	pub fn set(&self, health: &SystemHealth) {
		self.syncing.set(health.is_syncing.into());
		self.should_have_peers.set(health.should_have_peers.into());
		self.peers.set(health.peers as i64);
	}
}

/// Transaction pool gauge.
#[derive(Clone, Debug)]
pub struct MemPoolMetrics {
	pub(crate) pending_extrinsics: IntGauge,
}

impl MemPoolMetrics {
	pub fn register(registry: &Registry) -> prometheus::Result<Self> {
		Ok(Self { pending_extrinsics: gauge(registry, node::PENDING_EXTRINSICS)? })
	}
}
