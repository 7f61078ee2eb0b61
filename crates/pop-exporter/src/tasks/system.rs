// SPDX-License-Identifier: GPL-3.0

use super::PeriodicTask;
use crate::{
	cache::BlockCache, error::ExporterError, metrics::SystemInfoMetrics, rpc::NodeRpc,
	strings::rpc::methods,
};
use async_trait::async_trait;
use prometheus::Registry;
use std::{sync::Arc, time::Duration};

/// Publishes the node's name, version and chain, and its runtime version.
pub struct SystemInfoUpdater {
	rpc: Arc<dyn NodeRpc>,
	metrics: SystemInfoMetrics,
}

impl SystemInfoUpdater {
	pub const INTERVAL: Duration = Duration::from_secs(300);

	pub fn new(rpc: Arc<dyn NodeRpc>, registry: &Registry) -> Result<Self, ExporterError> {
		Ok(Self { rpc, metrics: SystemInfoMetrics::register(registry)? })
	}
}

#[async_trait]
impl PeriodicTask for SystemInfoUpdater {
	fn name(&self) -> &'static str {
		"system info"
	}

	fn interval(&self) -> Duration {
		Self::INTERVAL
	}

	async fn perform(&mut self, _cache: &mut BlockCache) -> Result<(), ExporterError> {
		let name = self.rpc.system_text(methods::SYSTEM_NAME).await?;
		let version = self.rpc.system_text(methods::SYSTEM_VERSION).await?;
		let chain = self.rpc.system_text(methods::SYSTEM_CHAIN).await?;
		self.metrics.set_system(&name, &version, &chain);

		let runtime = self.rpc.runtime_version().await?;
		self.metrics.set_runtime(&runtime);
		log::debug!("Node {name} {version} on {chain}, runtime {runtime:?}");
		Ok(())
	}
}
