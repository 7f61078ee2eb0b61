// SPDX-License-Identifier: GPL-3.0

use super::PeriodicTask;
use crate::{cache::BlockCache, error::ExporterError, metrics::MemPoolMetrics, rpc::NodeRpc};
use async_trait::async_trait;
use prometheus::Registry;
use std::{sync::Arc, time::Duration};

/// Publishes the size of the node's transaction pool.
pub struct MemPoolUpdater {
	rpc: Arc<dyn NodeRpc>,
	metrics: MemPoolMetrics,
}

impl MemPoolUpdater {
	pub const INTERVAL: Duration = Duration::from_secs(300);

	pub fn new(rpc: Arc<dyn NodeRpc>, registry: &Registry) -> Result<Self, ExporterError> {
		Ok(Self { rpc, metrics: MemPoolMetrics::register(registry)? })
	}
}

#[async_trait]
impl PeriodicTask for MemPoolUpdater {
	fn name(&self) -> &'static str {
		"mempool"
	}

	fn interval(&self) -> Duration {
		Self::INTERVAL
	}

	async fn perform(&mut self, _cache: &mut BlockCache) -> Result<(), ExporterError> {
		let pending = self.rpc.pending_extrinsics().await?;
		self.metrics.pending_extrinsics.set(pending as i64);
		Ok(())
	}
}
