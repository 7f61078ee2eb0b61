// SPDX-License-Identifier: GPL-3.0

use super::PeriodicTask;
use crate::{cache::BlockCache, error::ExporterError, metrics::HealthMetrics, rpc::NodeRpc};
use async_trait::async_trait;
use prometheus::Registry;
use std::{sync::Arc, time::Duration};

/// Publishes `system_health`: sync status, peer expectation and peer count.
pub struct HealthUpdater {
	rpc: Arc<dyn NodeRpc>,
	metrics: HealthMetrics,
}

impl HealthUpdater {
	pub const INTERVAL: Duration = Duration::from_secs(1);

	pub fn new(rpc: Arc<dyn NodeRpc>, registry: &Registry) -> Result<Self, ExporterError> {
		Ok(Self { rpc, metrics: HealthMetrics::register(registry)? })
	}
}

#[async_trait]
impl PeriodicTask for HealthUpdater {
	fn name(&self) -> &'static str {
		"health"
	}

	fn interval(&self) -> Duration {
		Self::INTERVAL
	}

	async fn perform(&mut self, _cache: &mut BlockCache) -> Result<(), ExporterError> {
		let health = self.rpc.system_health().await?;
		self.metrics.set(&health);
		Ok(())
	}
}
