// SPDX-License-Identifier: GPL-3.0

use super::PeriodicTask;
use crate::{
	cache::BlockCache, error::ExporterError, metrics::FinalityMetrics, models::BlockHash,
	rpc::NodeRpc,
};
use async_trait::async_trait;
use prometheus::Registry;
use std::{sync::Arc, time::Duration};

/// Tracks how far finality lags behind the head.
///
/// Both the finalized block and the head are resolved through the shared [`BlockCache`], where
/// the catch-up engine usually put them already.
pub struct FinalityUpdater {
	rpc: Arc<dyn NodeRpc>,
	metrics: FinalityMetrics,
}

impl FinalityUpdater {
	pub const INTERVAL: Duration = Duration::from_millis(200);

	pub fn new(rpc: Arc<dyn NodeRpc>, registry: &Registry) -> Result<Self, ExporterError> {
		Ok(Self { rpc, metrics: FinalityMetrics::register(registry)? })
	}
}

/// Height of a block the node reported a hash for; a missing block is an inconsistency.
async fn resolve_height(
	cache: &mut BlockCache,
	hash: &BlockHash,
	role: &str,
) -> Result<u64, ExporterError> {
	match cache.get(hash).await? {
		Some(block) => Ok(block.height().get()),
		None => Err(ExporterError::Inconsistent(format!("{role} block {hash} must exist"))),
	}
}

#[async_trait]
impl PeriodicTask for FinalityUpdater {
	fn name(&self) -> &'static str {
		"finality"
	}

	fn interval(&self) -> Duration {
		Self::INTERVAL
	}

	async fn perform(&mut self, cache: &mut BlockCache) -> Result<(), ExporterError> {
		let finalized = self.rpc.finalized_head().await?;
		let head = self.rpc.block_hash(None).await?;
		// Nothing finalized yet.
		let Some(finalized) = finalized else {
			return Ok(());
		};

		let final_height = resolve_height(cache, &finalized, "finalized").await?;
		let Some(head) = head else {
			return Err(ExporterError::Inconsistent(format!(
				"head block is absent but finalized block {finalized} is not"
			)));
		};
		let head_height = resolve_height(cache, &head, "head").await?;

		let delay = head_height as i64 - final_height as i64;
		if delay < 0 {
			log::warn!("Finalized block #{final_height} is above head #{head_height}");
		}
		self.metrics.observe(final_height, delay);
		Ok(())
	}
}
