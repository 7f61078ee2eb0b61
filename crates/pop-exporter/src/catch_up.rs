// SPDX-License-Identifier: GPL-3.0

//! Block catch-up engine.
//!
//! Every poll, the engine compares the node's head with the last block it processed and walks
//! forward one block at a time until it reaches the head, so every block is observed exactly
//! once and in order, without gaps.
//!
//! ```text
//!  advance()
//!     │
//!     ▼
//!  chain_getBlockHash() ──── same as last processed? ──── Yes ───► done (0 blocks)
//!     │
//!     No
//!     ▼
//!  resolve head block ──► highest_block = head height
//!     │
//!     ▼
//!  ┌─► last processed < head? ── No ──► done
//!  │      │
//!  │      Yes
//!  │      ▼
//!  │   first block ever? ── Yes ──► use head block
//!  │      │
//!  │      No
//!  │      ▼
//!  │   chain_getBlockHash(last + 1) ──► resolve through cache
//!  │      │
//!  │      ▼
//!  │   observe block, record position, run due periodic tasks
//!  └──────┘
//! ```
//!
//! A failing call aborts the walk without losing the position: the last processed block is
//! updated only after a block was fully observed, so the next poll resumes right after it.

use crate::{
	cache::BlockCache,
	error::ExporterError,
	metrics::ChainMetrics,
	models::{BlockHash, BlockHeight, SignedBlock},
	rpc::NodeRpc,
	tasks::Scheduler,
};
use std::sync::Arc;

/// Position of the engine on the chain.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CatchUpState {
	/// Height of the last observed block; `None` until the first block is observed.
	pub last_processed_height: Option<BlockHeight>,
	/// Hash of the last observed block.
	pub last_processed_hash: Option<BlockHash>,
}

impl CatchUpState {
	/// Whether the node's head is the block observed last.
	fn is_at(&self, head: &BlockHash) -> bool {
		self.last_processed_hash.as_ref() == Some(head)
	}

	/// Whether blocks remain to be observed before reaching `head`.
	fn is_behind(&self, head: BlockHeight) -> bool {
		self.last_processed_height.is_none_or(|last| last < head)
	}
}

/// Follows the node's head, observing every block once.
pub struct CatchUpEngine {
	rpc: Arc<dyn NodeRpc>,
	cache: BlockCache,
	scheduler: Scheduler,
	state: CatchUpState,
	metrics: ChainMetrics,
}

impl CatchUpEngine {
	/// Create an engine that has not processed any block yet.
	///
	/// # Arguments
	/// * `rpc` - Node to follow
	/// * `cache` - Block cache, shared with the periodic tasks
	/// * `scheduler` - Periodic tasks, also run after each observed block
	/// * `metrics` - Chain metrics updated for each observed block
	pub fn new(
		rpc: Arc<dyn NodeRpc>,
		cache: BlockCache,
		scheduler: Scheduler,
		metrics: ChainMetrics,
	) -> Self {
		Self { rpc, cache, scheduler, state: CatchUpState::default(), metrics }
	}

	pub fn state(&self) -> &CatchUpState {
		&self.state
	}

	pub fn cache(&self) -> &BlockCache {
		&self.cache
	}

	/// Run the periodic tasks that are due.
	pub async fn run_tasks(&mut self) -> Result<(), ExporterError> {
		self.scheduler.run_due(&mut self.cache).await
	}

	/// One polling cycle: due periodic tasks first, then [`Self::advance`].
	pub async fn tick(&mut self) -> Result<u64, ExporterError> {
		self.run_tasks().await?;
		self.advance().await
	}

	/// Observe every block produced since the last call.
	///
	/// # Returns
	/// The number of blocks observed. Errors leave the position at the last fully observed
	/// block.
	pub async fn advance(&mut self) -> Result<u64, ExporterError> {
		let head_hash = self
			.rpc
			.block_hash(None)
			.await?
			.ok_or_else(|| ExporterError::Inconsistent("node reports no head block".into()))?;
		if self.state.is_at(&head_hash) {
			return Ok(0);
		}

		let head = self.resolve(&head_hash, None).await?;
		let head_height = head.height();
		self.metrics.highest_block.set(head_height.get() as i64);

		let mut observed = 0;
		while self.state.is_behind(head_height) {
			let (hash, block) = match self.state.last_processed_height {
				None => (head_hash.clone(), head.clone()),
				Some(last) => {
					let height = last.next();
					let hash = self.rpc.block_hash(Some(height)).await?.ok_or_else(|| {
						ExporterError::Inconsistent(format!(
							"no hash for block #{height} below head #{head_height}"
						))
					})?;
					let block = self.resolve(&hash, Some(height)).await?;
					(hash, block)
				},
			};
			self.observe(hash, &block);
			observed += 1;
			self.run_tasks().await?;
		}
		Ok(observed)
	}

	/// Resolve a block the node reported a hash for, checking its height when one is expected.
	async fn resolve(
		&mut self,
		hash: &BlockHash,
		expected: Option<BlockHeight>,
	) -> Result<Arc<SignedBlock>, ExporterError> {
		let block = self
			.cache
			.get(hash)
			.await?
			.ok_or_else(|| ExporterError::Inconsistent(format!("block {hash} must exist")))?;
		match expected {
			Some(height) if block.height() != height => Err(ExporterError::Inconsistent(format!(
				"block {hash} has height #{} instead of #{height}",
				block.height()
			))),
			_ => Ok(block),
		}
	}

	fn observe(&mut self, hash: BlockHash, block: &SignedBlock) {
		let height = block.height();
		let extrinsics = block.extrinsic_count();
		log::debug!("Observed block #{height} ({hash}) with {extrinsics} extrinsics");

		self.metrics.blocks.inc();
		self.metrics.extrinsics.inc_by(extrinsics as u64);
		self.state.last_processed_height = Some(height);
		self.state.last_processed_hash = Some(hash);
	}
}
