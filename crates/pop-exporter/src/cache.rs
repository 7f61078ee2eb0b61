// SPDX-License-Identifier: GPL-3.0

//! In-memory cache of recently fetched blocks.
//!
//! Head tracking and finality tracking both resolve the most recent blocks, usually the same
//! ones, so every block lookup goes through this cache.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          BlockCache                             │
//! │                                                                 │
//! │   get(hash) ────► Cached? ──── Yes ────► Return cached block    │
//! │                      │                                          │
//! │                      No                                         │
//! │                      │                                          │
//! │                      ▼                                          │
//! │               chain_getBlock ──── null ────► Return None        │
//! │                      │                      (nothing cached)    │
//! │                      ▼                                          │
//! │            len >= 2 × capacity? ── Yes ──► keep the `capacity`  │
//! │                      │                     highest blocks       │
//! │                      ▼                                          │
//! │               Insert and return                                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Blocks never change once produced, so entries are never invalidated; they only leave the
//! cache through eviction. Eviction sorts the whole cache, but it runs once every `capacity`
//! insertions, which keeps the cost per insertion constant on average.

use crate::{
	error::ExporterError,
	metrics::CacheMetrics,
	models::{BlockHash, SignedBlock},
	rpc::NodeRpc,
};
use std::{collections::HashMap, sync::Arc};

/// Default number of blocks kept after an eviction.
pub const DEFAULT_CAPACITY: usize = 256;

/// Memoizes `chain_getBlock` by block hash.
pub struct BlockCache {
	rpc: Arc<dyn NodeRpc>,
	entries: HashMap<BlockHash, Arc<SignedBlock>>,
	capacity: usize,
	metrics: CacheMetrics,
}

impl BlockCache {
	/// Create an empty cache fetching misses through `rpc`.
	///
	/// # Arguments
	/// * `rpc` - Node the blocks are fetched from
	/// * `capacity` - Number of blocks kept after an eviction; the cache holds at most twice as
	///   many
	/// * `metrics` - Hit, miss, eviction and size metrics
	pub fn new(rpc: Arc<dyn NodeRpc>, capacity: usize, metrics: CacheMetrics) -> Self {
		Self { rpc, entries: HashMap::new(), capacity, metrics }
	}

	/// Get a block, fetching it from the node if it is not cached.
	///
	/// # Returns
	/// * `Ok(Some(block))` - The block, cached or freshly fetched
	/// * `Ok(None)` - The node has no such block; nothing is cached, so a later lookup asks again
	/// * `Err(_)` - The fetch failed
	pub async fn get(
		&mut self,
		hash: &BlockHash,
	) -> Result<Option<Arc<SignedBlock>>, ExporterError> {
		if let Some(block) = self.entries.get(hash) {
			self.metrics.hits.inc();
			return Ok(Some(block.clone()));
		}
		self.metrics.misses.inc();

		let Some(block) = self.rpc.block(hash).await? else {
			return Ok(None);
		};

		if self.entries.len() >= self.capacity.saturating_mul(2) {
			self.evict();
		}

		let block = Arc::new(block);
		self.entries.insert(hash.clone(), block.clone());
		self.metrics.size.set(self.entries.len() as i64);
		Ok(Some(block))
	}

	/// Whether a block is cached.
	pub fn contains(&self, hash: &BlockHash) -> bool {
		self.entries.contains_key(hash)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Keep only the `capacity` highest blocks.
	fn evict(&mut self) {
		let mut by_height: Vec<_> = self.entries.drain().collect();
		by_height.sort_unstable_by(|(_, a), (_, b)| b.height().cmp(&a.height()));
		let evicted = by_height.len().saturating_sub(self.capacity);
		by_height.truncate(self.capacity);
		self.entries = by_height.into_iter().collect();

		log::debug!("Evicted {evicted} blocks from the block cache");
		self.metrics.evictions.inc_by(evicted as u64);
	}
}
