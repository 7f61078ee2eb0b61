// SPDX-License-Identifier: GPL-3.0

//! Shared testing utilities for pop-exporter tests.
//!
//! [`MockNode`] is a scripted node answering the legacy RPC methods from an in-memory chain and
//! recording every call it receives.

use crate::{
	error::RpcClientError,
	models::{Block, BlockHash, BlockHeight, Header, SignedBlock},
	rpc::{NodeRpc, RpcEnvelope},
	strings::rpc::methods,
};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::{
	collections::{BTreeMap, HashMap, HashSet},
	sync::Mutex,
};

/// Hash of the canonical block at `height`, as the node reports it (upper-case hex).
pub(crate) fn hash_at(height: u64) -> String {
	format!("0x{height:064X}")
}

/// A block at `height` holding `extrinsics` dummy extrinsics.
pub(crate) fn block_at(height: u64, extrinsics: usize) -> SignedBlock {
	SignedBlock {
		block: Block {
			header: Header { number: BlockHeight::new(height) },
			extrinsics: (0..extrinsics).map(|i| format!("0x{i:02x}")).collect(),
		},
	}
}

/// Extrinsic count of the mock block at `height`.
pub(crate) fn extrinsics_at(height: u64) -> usize {
	(height % 3 + 1) as usize
}

#[derive(Default)]
struct MockState {
	head: Option<u64>,
	finalized: Option<String>,
	canonical: BTreeMap<u64, String>,
	blocks: HashMap<BlockHash, SignedBlock>,
	results: HashMap<String, Value>,
	failing: HashSet<String>,
	calls: Vec<(String, Vec<Value>)>,
}

/// Scripted node.
#[derive(Default)]
pub(crate) struct MockNode {
	state: Mutex<MockState>,
}

impl MockNode {
	/// A node whose chain holds blocks `1..=head`.
	pub(crate) fn with_chain(head: u64) -> Self {
		let node = Self::default();
		node.extend_to(head);
		node
	}

	/// Produce canonical blocks up to `height` and make the last one the head.
	pub(crate) fn extend_to(&self, height: u64) {
		let mut state = self.state.lock().unwrap();
		let start = state.head.map_or(1, |h| h + 1);
		for h in start..=height {
			let hash = hash_at(h);
			state.blocks.insert(BlockHash::from(hash.as_str()), block_at(h, extrinsics_at(h)));
			state.canonical.insert(h, hash);
		}
		state.head = Some(height);
	}

	/// Add a block reachable by `hash` only.
	pub(crate) fn insert_block(&self, hash: &str, block: SignedBlock) {
		self.state.lock().unwrap().blocks.insert(BlockHash::from(hash), block);
	}

	/// Forget the block at `height` while still reporting its hash.
	pub(crate) fn drop_block(&self, height: u64) {
		self.state.lock().unwrap().blocks.remove(&BlockHash::from(hash_at(height)));
	}

	/// Forget the hash of the block at `height`.
	pub(crate) fn drop_hash(&self, height: u64) {
		self.state.lock().unwrap().canonical.remove(&height);
	}

	pub(crate) fn set_finalized(&self, height: Option<u64>) {
		self.state.lock().unwrap().finalized = height.map(hash_at);
	}

	/// Answer `method` with `result`.
	pub(crate) fn set_result(&self, method: &str, result: Value) {
		self.state.lock().unwrap().results.insert(method.to_string(), result);
	}

	/// Make every call to `method` fail at the transport level.
	pub(crate) fn fail(&self, method: &str) {
		self.state.lock().unwrap().failing.insert(method.to_string());
	}

	pub(crate) fn recover(&self, method: &str) {
		self.state.lock().unwrap().failing.remove(method);
	}

	/// Every call received so far.
	pub(crate) fn calls(&self) -> Vec<(String, Vec<Value>)> {
		self.state.lock().unwrap().calls.clone()
	}

	/// Number of calls received for `method`.
	pub(crate) fn calls_to(&self, method: &str) -> usize {
		self.state.lock().unwrap().calls.iter().filter(|(m, _)| m == method).count()
	}

	/// Heights requested through `chain_getBlockHash`, in call order.
	pub(crate) fn requested_heights(&self) -> Vec<u64> {
		self.state
			.lock()
			.unwrap()
			.calls
			.iter()
			.filter(|(m, _)| m == methods::CHAIN_GET_BLOCK_HASH)
			.filter_map(|(_, params)| params.first().and_then(Value::as_u64))
			.collect()
	}

	pub(crate) fn clear_calls(&self) {
		self.state.lock().unwrap().calls.clear();
	}
}

#[async_trait]
impl NodeRpc for MockNode {
	async fn try_call(
		&self,
		method: &str,
		params: Vec<Value>,
	) -> Result<RpcEnvelope, RpcClientError> {
		let mut state = self.state.lock().unwrap();
		state.calls.push((method.to_string(), params.clone()));

		if state.failing.contains(method) {
			return Err(RpcClientError::Network {
				method: method.to_string(),
				message: "connection refused".to_string(),
			});
		}

		let result = match method {
			methods::CHAIN_GET_BLOCK_HASH => {
				let height = match params.first() {
					Some(height) => height.as_u64(),
					None => state.head,
				};
				json!(height.and_then(|h| state.canonical.get(&h)))
			},
			methods::CHAIN_GET_BLOCK => {
				let hash = params.first().and_then(Value::as_str).map(BlockHash::from);
				json!(hash.and_then(|h| state.blocks.get(&h)))
			},
			methods::CHAIN_GET_FINALIZED_HEAD => json!(state.finalized),
			other => state.results.get(other).cloned().unwrap_or_default(),
		};
		Ok(RpcEnvelope::with_result(result))
	}
}
