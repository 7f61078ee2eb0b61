// SPDX-License-Identifier: GPL-3.0

//! Chain data as returned by the node's legacy JSON-RPC methods.

use crate::strings::rpc::RUNTIME_FIELDS;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{collections::BTreeMap, fmt, num::ParseIntError};

/// Hash identifying a block.
///
/// Hashes are hex strings and compare case-insensitively, so they are lower-cased on
/// construction and every comparison or map lookup works on the normalized form.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct BlockHash(String);

impl BlockHash {
	/// The normalized (lower-case) hash.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl From<String> for BlockHash {
	fn from(hash: String) -> Self {
		BlockHash(hash.to_lowercase())
	}
}

impl From<&str> for BlockHash {
	fn from(hash: &str) -> Self {
		BlockHash(hash.to_lowercase())
	}
}

impl From<BlockHash> for String {
	fn from(hash: BlockHash) -> Self {
		hash.0
	}
}

impl fmt::Display for BlockHash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Block number.
///
/// Headers encode the number as a `0x`-prefixed hex string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BlockHeight(u64);

impl BlockHeight {
	pub const fn new(height: u64) -> Self {
		BlockHeight(height)
	}

	pub const fn get(self) -> u64 {
		self.0
	}

	/// The height of the following block.
	pub const fn next(self) -> Self {
		BlockHeight(self.0.saturating_add(1))
	}

	/// Decode a hex encoded block number, with or without the `0x` prefix.
	pub fn from_hex(encoded: &str) -> Result<Self, ParseIntError> {
		let digits = encoded
			.strip_prefix("0x")
			.or_else(|| encoded.strip_prefix("0X"))
			.unwrap_or(encoded);
		u64::from_str_radix(digits, 16).map(BlockHeight)
	}
}

impl TryFrom<String> for BlockHeight {
	type Error = ParseIntError;

	fn try_from(encoded: String) -> Result<Self, Self::Error> {
		BlockHeight::from_hex(&encoded)
	}
}

impl From<BlockHeight> for String {
	fn from(height: BlockHeight) -> Self {
		format!("{:#x}", height.0)
	}
}

impl fmt::Display for BlockHeight {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Block header. Only the number is of interest to the exporter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Header {
	pub number: BlockHeight,
}

/// Block body with its header.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
	pub header: Header,
	/// Hex encoded extrinsics, in block order.
	#[serde(default)]
	pub extrinsics: Vec<String>,
}

/// The `result` of `chain_getBlock`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignedBlock {
	pub block: Block,
}

impl SignedBlock {
	pub fn height(&self) -> BlockHeight {
		self.block.header.number
	}

	pub fn extrinsic_count(&self) -> usize {
		self.block.extrinsics.len()
	}
}

/// The `result` of `system_health`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemHealth {
	pub is_syncing: bool,
	pub should_have_peers: bool,
	pub peers: u64,
}

/// Runtime version fields kept for the runtime info record, rendered as text.
pub type RuntimeInfo = BTreeMap<&'static str, String>;

/// Keep only the whitelisted fields of a `state_getRuntimeVersion` result.
pub fn retain_runtime_fields(version: &Map<String, Value>) -> RuntimeInfo {
	RUNTIME_FIELDS
		.iter()
		.filter_map(|field| version.get(*field).map(|value| (*field, as_text(value))))
		.collect()
}

fn as_text(value: &Value) -> String {
	match value {
		Value::String(s) => s.clone(),
		other => other.to_string(),
	}
}
