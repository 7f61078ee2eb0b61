// SPDX-License-Identifier: GPL-3.0

//! String constants for the RPC client module.

/// JSON-RPC method names consumed by the exporter.
///
/// These match the legacy RPC method names in the Polkadot SDK JSON-RPC specification.
pub mod methods {
	pub const CHAIN_GET_BLOCK_HASH: &str = "chain_getBlockHash";
	pub const CHAIN_GET_BLOCK: &str = "chain_getBlock";
	pub const CHAIN_GET_FINALIZED_HEAD: &str = "chain_getFinalizedHead";
	pub const SYSTEM_NAME: &str = "system_name";
	pub const SYSTEM_VERSION: &str = "system_version";
	pub const SYSTEM_CHAIN: &str = "system_chain";
	pub const SYSTEM_HEALTH: &str = "system_health";
	pub const STATE_GET_RUNTIME_VERSION: &str = "state_getRuntimeVersion";
	pub const AUTHOR_PENDING_EXTRINSICS: &str = "author_pendingExtrinsics";
}

/// JSON-RPC 2.0 envelope constants.
pub mod envelope {
	/// Protocol version sent with every request.
	pub const JSONRPC_VERSION: &str = "2.0";
}

/// Runtime version fields retained by the system info updater.
///
/// Every other field of `state_getRuntimeVersion` (e.g. `apis`) is dropped.
pub const RUNTIME_FIELDS: [&str; 5] =
	["authoringVersion", "implName", "implVersion", "specName", "specVersion"];
