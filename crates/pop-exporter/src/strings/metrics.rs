// SPDX-License-Identifier: GPL-3.0

//! Metric names and help texts exposed on the scrape endpoint.

/// Block tracking metrics.
pub mod chain {
	pub const HIGHEST_BLOCK: (&str, &str) =
		("polkadot_highest_block", "Number of the highest block in chain as seen by current node");
	pub const BLOCKS: (&str, &str) =
		("polkadot_blocks", "Number of blocks received by current node");
	pub const EXTRINSICS: (&str, &str) =
		("polkadot_extrinsics", "Number of extrinsics received by current node");
}

/// Finality metrics.
pub mod finality {
	pub const FINAL_BLOCK: (&str, &str) =
		("polkadot_final_block", "Number of last finalized block");
	pub const DELAY_BLOCKS: (&str, &str) = (
		"polkadot_finality_delay_blocks",
		"Difference in blocks between head and finalized blocks",
	);
	pub const DELAY_BLOCKS_HISTOGRAM: (&str, &str) = (
		"polkadot_finality_delay_blocks_histogram",
		"Histogram of the difference in blocks between head and finalized blocks",
	);
}

/// Node information metrics.
pub mod node {
	pub const SYSTEM_INFO: (&str, &str) = ("polkadot_system_info", "Polkadot system information");
	pub const SYSTEM_INFO_LABELS: [&str; 3] = ["name", "version", "chain"];
	pub const RUNTIME_INFO: (&str, &str) =
		("polkadot_runtime_info", "Polkadot runtime information");
	pub const SYNCING: (&str, &str) =
		("polkadot_node_syncing", "1 if a Polkadot node is syncing, 0 otherwise");
	pub const SHOULD_HAVE_PEERS: (&str, &str) = (
		"polkadot_node_should_have_peers",
		"1 if a Polkadot node should have peers, 0 otherwise",
	);
	pub const PEERS: (&str, &str) = ("polkadot_node_peers", "Number of peers");
	pub const PENDING_EXTRINSICS: (&str, &str) =
		("polkadot_pending_extrinsics", "Polkadot pending extrinsics count as seen by a node");
}

/// Exporter self-observation metrics.
pub mod exporter {
	pub const RPC_CALLS: (&str, &str) =
		("polkadot_exporter_rpc_calls", "Total number of RPC calls made by metric exporter");
	pub const RPC_SUCCESS: (&str, &str) =
		("polkadot_exporter_rpc_success", "RPC calls answered successfully");
	pub const RPC_NETWORK_ERROR: (&str, &str) =
		("polkadot_exporter_rpc_network_error", "RPC connectivity errors");
	pub const RPC_UNEXPECTED_STATUS: (&str, &str) =
		("polkadot_exporter_rpc_unexpected_status", "RPC call unexpected HTTP status errors");
	pub const RPC_4XX_ERROR: (&str, &str) =
		("polkadot_exporter_rpc_4xx_error", "RPC call HTTP 4xx errors");
	pub const RPC_5XX_ERROR: (&str, &str) =
		("polkadot_exporter_rpc_5xx_error", "RPC call HTTP 5xx errors");
	pub const RPC_DECLINED: (&str, &str) =
		("polkadot_exporter_rpc_error", "RPC calls declined by Polkadot node");
	pub const CACHE_HITS: (&str, &str) =
		("polkadot_exporter_block_cache_hits", "Block lookups answered from the block cache");
	pub const CACHE_MISSES: (&str, &str) =
		("polkadot_exporter_block_cache_misses", "Block lookups that required an RPC fetch");
	pub const CACHE_EVICTIONS: (&str, &str) =
		("polkadot_exporter_block_cache_evictions", "Blocks dropped from the block cache");
	pub const CACHE_SIZE: (&str, &str) =
		("polkadot_exporter_block_cache_size", "Number of blocks held in the block cache");
}
