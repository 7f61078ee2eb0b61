// SPDX-License-Identifier: GPL-3.0

//! Exporter error types.

use crate::error::RpcFailure;
use thiserror::Error;

/// Errors that can occur while polling the node or serving metrics.
#[derive(Debug, Error)]
pub enum ExporterError {
	/// An RPC call failed; the current polling cycle is abandoned.
	#[error(transparent)]
	Rpc(#[from] RpcFailure),
	/// The `result` field of a response did not have the expected shape.
	#[error("Invalid RPC response for `{method}`: {message}")]
	InvalidResponse {
		/// The RPC method that was called.
		method: &'static str,
		/// The decoding error.
		message: String,
	},
	/// The node's view of its own chain contradicts itself.
	#[error("Inconsistent node state: {0}")]
	Inconsistent(String),
	/// A metric could not be created or registered.
	#[error("Metrics error: {0}")]
	Metrics(#[from] prometheus::Error),
	/// The HTTP client could not be built.
	#[error("HTTP client error: {0}")]
	Http(#[from] reqwest::Error),
	/// IO error.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
}

impl ExporterError {
	/// Whether the error must terminate the exporter.
	///
	/// Failed calls and malformed results only abort the current polling cycle; the next
	/// cycle retries from the same position.
	pub fn is_fatal(&self) -> bool {
		!matches!(self, Self::Rpc(_) | Self::InvalidResponse { .. })
	}
}
