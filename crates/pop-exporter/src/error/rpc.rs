// SPDX-License-Identifier: GPL-3.0

//! RPC client error types.

use thiserror::Error;

/// Errors that can occur when issuing a call to the node.
#[derive(Debug, Error)]
pub enum RpcClientError {
	/// The request never produced a decodable response (connection refused, timeout, DNS,
	/// malformed body).
	#[error("RPC request `{method}` failed: {message}")]
	Network {
		/// The RPC method that was called.
		method: String,
		/// The error message describing the failure.
		message: String,
	},
	/// The node answered with a 4xx HTTP status.
	#[error("RPC request `{method}` was rejected with HTTP status {status}")]
	ClientStatus {
		/// The RPC method that was called.
		method: String,
		/// The HTTP status code.
		status: u16,
	},
	/// The node answered with a 5xx HTTP status.
	#[error("RPC request `{method}` hit a server error with HTTP status {status}")]
	ServerStatus {
		/// The RPC method that was called.
		method: String,
		/// The HTTP status code.
		status: u16,
	},
	/// The node answered with a non-200 status outside the 4xx and 5xx ranges.
	#[error("RPC request `{method}` returned unexpected HTTP status {status}")]
	UnexpectedStatus {
		/// The RPC method that was called.
		method: String,
		/// The HTTP status code.
		status: u16,
	},
	/// The node answered but declined the call with a JSON-RPC error.
	#[error("RPC request `{method}` was declined by the node: {error}")]
	Declined {
		/// The RPC method that was called.
		method: String,
		/// The serialized `error` field of the response.
		error: String,
	},
}

/// The kind of a failed RPC call, used for tallying.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
	Network,
	ClientStatus,
	ServerStatus,
	UnexpectedStatus,
	Declined,
}

impl RpcClientError {
	/// Classify a non-200 HTTP status.
	pub fn from_status(method: &str, status: u16) -> Self {
		let method = method.to_string();
		match status {
			400..=499 => Self::ClientStatus { method, status },
			500..=599 => Self::ServerStatus { method, status },
			_ => Self::UnexpectedStatus { method, status },
		}
	}

	/// The kind of this failure.
	pub fn kind(&self) -> FailureKind {
		match self {
			Self::Network { .. } => FailureKind::Network,
			Self::ClientStatus { .. } => FailureKind::ClientStatus,
			Self::ServerStatus { .. } => FailureKind::ServerStatus,
			Self::UnexpectedStatus { .. } => FailureKind::UnexpectedStatus,
			Self::Declined { .. } => FailureKind::Declined,
		}
	}

	/// The RPC method whose call failed.
	pub fn method(&self) -> &str {
		match self {
			Self::Network { method, .. } |
			Self::ClientStatus { method, .. } |
			Self::ServerStatus { method, .. } |
			Self::UnexpectedStatus { method, .. } |
			Self::Declined { method, .. } => method,
		}
	}
}

/// A failed RPC call with every sub-kind collapsed.
///
/// Callers above the RPC client only care whether a call succeeded; the detailed
/// [`RpcClientError`] has already been tallied by the client by the time this is produced.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("RPC request `{method}` failed")]
pub struct RpcFailure {
	/// The RPC method whose call failed.
	pub method: String,
}

impl From<RpcClientError> for RpcFailure {
	fn from(e: RpcClientError) -> Self {
		log::debug!("{e}");
		RpcFailure { method: e.method().to_string() }
	}
}
