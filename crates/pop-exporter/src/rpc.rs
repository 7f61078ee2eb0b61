// SPDX-License-Identifier: GPL-3.0

//! JSON-RPC client for polling a Polkadot SDK node over HTTP.
//!
//! The exporter only needs request/response calls to the legacy `chain_*`, `system_*`,
//! `state_*` and `author_*` methods, one HTTP request per call.
//!
//! # Result convention
//!
//! Calls return the full decoded response envelope ([`RpcEnvelope`]); callers read the
//! `result` field themselves. The typed helpers on [`NodeRpc`] do exactly that for every method
//! the exporter consumes.
//!
//! # Failure handling
//!
//! [`NodeRpc::try_call`] classifies each failure ([`RpcClientError`]) and the client tallies
//! every outcome, success or failure, in [`RpcMetrics`]. [`NodeRpc::call`] collapses all
//! failure kinds into a single [`RpcFailure`] for callers that only care whether the call
//! succeeded.

use crate::{
	error::{ExporterError, RpcClientError, RpcFailure},
	metrics::RpcMetrics,
	models::{
		BlockHash, BlockHeight, RuntimeInfo, SignedBlock, SystemHealth, retain_runtime_fields,
	},
	strings::rpc::{envelope::JSONRPC_VERSION, methods},
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Map, Value, json};
use std::{
	sync::atomic::{AtomicU64, Ordering},
	time::Duration,
};
use url::Url;

static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// A decoded JSON-RPC response.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct RpcEnvelope {
	#[serde(default)]
	pub id: Value,
	/// The call's result. `null` when the node has nothing for the request (e.g. an unknown
	/// block).
	#[serde(default)]
	pub result: Value,
	#[serde(default)]
	pub error: Option<Value>,
}

impl RpcEnvelope {
	/// An envelope carrying a successful result.
	pub fn with_result(result: Value) -> Self {
		Self { result, ..Default::default() }
	}

	/// Whether the node declined the call, i.e. the `error` field holds a non-empty value.
	pub fn is_declined(&self) -> bool {
		match &self.error {
			None | Some(Value::Null) => false,
			Some(Value::Bool(flag)) => *flag,
			Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
			Some(Value::String(s)) => !s.is_empty(),
			Some(Value::Array(items)) => !items.is_empty(),
			Some(Value::Object(fields)) => !fields.is_empty(),
		}
	}

	/// Decode the `result` field.
	pub fn decode<T: DeserializeOwned>(self, method: &'static str) -> Result<T, ExporterError> {
		serde_json::from_value(self.result)
			.map_err(|e| ExporterError::InvalidResponse { method, message: e.to_string() })
	}
}

/// Calls to a node.
///
/// Implemented by [`HttpRpcClient`]; the typed helpers are provided on top of
/// [`NodeRpc::try_call`].
#[async_trait]
pub trait NodeRpc: Send + Sync {
	/// Issue a call, classifying any failure.
	async fn try_call(
		&self,
		method: &str,
		params: Vec<Value>,
	) -> Result<RpcEnvelope, RpcClientError>;

	/// Issue a call, collapsing every failure kind into [`RpcFailure`].
	async fn call(&self, method: &str, params: Vec<Value>) -> Result<RpcEnvelope, RpcFailure> {
		self.try_call(method, params).await.map_err(RpcFailure::from)
	}

	/// Hash of the block at `height`, or of the current head when `height` is `None`.
	///
	/// Returns `Ok(None)` when the node knows no block at that height.
	async fn block_hash(
		&self,
		height: Option<BlockHeight>,
	) -> Result<Option<BlockHash>, ExporterError> {
		let params = height.map(|h| vec![json!(h.get())]).unwrap_or_default();
		self.call(methods::CHAIN_GET_BLOCK_HASH, params)
			.await?
			.decode(methods::CHAIN_GET_BLOCK_HASH)
	}

	/// Fetch a block by hash. Returns `Ok(None)` when the node has no such block.
	async fn block(&self, hash: &BlockHash) -> Result<Option<SignedBlock>, ExporterError> {
		self.call(methods::CHAIN_GET_BLOCK, vec![json!(hash.as_str())])
			.await?
			.decode(methods::CHAIN_GET_BLOCK)
	}

	/// Hash of the latest finalized block, if the node has finalized any.
	async fn finalized_head(&self) -> Result<Option<BlockHash>, ExporterError> {
		self.call(methods::CHAIN_GET_FINALIZED_HEAD, vec![])
			.await?
			.decode(methods::CHAIN_GET_FINALIZED_HEAD)
	}

	/// Call one of the parameterless `system_*` methods that answer with text.
	async fn system_text(&self, method: &'static str) -> Result<String, ExporterError> {
		self.call(method, vec![]).await?.decode(method)
	}

	/// The whitelisted runtime version fields, rendered as text.
	async fn runtime_version(&self) -> Result<RuntimeInfo, ExporterError> {
		let version: Map<String, Value> = self
			.call(methods::STATE_GET_RUNTIME_VERSION, vec![])
			.await?
			.decode(methods::STATE_GET_RUNTIME_VERSION)?;
		Ok(retain_runtime_fields(&version))
	}

	async fn system_health(&self) -> Result<SystemHealth, ExporterError> {
		self.call(methods::SYSTEM_HEALTH, vec![]).await?.decode(methods::SYSTEM_HEALTH)
	}

	/// Number of extrinsics waiting in the node's transaction pool.
	async fn pending_extrinsics(&self) -> Result<usize, ExporterError> {
		let pending: Vec<Value> = self
			.call(methods::AUTHOR_PENDING_EXTRINSICS, vec![])
			.await?
			.decode(methods::AUTHOR_PENDING_EXTRINSICS)?;
		Ok(pending.len())
	}
}

/// JSON-RPC over HTTP client.
///
/// Every call gets the next request id, starting at 1.
#[derive(Debug)]
pub struct HttpRpcClient {
	http: Client,
	endpoint: Url,
	next_id: AtomicU64,
	metrics: RpcMetrics,
}

impl HttpRpcClient {
	/// Create a client for the node at `endpoint`.
	///
	/// # Arguments
	/// * `endpoint` - HTTP URL of the node's RPC endpoint (e.g., `http://127.0.0.1:9933/`)
	/// * `timeout` - Transport timeout applied to every call
	/// * `metrics` - Tallies receiving the outcome of every call
	pub fn new(
		endpoint: Url,
		timeout: Duration,
		metrics: RpcMetrics,
	) -> Result<Self, ExporterError> {
		let http = Client::builder().user_agent(APP_USER_AGENT).timeout(timeout).build()?;
		Ok(Self { http, endpoint, next_id: AtomicU64::new(1), metrics })
	}

	/// Get the endpoint URL this client talks to.
	pub fn endpoint(&self) -> &Url {
		&self.endpoint
	}

	async fn send(&self, method: &str, request: &Value) -> Result<RpcEnvelope, RpcClientError> {
		let network = |e: reqwest::Error| RpcClientError::Network {
			method: method.to_string(),
			message: e.to_string(),
		};

		let response =
			self.http.post(self.endpoint.clone()).json(request).send().await.map_err(network)?;

		let status = response.status();
		if status != StatusCode::OK {
			return Err(RpcClientError::from_status(method, status.as_u16()));
		}

		let envelope: RpcEnvelope = response.json().await.map_err(network)?;
		if envelope.is_declined() {
			return Err(RpcClientError::Declined {
				method: method.to_string(),
				error: envelope.error.unwrap_or_default().to_string(),
			});
		}
		Ok(envelope)
	}
}

#[async_trait]
impl NodeRpc for HttpRpcClient {
	async fn try_call(
		&self,
		method: &str,
		params: Vec<Value>,
	) -> Result<RpcEnvelope, RpcClientError> {
		let id = self.next_id.fetch_add(1, Ordering::Relaxed);
		let request = json!({
			"jsonrpc": JSONRPC_VERSION,
			"method": method,
			"params": params,
			"id": id,
		});

		let outcome = self.send(method, &request).await;
		self.metrics.record(&outcome);
		outcome
	}
}
