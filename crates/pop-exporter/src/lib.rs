// SPDX-License-Identifier: GPL-3.0

//! Prometheus exporter for Polkadot SDK nodes.
//!
//! The exporter polls a node's JSON-RPC interface, observes every newly produced block exactly
//! once, tracks how far finality lags behind the head and republishes what it sees as
//! Prometheus metrics.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Exporter (poll loop)                     │
//! └─────────────────────────────────────────────────────────────────┘
//!            │ every poll                          ▲ scrape
//!            ▼                                     │
//! ┌──────────────────────────┐          ┌──────────────────────────┐
//! │     Catch-Up Engine      │          │  Metrics server (axum)   │
//! │  head → walk → observe   │          │     GET / and /metrics   │
//! └──────────────────────────┘          └──────────────────────────┘
//!       │              │                           ▲
//!       │              ▼                           │
//!       │   ┌──────────────────────┐    ┌──────────────────────────┐
//!       │   │   Periodic tasks     │───▶│   prometheus::Registry   │
//!       │   │ system, health,      │    └──────────────────────────┘
//!       │   │ mempool, finality    │
//!       │   └──────────────────────┘
//!       ▼              │
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 Block Cache (bounded, by hash)                  │
//! └─────────────────────────────────────────────────────────────────┘
//!                                 │
//!                                 ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 RPC Client (JSON-RPC over HTTP)                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod cache;
pub mod catch_up;
pub mod error;
pub mod exporter;
pub mod metrics;
pub mod models;
pub mod rpc;
mod strings;
pub mod tasks;
#[cfg(test)]
mod testing;

pub use cache::BlockCache;
pub use catch_up::{CatchUpEngine, CatchUpState};
pub use error::{ExporterError, RpcClientError, RpcFailure};
pub use exporter::{Exporter, ExporterConfig};
pub use models::{BlockHash, BlockHeight, SignedBlock};
pub use rpc::{HttpRpcClient, NodeRpc, RpcEnvelope};
pub use tasks::{PeriodicTask, Scheduler};
