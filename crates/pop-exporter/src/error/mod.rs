// SPDX-License-Identifier: GPL-3.0

//! Error types for exporter operations.
//!
//! This module contains all error types used throughout the `pop-exporter` crate,
//! organized by context:
//!
//! - [`rpc::RpcClientError`] - Classified failures of a single RPC call.
//! - [`rpc::RpcFailure`] - The collapsed failure signal seen by callers above the RPC client.
//! - [`exporter::ExporterError`] - Errors from the catch-up engine, periodic tasks and the run
//!   loop.

pub mod exporter;
pub mod rpc;

pub use exporter::ExporterError;
pub use rpc::{FailureKind, RpcClientError, RpcFailure};
