// SPDX-License-Identifier: GPL-3.0

//! Auxiliary collectors running at their own fixed intervals.
//!
//! Node information changes at very different rates (runtime version rarely, finality several
//! times per second), so each collector is a [`PeriodicTask`] with its own minimum interval.
//! The [`Scheduler`] is ticked often (every poll and after every block observed during a
//! catch-up) and only runs the tasks that are due.
//!
//! A task failing on an RPC call or a malformed result loses that run only: the failure is
//! logged and swallowed at the task boundary, and the sibling tasks still run. Fatal errors are
//! returned to the caller.

mod finality;
mod health;
mod mempool;
mod system;

pub use finality::FinalityUpdater;
pub use health::HealthUpdater;
pub use mempool::MemPoolUpdater;
pub use system::SystemInfoUpdater;

use crate::{cache::BlockCache, error::ExporterError, rpc::NodeRpc};
use async_trait::async_trait;
use prometheus::Registry;
use std::{sync::Arc, time::Duration};
use tokio::time::Instant;

/// A collector run at most once per [`PeriodicTask::interval`].
#[async_trait]
pub trait PeriodicTask: Send {
	/// Name used in logs.
	fn name(&self) -> &'static str;

	/// Minimum time between two runs.
	fn interval(&self) -> Duration;

	/// Collect and publish.
	///
	/// # Arguments
	/// * `cache` - Block cache shared with the catch-up engine
	async fn perform(&mut self, cache: &mut BlockCache) -> Result<(), ExporterError>;
}

/// A task with the time of its last run.
struct Scheduled {
	task: Box<dyn PeriodicTask>,
	last_run: Option<Instant>,
}

impl Scheduled {
	fn is_due(&self, now: Instant) -> bool {
		self.last_run.is_none_or(|last| now.duration_since(last) >= self.task.interval())
	}

	async fn run(&mut self, cache: &mut BlockCache) -> Result<(), ExporterError> {
		let now = Instant::now();
		if !self.is_due(now) {
			return Ok(());
		}
		// Recorded before running, so a slow or failing task waits a full interval too.
		self.last_run = Some(now);

		match self.task.perform(cache).await {
			Err(e) if !e.is_fatal() => {
				log::debug!("Periodic task `{}` failed: {e}", self.task.name());
				Ok(())
			},
			outcome => outcome,
		}
	}
}

/// Runs the due tasks, in registration order.
#[derive(Default)]
pub struct Scheduler {
	tasks: Vec<Scheduled>,
}

impl Scheduler {
	pub fn new() -> Self {
		Self::default()
	}

	/// The standard collectors: system info, health, mempool and finality.
	pub fn with_default_tasks(
		rpc: Arc<dyn NodeRpc>,
		registry: &Registry,
	) -> Result<Self, ExporterError> {
		Ok(Self::new()
			.with(SystemInfoUpdater::new(rpc.clone(), registry)?)
			.with(HealthUpdater::new(rpc.clone(), registry)?)
			.with(MemPoolUpdater::new(rpc.clone(), registry)?)
			.with(FinalityUpdater::new(rpc, registry)?))
	}

	/// Add a task. It is due immediately.
	pub fn with(mut self, task: impl PeriodicTask + 'static) -> Self {
		self.tasks.push(Scheduled { task: Box::new(task), last_run: None });
		self
	}

	pub fn len(&self) -> usize {
		self.tasks.len()
	}

	pub fn is_empty(&self) -> bool {
		self.tasks.is_empty()
	}

	/// Run every task whose interval has elapsed.
	///
	/// Non-fatal task failures are swallowed; the first fatal one stops the run and is returned.
	pub async fn run_due(&mut self, cache: &mut BlockCache) -> Result<(), ExporterError> {
		for scheduled in &mut self.tasks {
			scheduled.run(cache).await?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{error::RpcFailure, metrics::CacheMetrics, testing::MockNode};
	use std::sync::{
		Mutex,
		atomic::{AtomicUsize, Ordering},
	};

	/// Counts its runs and fails with the scripted error.
	struct Probe {
		interval: Duration,
		runs: Arc<AtomicUsize>,
		failure: Arc<Mutex<Option<ExporterError>>>,
	}

	impl Probe {
		fn new(interval: Duration) -> (Self, Arc<AtomicUsize>, Arc<Mutex<Option<ExporterError>>>) {
			let runs = Arc::new(AtomicUsize::new(0));
			let failure = Arc::new(Mutex::new(None));
			(Self { interval, runs: runs.clone(), failure: failure.clone() }, runs, failure)
		}
	}

	#[async_trait]
	impl PeriodicTask for Probe {
		fn name(&self) -> &'static str {
			"probe"
		}

		fn interval(&self) -> Duration {
			self.interval
		}

		async fn perform(&mut self, _cache: &mut BlockCache) -> Result<(), ExporterError> {
			self.runs.fetch_add(1, Ordering::SeqCst);
			match self.failure.lock().unwrap().take() {
				Some(e) => Err(e),
				None => Ok(()),
			}
		}
	}

	fn cache() -> BlockCache {
		let metrics = CacheMetrics::register(&Registry::new()).unwrap();
		BlockCache::new(Arc::new(MockNode::default()), 4, metrics)
	}

	fn rpc_failure() -> ExporterError {
		RpcFailure { method: "system_health".to_string() }.into()
	}

	#[tokio::test(start_paused = true)]
	async fn task_runs_at_most_once_per_interval() {
		let (probe, runs, _) = Probe::new(Duration::from_secs(1));
		let mut scheduler = Scheduler::new().with(probe);
		let mut cache = cache();

		scheduler.run_due(&mut cache).await.unwrap();
		assert_eq!(runs.load(Ordering::SeqCst), 1);

		tokio::time::advance(Duration::from_millis(999)).await;
		scheduler.run_due(&mut cache).await.unwrap();
		assert_eq!(runs.load(Ordering::SeqCst), 1);

		tokio::time::advance(Duration::from_millis(1)).await;
		scheduler.run_due(&mut cache).await.unwrap();
		assert_eq!(runs.load(Ordering::SeqCst), 2);
	}

	#[tokio::test(start_paused = true)]
	async fn tasks_keep_independent_intervals() {
		let (fast, fast_runs, _) = Probe::new(Duration::from_millis(200));
		let (slow, slow_runs, _) = Probe::new(Duration::from_secs(300));
		let mut scheduler = Scheduler::new().with(fast).with(slow);
		let mut cache = cache();

		for _ in 0..10 {
			scheduler.run_due(&mut cache).await.unwrap();
			tokio::time::advance(Duration::from_millis(200)).await;
		}
		assert_eq!(fast_runs.load(Ordering::SeqCst), 10);
		assert_eq!(slow_runs.load(Ordering::SeqCst), 1);
	}

	#[tokio::test(start_paused = true)]
	async fn failed_run_is_isolated_and_not_retried_early() {
		let (failing, failing_runs, failure) = Probe::new(Duration::from_secs(1));
		let (sibling, sibling_runs, _) = Probe::new(Duration::from_secs(1));
		*failure.lock().unwrap() = Some(rpc_failure());
		let mut scheduler = Scheduler::new().with(failing).with(sibling);
		let mut cache = cache();

		scheduler.run_due(&mut cache).await.unwrap();
		assert_eq!(failing_runs.load(Ordering::SeqCst), 1);
		assert_eq!(sibling_runs.load(Ordering::SeqCst), 1);

		// The failed task is not re-entered on the next tick.
		scheduler.run_due(&mut cache).await.unwrap();
		assert_eq!(failing_runs.load(Ordering::SeqCst), 1);
	}

	#[tokio::test(start_paused = true)]
	async fn fatal_failure_is_returned() {
		let (probe, _, failure) = Probe::new(Duration::from_secs(1));
		*failure.lock().unwrap() = Some(ExporterError::Inconsistent("head is gone".into()));
		let mut scheduler = Scheduler::new().with(probe);

		let err = scheduler.run_due(&mut cache()).await.unwrap_err();
		assert!(matches!(err, ExporterError::Inconsistent(_)));
	}

	#[test]
	fn default_tasks_register_all_collectors() {
		let registry = Registry::new();
		let scheduler =
			Scheduler::with_default_tasks(Arc::new(MockNode::default()), &registry).unwrap();
		assert_eq!(scheduler.len(), 4);
	}
}
