//! Periodic worker lifecycle
//!
//! Lifecycle of one worker:
//! 1. `start()` spawns a single tokio task running the tick loop
//! 2. The loop ticks, then sleeps `interval` (or yields when it is zero)
//! 3. `request_stop()` clears the `running` flag; the loop exits at its next
//!    check, which the cancellation token pulls forward out of the sleep
//! 4. `stop_and_wait()` adds a bounded poll for the exit
//! 5. `force_terminate()` waits up to a deadline, then aborts the task
//!
//! The motion state lives behind an async mutex shared with the loop, so a
//! later `start()` resumes from wherever the previous run left off.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::{AbortHandle, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::{Tick, WorkerConfig, WorkerError};
use crate::observability::{MetricsSnapshot, WorkerMetrics};

/// Poll period while waiting out a force-terminate deadline
const EXIT_POLL: Duration = Duration::from_millis(1);

/// How `force_terminate` ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Nothing was running
    Idle,
    /// The loop observed the stop request before the deadline
    Cooperative,
    /// The deadline passed and the task was aborted
    Aborted,
}

struct Shared {
    running: AtomicBool,
    active: AtomicBool,
    metrics: WorkerMetrics,
}

struct Run {
    /// Dropped once a bounded stop gives up on it
    handle: Option<JoinHandle<()>>,
    abort: AbortHandle,
    cancel: CancellationToken,
}

/// Marks the execution unit as alive for as long as the loop future exists.
///
/// Dropped on normal exit, on tick failure and on abort alike.
struct ActiveGuard {
    shared: Arc<Shared>,
}

impl ActiveGuard {
    fn new(shared: Arc<Shared>) -> Self {
        shared.metrics.unit_spawned();
        Self { shared }
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.shared.running.store(false, Ordering::Release);
        self.shared.metrics.unit_exited();
        // Last, so a new start() never overlaps this unit
        self.shared.active.store(false, Ordering::Release);
    }
}

pub struct PeriodicWorker<T: Tick> {
    name: &'static str,
    interval: Duration,
    step: Arc<Mutex<T>>,
    shared: Arc<Shared>,
    run: Option<Run>,
}

impl<T: Tick> PeriodicWorker<T> {
    pub fn new(name: &'static str, interval: Duration, step: T) -> Self {
        Self {
            name,
            interval,
            step: Arc::new(Mutex::new(step)),
            shared: Arc::new(Shared {
                running: AtomicBool::new(false),
                active: AtomicBool::new(false),
                metrics: WorkerMetrics::new(),
            }),
            run: None,
        }
    }

    pub fn from_config(name: &'static str, config: WorkerConfig, step: T) -> Self {
        Self::new(name, config.step_interval, step)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Cooperative run flag
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Whether an execution unit is still alive, stopping or not
    pub fn is_active(&self) -> bool {
        self.shared.active.load(Ordering::Acquire)
    }

    /// Whether a handle to a live execution unit is held. A unit that exited
    /// on its own, after a stop request or a failed tick, no longer counts.
    pub fn has_handle(&self) -> bool {
        self.run
            .as_ref()
            .and_then(|run| run.handle.as_ref())
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.shared.metrics.snapshot()
    }

    /// Snapshot of the motion state. Waits for an in-flight tick to finish.
    pub async fn state(&self) -> T::State {
        self.step.lock().await.state()
    }

    /// Spawn the loop. Must be called from within a tokio runtime.
    ///
    /// Rejected while a previous unit is alive, including one that is still
    /// winding down after a stop request.
    pub fn start(&mut self) -> Result<(), WorkerError> {
        if self.shared.active.swap(true, Ordering::AcqRel) {
            warn!(worker = self.name, "Start rejected, execution unit still active");
            return Err(WorkerError::AlreadyRunning { worker: self.name });
        }

        self.reap();
        self.shared.running.store(true, Ordering::Release);
        self.shared.metrics.started();

        let cancel = CancellationToken::new();
        let guard = ActiveGuard::new(Arc::clone(&self.shared));
        let handle = tokio::spawn(run_loop(
            self.name,
            self.interval,
            Arc::clone(&self.step),
            Arc::clone(&self.shared),
            cancel.clone(),
            guard,
        ));

        self.run = Some(Run {
            abort: handle.abort_handle(),
            handle: Some(handle),
            cancel,
        });

        info!(
            worker = self.name,
            interval_ms = self.interval.as_secs_f64() * 1000.0,
            "Worker started"
        );
        Ok(())
    }

    /// Clear the running flag without waiting
    pub fn request_stop(&self) {
        let was_running = self.shared.running.swap(false, Ordering::AcqRel);

        if let Some(run) = &self.run {
            run.cancel.cancel();
        }

        if was_running {
            info!(worker = self.name, "Stop requested");
        }
    }

    /// Request a stop and poll for the loop to exit, at most `max_attempts`
    /// times one interval apart.
    ///
    /// The join handle is discarded whatever the outcome. On
    /// `ShutdownTimeout` the unit may still be alive; `force_terminate` can
    /// still reach it.
    pub async fn stop_and_wait(&mut self, max_attempts: u32) -> Result<(), WorkerError> {
        self.request_stop();

        let mut attempts = 0;
        while self.is_active() && attempts < max_attempts {
            pause(self.interval).await;
            attempts += 1;
        }

        if let Some(run) = self.run.as_mut() {
            run.handle = None;
        }

        if self.is_active() {
            warn!(worker = self.name, attempts, "Worker did not stop within budget");
            return Err(WorkerError::ShutdownTimeout {
                worker: self.name,
                attempts,
            });
        }

        self.run = None;
        debug!(worker = self.name, attempts, "Worker stopped");
        Ok(())
    }

    /// Shutdown path: stop cooperatively if the loop exits within
    /// `deadline`, otherwise abort the task at its current await point.
    ///
    /// Not for ordinary start/stop cycling.
    pub async fn force_terminate(&mut self, deadline: Duration) -> Termination {
        let was_active = self.is_active();
        self.request_stop();

        if !was_active {
            self.run = None;
            return Termination::Idle;
        }

        let exited = tokio::time::timeout(deadline, self.wait_inactive())
            .await
            .is_ok();
        let run = self.run.take();

        if exited {
            info!(worker = self.name, "Worker stopped before deadline");
            return Termination::Cooperative;
        }

        if let Some(run) = run {
            run.abort.abort();
        }
        warn!(
            worker = self.name,
            deadline_ms = deadline.as_millis() as u64,
            "Worker aborted after deadline"
        );
        Termination::Aborted
    }

    /// Drop the previous run once its task has completed
    fn reap(&mut self) {
        let finished = self
            .run
            .as_ref()
            .is_some_and(|run| run.handle.as_ref().is_none_or(|handle| handle.is_finished()));

        if finished {
            self.run = None;
        }
    }

    async fn wait_inactive(&self) {
        while self.is_active() {
            tokio::time::sleep(EXIT_POLL).await;
        }
    }
}

impl<T: Tick> Drop for PeriodicWorker<T> {
    fn drop(&mut self) {
        self.request_stop();
    }
}

async fn pause(interval: Duration) {
    if interval.is_zero() {
        tokio::task::yield_now().await;
    } else {
        tokio::time::sleep(interval).await;
    }
}

async fn run_loop<T: Tick>(
    name: &'static str,
    interval: Duration,
    step: Arc<Mutex<T>>,
    shared: Arc<Shared>,
    cancel: CancellationToken,
    _guard: ActiveGuard,
) {
    debug!(worker = name, "Loop entered");

    while shared.running.load(Ordering::Acquire) {
        let outcome = step.lock().await.tick().await;

        if let Err(e) = outcome {
            shared.metrics.failed();
            shared.running.store(false, Ordering::Release);
            error!(worker = name, error = %e, "Tick failed, stopping worker");
            break;
        }
        shared.metrics.ticked();

        tokio::select! {
            _ = pause(interval) => {}
            _ = cancel.cancelled() => {}
        }
    }

    debug!(worker = name, ticks = shared.metrics.ticks(), "Loop exited");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GeometryError;
    use crate::worker::TickError;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicU64;
    use tokio::time::{Instant, sleep, timeout};

    const DEFAULT_ATTEMPTS: u32 = crate::worker::DEFAULT_STOP_ATTEMPTS;

    /// Counts ticks; optionally fails or stalls on a given tick
    struct Counter {
        count: Arc<AtomicU64>,
        fail_at: Option<u64>,
        stall_at: Option<u64>,
    }

    impl Counter {
        fn new() -> (Self, Arc<AtomicU64>) {
            let count = Arc::new(AtomicU64::new(0));
            let counter = Counter {
                count: Arc::clone(&count),
                fail_at: None,
                stall_at: None,
            };
            (counter, count)
        }
    }

    #[async_trait]
    impl Tick for Counter {
        type State = u64;

        async fn tick(&mut self) -> Result<(), TickError> {
            let n = self.count.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_at == Some(n) {
                return Err(TickError::Geometry(GeometryError::InvalidArgument(
                    "boom".to_string(),
                )));
            }
            if self.stall_at == Some(n) {
                sleep(Duration::from_secs(30)).await;
            }
            Ok(())
        }

        fn state(&self) -> u64 {
            self.count.load(Ordering::SeqCst)
        }
    }

    async fn wait_for(mut condition: impl FnMut() -> bool) {
        timeout(Duration::from_secs(2), async {
            while !condition() {
                sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .expect("condition not reached in time");
    }

    #[tokio::test]
    async fn test_start_ticks_until_stopped() {
        let (counter, count) = Counter::new();
        let mut worker = PeriodicWorker::new("counter", Duration::from_millis(1), counter);

        worker.start().unwrap();
        assert!(worker.is_running());
        assert!(worker.has_handle());

        wait_for(|| count.load(Ordering::SeqCst) >= 3).await;
        worker.stop_and_wait(DEFAULT_ATTEMPTS).await.unwrap();

        assert!(!worker.is_running());
        assert!(!worker.is_active());
        assert!(!worker.has_handle());
        assert!(worker.metrics().ticks >= 3);
    }

    #[tokio::test]
    async fn test_second_start_is_rejected() {
        let (counter, _count) = Counter::new();
        let mut worker = PeriodicWorker::new("counter", Duration::from_millis(5), counter);

        worker.start().unwrap();
        let second = worker.start();

        assert_eq!(second, Err(WorkerError::AlreadyRunning { worker: "counter" }));
        assert_eq!(worker.metrics().active_units, 1);
        assert_eq!(worker.metrics().starts, 1);

        worker.stop_and_wait(DEFAULT_ATTEMPTS).await.unwrap();
        assert_eq!(worker.metrics().active_units, 0);
    }

    #[tokio::test]
    async fn test_request_stop_observed_within_interval() {
        let interval = Duration::from_millis(50);
        let (counter, count) = Counter::new();
        let mut worker = PeriodicWorker::new("counter", interval, counter);

        worker.start().unwrap();
        wait_for(|| count.load(Ordering::SeqCst) >= 1).await;

        let requested = Instant::now();
        worker.request_stop();
        wait_for(|| !worker.is_active()).await;

        assert!(requested.elapsed() <= interval * 2);
        assert!(!worker.is_running());
    }

    #[tokio::test]
    async fn test_restart_resumes_state() {
        let (counter, count) = Counter::new();
        let mut worker = PeriodicWorker::new("counter", Duration::from_millis(1), counter);

        worker.start().unwrap();
        wait_for(|| count.load(Ordering::SeqCst) >= 2).await;
        worker.stop_and_wait(DEFAULT_ATTEMPTS).await.unwrap();
        let paused_at = worker.state().await;

        worker.start().unwrap();
        wait_for(|| count.load(Ordering::SeqCst) > paused_at).await;
        worker.stop_and_wait(DEFAULT_ATTEMPTS).await.unwrap();

        assert!(worker.state().await > paused_at);
        assert_eq!(worker.metrics().starts, 2);
    }

    #[tokio::test]
    async fn test_tick_failure_stops_worker() {
        let (mut counter, _count) = Counter::new();
        counter.fail_at = Some(3);
        let mut worker = PeriodicWorker::new("failing", Duration::ZERO, counter);

        worker.start().unwrap();
        wait_for(|| !worker.is_active()).await;

        assert!(!worker.is_running());
        assert_eq!(worker.metrics().failures, 1);
        assert_eq!(worker.metrics().ticks, 2);

        // A failed worker can be started again
        worker.start().unwrap();
        worker.stop_and_wait(DEFAULT_ATTEMPTS).await.unwrap();
    }

    #[tokio::test]
    async fn test_handle_cleared_after_tick_failure() {
        let (mut counter, _count) = Counter::new();
        counter.fail_at = Some(1);
        let mut worker = PeriodicWorker::new("failing", Duration::from_millis(1), counter);

        worker.start().unwrap();
        wait_for(|| !worker.is_active()).await;
        wait_for(|| !worker.has_handle()).await;

        assert!(!worker.is_running());
        assert_eq!(worker.metrics().failures, 1);
    }

    #[tokio::test]
    async fn test_handle_cleared_after_request_stop() {
        let (counter, count) = Counter::new();
        let mut worker = PeriodicWorker::new("counter", Duration::from_millis(1), counter);

        worker.start().unwrap();
        wait_for(|| count.load(Ordering::SeqCst) >= 1).await;

        worker.request_stop();
        wait_for(|| !worker.is_active()).await;
        wait_for(|| !worker.has_handle()).await;

        // The reaped run does not block a fresh start
        worker.start().unwrap();
        assert!(worker.has_handle());
        worker.stop_and_wait(DEFAULT_ATTEMPTS).await.unwrap();
    }

    #[tokio::test]
    async fn test_stop_and_wait_times_out_on_stalled_tick() {
        let (mut counter, count) = Counter::new();
        counter.stall_at = Some(1);
        let mut worker = PeriodicWorker::new("stalled", Duration::from_millis(2), counter);

        worker.start().unwrap();
        wait_for(|| count.load(Ordering::SeqCst) >= 1).await;

        let result = worker.stop_and_wait(3).await;
        assert_eq!(
            result,
            Err(WorkerError::ShutdownTimeout {
                worker: "stalled",
                attempts: 3
            })
        );
        assert!(!worker.has_handle());
        assert!(worker.is_active());

        // The stalled unit still counts; no duplicate loop may start
        assert!(matches!(worker.start(), Err(WorkerError::AlreadyRunning { .. })));

        let outcome = worker.force_terminate(Duration::from_millis(5)).await;
        assert_eq!(outcome, Termination::Aborted);
        wait_for(|| !worker.is_active()).await;
        assert_eq!(worker.metrics().active_units, 0);
    }

    #[tokio::test]
    async fn test_force_terminate_cooperative_when_loop_sleeps() {
        let (counter, count) = Counter::new();
        let mut worker = PeriodicWorker::new("sleepy", Duration::from_secs(10), counter);

        worker.start().unwrap();
        wait_for(|| count.load(Ordering::SeqCst) >= 1).await;

        // The cancellation token wakes the loop out of its long sleep
        let outcome = worker.force_terminate(Duration::from_millis(500)).await;
        assert_eq!(outcome, Termination::Cooperative);
        assert!(!worker.is_active());
    }

    #[tokio::test]
    async fn test_force_terminate_idle() {
        let (counter, _count) = Counter::new();
        let mut worker = PeriodicWorker::new("idle", Duration::from_millis(1), counter);

        assert_eq!(worker.force_terminate(Duration::ZERO).await, Termination::Idle);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_zero_interval_runs_flat_out() {
        let (counter, count) = Counter::new();
        let mut worker = PeriodicWorker::new("fast", Duration::ZERO, counter);

        worker.start().unwrap();
        wait_for(|| count.load(Ordering::SeqCst) >= 100).await;
        worker.force_terminate(Duration::from_millis(100)).await;
        wait_for(|| !worker.is_active()).await;
    }
}
