//! The repeating tick source that drives the phase cycle.
//!
//! A `Scheduler` owns at most one running tick loop. Every loop is tagged with
//! a generation number and stamps it on each `Tick`, so a tick that was already
//! queued when its loop got cancelled can be recognised and dropped.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, trace};

/// One beat of a tick loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub generation: u64,
}

/// A source of cancellable, repeating ticks.
pub trait Scheduler: Send {
    /// Starts a new tick loop, cancelling any loop that is already running.
    /// Returns the generation stamped on the new loop's ticks.
    fn start(&mut self) -> u64;

    /// Cancels the running loop, if any.
    fn cancel(&mut self);

    /// Generation of the running loop.
    fn current(&self) -> Option<u64>;

    fn is_active(&self) -> bool {
        self.current().is_some()
    }
}

/// Handle to a spawned tick loop. Dropping it cancels the loop.
#[derive(Debug)]
pub struct TickHandle {
    generation: u64,
    task: JoinHandle<()>,
}

impl TickHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for TickHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// A `Scheduler` backed by a `tokio::time::Interval` running in its own task.
///
/// Ticks are delivered into an `mpsc` channel so they are serialised with the
/// user commands in the engine's dispatcher.
pub struct IntervalScheduler {
    period: Duration,
    tick_sender: mpsc::Sender<Tick>,
    handle: Option<TickHandle>,
    last_generation: u64,
}

impl IntervalScheduler {
    pub fn new(period: Duration, tick_sender: mpsc::Sender<Tick>) -> Self {
        Self {
            period,
            tick_sender,
            handle: None,
            last_generation: 0,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

impl Scheduler for IntervalScheduler {
    fn start(&mut self) -> u64 {
        self.cancel();
        self.last_generation += 1;
        let generation = self.last_generation;
        let period = self.period;
        let sender = self.tick_sender.clone();

        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                trace!("Tick loop #{} fired.", generation);
                if sender.send(Tick { generation }).await.is_err() {
                    break;
                }
            }
        });

        debug!("Tick loop #{} started with period {:?}.", generation, period);
        self.handle = Some(TickHandle { generation, task });
        generation
    }

    fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            debug!("Tick loop #{} cancelled.", handle.generation());
            handle.cancel();
        }
    }

    fn current(&self) -> Option<u64> {
        self.handle.as_ref().map(TickHandle::generation)
    }
}

impl Drop for IntervalScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn delivers_ticks_at_the_configured_period() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut scheduler = IntervalScheduler::new(Duration::from_secs(1), tx);
        let generation = scheduler.start();

        let started = Instant::now();
        assert_eq!(rx.recv().await, Some(Tick { generation }));
        assert_eq!(started.elapsed(), Duration::from_secs(1));
        assert_eq!(rx.recv().await, Some(Tick { generation }));
        assert_eq!(started.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn restarting_replaces_the_previous_loop() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut scheduler = IntervalScheduler::new(Duration::from_secs(1), tx);
        let first = scheduler.start();
        let second = scheduler.start();
        assert_ne!(first, second);
        assert_eq!(scheduler.current(), Some(second));

        for _ in 0..5 {
            assert_eq!(rx.recv().await, Some(Tick { generation: second }));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_delivery() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut scheduler = IntervalScheduler::new(Duration::from_secs(1), tx);
        scheduler.start();
        assert!(rx.recv().await.is_some());
        scheduler.cancel();
        assert!(!scheduler.is_active());

        let quiet = tokio::time::timeout(Duration::from_secs(10), rx.recv()).await;
        assert!(quiet.is_err());
    }
}
