//! The core engine that runs the phase cycle on a tokio runtime.

use crate::components::Collaborators;
use crate::config::PomodoroConfig;
use crate::controller::PhaseCycleController;
use crate::events::{SystemEvent, TimerEvent};
use crate::state::TimerState;
use crate::time::{IntervalScheduler, Tick};
use anyhow::{anyhow, Context};
use chrono::Local;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{error, info, trace};

/// User-initiated requests, serialised with ticks in the dispatcher.
#[derive(Debug)]
pub enum Command {
    Toggle,
    Reset,
    Snapshot(oneshot::Sender<TimerState>),
}

/// The main Pomoclock engine.
///
/// The engine owns the `PhaseCycleController`. Once started, a single
/// dispatcher task receives commands and ticks one at a time, so the
/// controller is never touched from two places at once and needs no lock.
/// Talk to a running engine through its cloneable `EngineHandle`.
pub struct PomodoroEngine {
    config: Arc<PomodoroConfig>,
    controller: PhaseCycleController<IntervalScheduler>,
    command_rx: mpsc::Receiver<Command>,
    tick_rx: mpsc::Receiver<Tick>,
    shutdown_rx: broadcast::Receiver<()>,
    handle: EngineHandle,
}

/// A cheap, cloneable handle to a `PomodoroEngine`.
#[derive(Clone)]
pub struct EngineHandle {
    command_tx: mpsc::Sender<Command>,
    shutdown_tx: broadcast::Sender<()>,
    timer_event_sender: broadcast::Sender<TimerEvent>,
    system_event_sender: broadcast::Sender<SystemEvent>,
}

impl PomodoroEngine {
    /// Creates a new engine with the given configuration and collaborators.
    ///
    /// The completed count is restored from the store right away.
    pub fn new(config: PomodoroConfig, collaborators: Collaborators) -> Self {
        const CHANNEL_CAPACITY: usize = 256;
        let (command_tx, command_rx) = mpsc::channel(64);
        let (tick_tx, tick_rx) = mpsc::channel(64);
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let (timer_event_sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        let (system_event_sender, _) = broadcast::channel(16);

        let scheduler = IntervalScheduler::new(config.resolution.tick_period(), tick_tx);
        let controller = PhaseCycleController::new(scheduler, collaborators);

        Self {
            config: Arc::new(config),
            controller,
            command_rx,
            tick_rx,
            shutdown_rx,
            handle: EngineHandle {
                command_tx,
                shutdown_tx,
                timer_event_sender,
                system_event_sender,
            },
        }
    }

    pub fn handle(&self) -> EngineHandle {
        self.handle.clone()
    }

    pub fn config(&self) -> &PomodoroConfig {
        &self.config
    }

    /// Spawns the dispatcher in the background and returns its join handle.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.dispatcher_loop())
    }

    /// Runs the engine until a Ctrl+C signal is received.
    pub async fn run(self) -> anyhow::Result<()> {
        info!("PomodoroEngine starting up...");
        let handle = self.handle();
        let period = self.config.resolution.tick_period();
        let dispatcher = self.spawn();

        info!("Engine running with a {:?} tick. Press Ctrl+C to shut down.", period);
        tokio::signal::ctrl_c()
            .await
            .context("failed to listen for Ctrl+C")?;

        info!("Shutdown signal received.");
        handle.shutdown();
        dispatcher.await.context("dispatcher task panicked")?;
        info!("PomodoroEngine has shut down.");
        Ok(())
    }

    #[doc(hidden)]
    async fn dispatcher_loop(mut self) {
        self.handle
            .system_event_sender
            .send(SystemEvent::EngineStarted { at: Local::now() })
            .ok();

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown_rx.recv() => break,
                Some(command) = self.command_rx.recv() => {
                    trace!("Command {:?} received.", command);
                    let events = match command {
                        Command::Toggle => self.controller.toggle(),
                        Command::Reset => self.controller.reset(),
                        Command::Snapshot(reply) => {
                            reply.send(*self.controller.state()).ok();
                            Vec::new()
                        }
                    };
                    self.publish(events);
                }
                Some(tick) = self.tick_rx.recv() => {
                    let events = self.controller.on_tick(tick);
                    self.publish(events);
                }
                else => break,
            }
        }

        self.controller.halt();
        self.handle
            .system_event_sender
            .send(SystemEvent::EngineShutdown)
            .ok();
    }

    fn publish(&self, events: Vec<TimerEvent>) {
        for event in events {
            // No subscribers is fine.
            self.handle.timer_event_sender.send(event).ok();
        }
    }
}

impl EngineHandle {
    async fn send(&self, command: Command) -> anyhow::Result<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| anyhow!("the engine is not running"))
    }

    /// Starts or pauses the countdown.
    pub async fn toggle(&self) -> anyhow::Result<()> {
        self.send(Command::Toggle).await
    }

    /// Stops the countdown and rewinds the current phase.
    pub async fn reset(&self) -> anyhow::Result<()> {
        self.send(Command::Reset).await
    }

    /// A copy of the timer as of the moment the dispatcher handles the request.
    pub async fn snapshot(&self) -> anyhow::Result<TimerState> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::Snapshot(reply_tx)).await?;
        reply_rx
            .await
            .map_err(|_| anyhow!("the engine stopped before answering"))
    }

    /// Asks the dispatcher to stop.
    pub fn shutdown(&self) {
        if self.shutdown_tx.send(()).is_err() {
            error!("Failed to send shutdown signal; the dispatcher is already gone.");
        }
    }

    /// Subscribes to the `TimerEvent` stream.
    pub fn subscribe_timer_events(&self) -> broadcast::Receiver<TimerEvent> {
        self.timer_event_sender.subscribe()
    }

    /// Subscribes to the `SystemEvent` stream.
    pub fn subscribe_system_events(&self) -> broadcast::Receiver<SystemEvent> {
        self.system_event_sender.subscribe()
    }
}
