//! The phase cycle controller.
//!
//! The controller owns the single `TimerState`, the tick `Scheduler` and the
//! collaborators. Its four operations are the only way the timer changes, and
//! each one returns the `TimerEvent`s it produced so the engine can broadcast
//! them.

use crate::common::CYCLE_LENGTH;
use crate::components::Collaborators;
use crate::events::TimerEvent;
use crate::state::{TickOutcome, TimerState};
use crate::time::{Scheduler, Tick};
use chrono::Local;
use tracing::{debug, info, trace};

pub struct PhaseCycleController<S: Scheduler> {
    state: TimerState,
    scheduler: S,
    collaborators: Collaborators,
}

impl<S: Scheduler> PhaseCycleController<S> {
    /// Restores the completed count from the store and draws the initial frame.
    pub fn new(scheduler: S, mut collaborators: Collaborators) -> Self {
        let completed = collaborators.store.load().unwrap_or(0);
        let state = TimerState::new(completed);
        info!("Restored {} completed work intervals.", completed);

        collaborators.display.render(&state);
        collaborators
            .indicator
            .render_indicator(state.cycle_position(), CYCLE_LENGTH);

        Self {
            state,
            scheduler,
            collaborators,
        }
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Starts or pauses the countdown.
    pub fn toggle(&mut self) -> Vec<TimerEvent> {
        if self.state.toggle() {
            let generation = self.scheduler.start();
            debug!("Countdown started on tick loop #{}.", generation);
            self.collaborators.display.render(&self.state);
            vec![TimerEvent::Started { state: self.state }]
        } else {
            self.scheduler.cancel();
            debug!("Countdown paused at {}s.", self.state.remaining_seconds());
            self.collaborators.display.render(&self.state);
            vec![TimerEvent::Paused { state: self.state }]
        }
    }

    /// Stops the countdown and rewinds the current phase.
    pub fn reset(&mut self) -> Vec<TimerEvent> {
        self.scheduler.cancel();
        self.state.reset();
        info!(
            "{} reset to {}s.",
            self.state.phase(),
            self.state.total_seconds()
        );
        self.collaborators.display.render(&self.state);
        vec![TimerEvent::Reset { state: self.state }]
    }

    /// Accepts a tick from the scheduler, dropping ticks from cancelled loops.
    pub fn on_tick(&mut self, tick: Tick) -> Vec<TimerEvent> {
        if self.scheduler.current() != Some(tick.generation) {
            trace!("Dropping stale tick from loop #{}.", tick.generation);
            return Vec::new();
        }
        self.tick()
    }

    /// Counts down one second, completing the phase when it reaches zero.
    pub fn tick(&mut self) -> Vec<TimerEvent> {
        let outcome = self.state.tick();
        if outcome == TickOutcome::Idle {
            return Vec::new();
        }

        self.collaborators.display.render(&self.state);
        let mut events = vec![TimerEvent::Ticked {
            remaining_seconds: self.state.remaining_seconds(),
            total_seconds: self.state.total_seconds(),
        }];

        if outcome == TickOutcome::Expired {
            self.scheduler.cancel();
            self.collaborators.alert.alert();
            events.extend(self.on_phase_complete());
        }
        events
    }

    /// Moves to the next phase and starts it immediately.
    pub fn on_phase_complete(&mut self) -> Vec<TimerEvent> {
        let change = self.state.advance_phase();
        if change.work_completed {
            self.collaborators
                .store
                .persist(self.state.completed_count());
        }
        info!(
            "{} complete, {} starts ({} done, position {}/{}).",
            change.finished,
            change.next,
            self.state.completed_count(),
            self.state.cycle_position(),
            CYCLE_LENGTH
        );

        self.scheduler.start();
        self.collaborators.display.render(&self.state);
        self.collaborators
            .indicator
            .render_indicator(self.state.cycle_position(), CYCLE_LENGTH);

        vec![
            TimerEvent::PhaseCompleted {
                phase: change.finished,
                completed_count: self.state.completed_count(),
                at: Local::now(),
            },
            TimerEvent::PhaseStarted { state: self.state },
        ]
    }

    /// Cancels any running tick loop.
    pub fn halt(&mut self) {
        self.scheduler.cancel();
    }
}
