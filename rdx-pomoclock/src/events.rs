//! Defines all public event types broadcast by the Pomoclock engine.
//!
//! Listeners subscribe to these strongly-typed streams to mirror the timer in
//! a UI, a log, or a test, without touching the controller itself.

use crate::common::Phase;
use crate::state::TimerState;
use chrono::{DateTime, Local};

/// Events describing what the phase cycle just did.
#[derive(Debug, Clone, PartialEq)]
pub enum TimerEvent {
    /// The countdown started or resumed.
    Started { state: TimerState },
    /// The countdown was paused by the user.
    Paused { state: TimerState },
    /// The current phase was rewound to its full length.
    Reset { state: TimerState },
    /// One second went by.
    Ticked { remaining_seconds: u32, total_seconds: u32 },
    /// A phase ran out.
    PhaseCompleted {
        phase: Phase,
        completed_count: u64,
        at: DateTime<Local>,
    },
    /// A new phase began counting down on its own.
    PhaseStarted { state: TimerState },
}

/// Events related to the lifecycle of the engine itself.
#[derive(Debug, Clone)]
pub enum SystemEvent {
    /// Fired once when the dispatcher loop begins.
    EngineStarted { at: DateTime<Local> },
    /// Fired once when the dispatcher loop is about to exit.
    EngineShutdown,
}
