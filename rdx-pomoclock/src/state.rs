//! The timer entity and its pure phase-cycle transitions.
//!
//! `TimerState` knows nothing about schedulers, terminals or disks. Every
//! mutation is a plain method that keeps the invariants intact; the
//! controller decides which side effects to run around it.

use crate::common::{Phase, CYCLE_LENGTH};
use serde::Serialize;

/// Everything the phase cycle knows about itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimerState {
    phase: Phase,
    remaining_seconds: u32,
    total_seconds: u32,
    cycle_position: u8,
    completed_count: u64,
    running: bool,
    /// Set on the first start after creation or reset; drives the control label.
    started: bool,
}

/// Result of a single decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Time is left in the current phase.
    Counting,
    /// The countdown reached zero on this tick.
    Expired,
    /// The timer was not running; nothing changed.
    Idle,
}

/// Describes a phase transition that has just been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseChange {
    pub finished: Phase,
    pub next: Phase,
    /// `true` when the finished phase was a work interval and the count grew.
    pub work_completed: bool,
}

/// Label of the start/pause control for the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlLabel {
    Start,
    Pause,
    Resume,
}

impl ControlLabel {
    pub const fn as_str(self) -> &'static str {
        match self {
            ControlLabel::Start => "Start",
            ControlLabel::Pause => "Pause",
            ControlLabel::Resume => "Resume",
        }
    }
}

impl TimerState {
    /// A paused work interval at the start of a cycle, carrying over a
    /// previously persisted completed count.
    pub fn new(completed_count: u64) -> Self {
        let total = Phase::Work.canonical_seconds();
        Self {
            phase: Phase::Work,
            remaining_seconds: total,
            total_seconds: total,
            cycle_position: 0,
            completed_count,
            running: false,
            started: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn total_seconds(&self) -> u32 {
        self.total_seconds
    }

    pub fn cycle_position(&self) -> u8 {
        self.cycle_position
    }

    pub fn completed_count(&self) -> u64 {
        self.completed_count
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn control_label(&self) -> ControlLabel {
        match (self.running, self.started) {
            (true, _) => ControlLabel::Pause,
            (false, true) => ControlLabel::Resume,
            (false, false) => ControlLabel::Start,
        }
    }

    /// Flips `running` and returns the new value.
    pub fn toggle(&mut self) -> bool {
        self.running = !self.running;
        if self.running {
            self.started = true;
        }
        self.running
    }

    /// Stops the countdown and restores the full duration of the current phase.
    ///
    /// A break's length is inferred from the cycle position: the position has
    /// already advanced when a break begins, so zero means the long break.
    pub fn reset(&mut self) {
        let total = self.reset_duration();
        self.running = false;
        self.started = false;
        self.remaining_seconds = total;
        self.total_seconds = total;
    }

    fn reset_duration(&self) -> u32 {
        match self.phase {
            Phase::Work => Phase::Work.canonical_seconds(),
            _ if self.cycle_position == 0 => Phase::LongBreak.canonical_seconds(),
            _ => Phase::ShortBreak.canonical_seconds(),
        }
    }

    /// Decrements the countdown by one second.
    ///
    /// On expiry the timer stops at exactly zero; the caller is expected to
    /// follow up with [`TimerState::advance_phase`].
    pub fn tick(&mut self) -> TickOutcome {
        if !self.running {
            return TickOutcome::Idle;
        }
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds > 0 {
            TickOutcome::Counting
        } else {
            self.running = false;
            TickOutcome::Expired
        }
    }

    /// Moves to the next phase and marks it running.
    pub fn advance_phase(&mut self) -> PhaseChange {
        let finished = self.phase;
        let next = match finished {
            Phase::Work => {
                self.completed_count += 1;
                self.cycle_position = (self.cycle_position + 1) % CYCLE_LENGTH;
                if self.cycle_position == 0 {
                    Phase::LongBreak
                } else {
                    Phase::ShortBreak
                }
            }
            Phase::ShortBreak | Phase::LongBreak => Phase::Work,
        };

        let total = next.canonical_seconds();
        self.phase = next;
        self.remaining_seconds = total;
        self.total_seconds = total;
        self.running = true;
        self.started = true;

        PhaseChange {
            finished,
            next,
            work_completed: finished == Phase::Work,
        }
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running() -> TimerState {
        let mut state = TimerState::default();
        state.toggle();
        state
    }

    /// Ticks until the current phase expires, then applies the transition.
    fn finish_phase(state: &mut TimerState) -> PhaseChange {
        while state.tick() != TickOutcome::Expired {}
        state.advance_phase()
    }

    #[test]
    fn starts_paused_at_the_top_of_a_work_interval() {
        let state = TimerState::default();
        assert_eq!(state.phase(), Phase::Work);
        assert_eq!(state.remaining_seconds(), 1500);
        assert_eq!(state.total_seconds(), 1500);
        assert_eq!(state.cycle_position(), 0);
        assert!(!state.is_running());
        assert_eq!(state.control_label(), ControlLabel::Start);
    }

    #[test]
    fn restores_persisted_count() {
        assert_eq!(TimerState::new(7).completed_count(), 7);
    }

    #[test]
    fn ticks_saturate_at_zero() {
        for n in [0u32, 1, 10, 1499, 1500, 2000] {
            let mut state = running();
            for _ in 0..n {
                if state.tick() == TickOutcome::Expired {
                    break;
                }
            }
            assert_eq!(state.remaining_seconds(), 1500u32.saturating_sub(n), "n = {n}");
        }
    }

    #[test]
    fn expiry_stops_at_exactly_zero() {
        let mut state = running();
        for _ in 0..1499 {
            assert_eq!(state.tick(), TickOutcome::Counting);
        }
        assert_eq!(state.tick(), TickOutcome::Expired);
        assert_eq!(state.remaining_seconds(), 0);
        assert!(!state.is_running());
        assert_eq!(state.tick(), TickOutcome::Idle);
        assert_eq!(state.remaining_seconds(), 0);
    }

    #[test]
    fn paused_timer_ignores_ticks() {
        let mut state = TimerState::default();
        assert_eq!(state.tick(), TickOutcome::Idle);
        assert_eq!(state.remaining_seconds(), 1500);
    }

    #[test]
    fn first_work_interval_leads_to_short_break() {
        let mut state = running();
        let change = finish_phase(&mut state);
        assert_eq!(
            change,
            PhaseChange {
                finished: Phase::Work,
                next: Phase::ShortBreak,
                work_completed: true,
            }
        );
        assert_eq!(state.phase(), Phase::ShortBreak);
        assert_eq!(state.remaining_seconds(), 300);
        assert_eq!(state.total_seconds(), 300);
        assert_eq!(state.cycle_position(), 1);
        assert_eq!(state.completed_count(), 1);
        assert!(state.is_running());
    }

    #[test]
    fn fourth_work_interval_leads_to_long_break() {
        let mut state = running();
        for round in 1..=3u8 {
            assert_eq!(finish_phase(&mut state).next, Phase::ShortBreak);
            assert_eq!(state.cycle_position(), round);
            assert_eq!(finish_phase(&mut state).next, Phase::Work);
            assert_eq!(state.cycle_position(), round);
        }
        let change = finish_phase(&mut state);
        assert_eq!(change.next, Phase::LongBreak);
        assert_eq!(state.cycle_position(), 0);
        assert_eq!(state.remaining_seconds(), 900);
        assert_eq!(state.completed_count(), 4);

        let change = finish_phase(&mut state);
        assert_eq!(change.next, Phase::Work);
        assert!(!change.work_completed);
        assert_eq!(state.completed_count(), 4);
        assert_eq!(state.remaining_seconds(), 1500);
    }

    #[test]
    fn toggle_twice_is_a_no_op() {
        let mut state = running();
        for _ in 0..42 {
            state.tick();
        }
        let before = state;
        state.toggle();
        state.toggle();
        assert_eq!(state, before);
    }

    #[test]
    fn control_label_follows_start_pause_reset() {
        let mut state = TimerState::default();
        state.toggle();
        assert_eq!(state.control_label(), ControlLabel::Pause);
        state.toggle();
        assert_eq!(state.control_label(), ControlLabel::Resume);
        state.reset();
        assert_eq!(state.control_label(), ControlLabel::Start);
    }

    #[test]
    fn reset_work_restores_full_interval() {
        let mut state = running();
        for _ in 0..100 {
            state.tick();
        }
        state.reset();
        assert_eq!(state.remaining_seconds(), 1500);
        assert_eq!(state.total_seconds(), 1500);
        assert_eq!(state.phase(), Phase::Work);
        assert!(!state.is_running());
    }

    #[test]
    fn reset_short_break_uses_cycle_position() {
        let mut state = running();
        finish_phase(&mut state);
        finish_phase(&mut state);
        finish_phase(&mut state);
        assert_eq!(state.phase(), Phase::ShortBreak);
        assert_eq!(state.cycle_position(), 2);
        for _ in 0..10 {
            state.tick();
        }
        state.reset();
        assert_eq!(state.remaining_seconds(), 300);
        assert_eq!(state.total_seconds(), 300);
        assert_eq!(state.cycle_position(), 2);
    }

    #[test]
    fn reset_long_break_uses_cycle_position() {
        let mut state = running();
        while state.phase() != Phase::LongBreak {
            finish_phase(&mut state);
        }
        assert_eq!(state.cycle_position(), 0);
        for _ in 0..10 {
            state.tick();
        }
        state.reset();
        assert_eq!(state.phase(), Phase::LongBreak);
        assert_eq!(state.remaining_seconds(), 900);
        assert_eq!(state.total_seconds(), 900);
    }

    #[test]
    fn count_ignores_reset_and_pauses() {
        let mut state = running();
        for i in 0..1500 {
            if i % 100 == 0 {
                state.toggle();
                state.toggle();
            }
            if i == 700 {
                state.reset();
                assert_eq!(state.completed_count(), 0);
                state.toggle();
            }
            if state.tick() == TickOutcome::Expired {
                break;
            }
        }
        while state.tick() != TickOutcome::Expired {}
        state.advance_phase();
        assert_eq!(state.completed_count(), 1);
    }
}
