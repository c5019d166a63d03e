//! Contains common, primitive types shared across the Pomoclock engine.
//!
//! This module defines the `Phase` enumeration, the canonical interval lengths
//! and the small formatting helpers every renderer needs. Durations are
//! expressed in ticks; at the default resolution one tick is one second.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of a work interval, in ticks.
pub const WORK_SECONDS: u32 = 25 * 60;
/// Length of a short break, in ticks.
pub const SHORT_BREAK_SECONDS: u32 = 5 * 60;
/// Length of a long break, in ticks.
pub const LONG_BREAK_SECONDS: u32 = 15 * 60;
/// Number of work intervals between long breaks.
pub const CYCLE_LENGTH: u8 = 4;

/// The kind of interval currently being counted down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Work,
    ShortBreak,
    LongBreak,
}

impl Phase {
    /// The fixed duration assigned when this phase begins.
    pub const fn canonical_seconds(self) -> u32 {
        match self {
            Phase::Work => WORK_SECONDS,
            Phase::ShortBreak => SHORT_BREAK_SECONDS,
            Phase::LongBreak => LONG_BREAK_SECONDS,
        }
    }

    pub const fn is_break(self) -> bool {
        !matches!(self, Phase::Work)
    }

    /// A human-readable label for displays and logs.
    pub const fn label(self) -> &'static str {
        match self {
            Phase::Work => "Work",
            Phase::ShortBreak => "Short Break",
            Phase::LongBreak => "Long Break",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Formats a number of seconds as zero-padded `MM:SS`.
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Fraction of the phase already elapsed, `1 - remaining / total`.
pub fn progress_fraction(remaining: u32, total: u32) -> f64 {
    if total == 0 {
        return 1.0;
    }
    1.0 - f64::from(remaining) / f64::from(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_durations() {
        assert_eq!(Phase::Work.canonical_seconds(), 1500);
        assert_eq!(Phase::ShortBreak.canonical_seconds(), 300);
        assert_eq!(Phase::LongBreak.canonical_seconds(), 900);
    }

    #[test]
    fn clock_is_zero_padded() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(65), "01:05");
        assert_eq!(format_clock(WORK_SECONDS), "25:00");
    }

    #[test]
    fn progress_runs_from_zero_to_one() {
        assert_eq!(progress_fraction(300, 300), 0.0);
        assert_eq!(progress_fraction(150, 300), 0.5);
        assert_eq!(progress_fraction(0, 300), 1.0);
    }

    #[test]
    fn phase_labels() {
        assert_eq!(Phase::ShortBreak.to_string(), "Short Break");
        assert!(Phase::LongBreak.is_break());
        assert!(!Phase::Work.is_break());
    }
}
