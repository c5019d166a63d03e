//! Renders the countdown as a clock plus a progress ring.

use crate::common::{format_clock, progress_fraction, Phase};
use crate::state::TimerState;
use colored::Colorize;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::warn;

/// Receives the timer whenever the visible countdown changes.
pub trait Display: Send {
    fn render(&mut self, state: &TimerState);
}

/// Circle geometry for turning progress into a stroke-dash offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingGeometry {
    pub radius: f64,
}

impl RingGeometry {
    pub fn new(radius: f64) -> Self {
        Self { radius }
    }

    pub fn circumference(&self) -> f64 {
        2.0 * std::f64::consts::PI * self.radius
    }

    /// Stroke offset for a ring that empties as the phase progresses.
    pub fn stroke_offset(&self, remaining: u32, total: u32) -> f64 {
        self.circumference() * progress_fraction(remaining, total)
    }
}

/// How each rendered frame is terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineMode {
    /// Redraw the same line with a carriage return.
    Inline,
    /// Print every frame on its own line.
    Newline,
}

/// Draws `[Phase] MM:SS [####----] #count` to any writer.
///
/// The ring is approximated by a bar whose filled part is proportional to the
/// ring's stroke offset.
pub struct TerminalDisplay<W: Write + Send> {
    out: W,
    ring: RingGeometry,
    bar_width: usize,
    mode: LineMode,
    gate: Option<Arc<AtomicBool>>,
}

impl TerminalDisplay<std::io::Stdout> {
    pub fn stdout(ring: RingGeometry, bar_width: usize, mode: LineMode) -> Self {
        Self::new(std::io::stdout(), ring, bar_width, mode)
    }
}

impl<W: Write + Send> TerminalDisplay<W> {
    pub fn new(out: W, ring: RingGeometry, bar_width: usize, mode: LineMode) -> Self {
        Self {
            out,
            ring,
            bar_width,
            mode,
            gate: None,
        }
    }

    /// Only render while `gate` is set.
    pub fn with_gate(mut self, gate: Arc<AtomicBool>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Renders a frame without colour codes.
    pub fn frame(&self, state: &TimerState) -> String {
        format!(
            "[{}] {} [{}] {} #{}",
            state.phase().label(),
            format_clock(state.remaining_seconds()),
            self.bar(state),
            state.control_label().as_str(),
            state.completed_count()
        )
    }

    fn filled_cells(&self, state: &TimerState) -> usize {
        let circumference = self.ring.circumference();
        if circumference <= 0.0 {
            return 0;
        }
        let offset = self
            .ring
            .stroke_offset(state.remaining_seconds(), state.total_seconds());
        let cells = (offset / circumference * self.bar_width as f64).round() as usize;
        cells.min(self.bar_width)
    }

    fn bar(&self, state: &TimerState) -> String {
        let filled = self.filled_cells(state);
        format!("{}{}", "#".repeat(filled), "-".repeat(self.bar_width - filled))
    }

    fn colored_frame(&self, state: &TimerState) -> String {
        let label = match state.phase() {
            Phase::Work => state.phase().label().red().bold(),
            Phase::ShortBreak => state.phase().label().green().bold(),
            Phase::LongBreak => state.phase().label().blue().bold(),
        };
        format!(
            "[{}] {} [{}] {} #{}",
            label,
            format_clock(state.remaining_seconds()).bold(),
            self.bar(state),
            state.control_label().as_str().dimmed(),
            state.completed_count()
        )
    }
}

impl<W: Write + Send> Display for TerminalDisplay<W> {
    fn render(&mut self, state: &TimerState) {
        if let Some(gate) = &self.gate {
            if !gate.load(Ordering::Relaxed) {
                return;
            }
        }
        let frame = self.colored_frame(state);
        let written = match self.mode {
            LineMode::Inline => write!(self.out, "\r{}", frame),
            LineMode::Newline => writeln!(self.out, "{}", frame),
        };
        if let Err(e) = written.and_then(|_| self.out.flush()) {
            warn!("Display write failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn display() -> TerminalDisplay<Vec<u8>> {
        TerminalDisplay::new(Vec::new(), RingGeometry::new(90.0), 10, LineMode::Newline)
    }

    #[test]
    fn ring_offset_grows_with_progress() {
        let ring = RingGeometry::new(10.0);
        assert_eq!(ring.stroke_offset(300, 300), 0.0);
        let half = ring.stroke_offset(150, 300);
        assert!((half - ring.circumference() / 2.0).abs() < 1e-9);
        assert!((ring.stroke_offset(0, 300) - ring.circumference()).abs() < 1e-9);
    }

    #[test]
    fn frame_shows_clock_bar_and_count() {
        let state = TimerState::new(3);
        assert_eq!(display().frame(&state), "[Work] 25:00 [----------] Start #3");
    }

    #[test]
    fn bar_fills_as_time_passes() {
        let mut state = TimerState::default();
        state.toggle();
        for _ in 0..750 {
            state.tick();
        }
        assert_eq!(display().frame(&state), "[Work] 12:30 [#####-----] Pause #0");
    }

    #[test]
    fn gate_suppresses_rendering() {
        colored::control::set_override(false);
        let gate = Arc::new(AtomicBool::new(false));
        let mut display = display().with_gate(gate.clone());
        display.render(&TimerState::default());
        gate.store(true, Ordering::Relaxed);
        display.render(&TimerState::default());

        let out = String::from_utf8(display.into_inner()).unwrap();
        assert_eq!(out, "[Work] 25:00 [----------] Start #0\n");
    }
}
