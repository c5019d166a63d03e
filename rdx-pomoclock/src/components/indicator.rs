//! Cycle-position lights: one dot per work interval in the cycle.

use colored::Colorize;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::warn;

pub trait Indicator: Send {
    fn render_indicator(&mut self, position: u8, cycle_length: u8);
}

/// Which dots are lit for a given position.
pub fn lit_dots(position: u8, cycle_length: u8) -> Vec<bool> {
    (0..cycle_length).map(|index| index < position).collect()
}

/// Prints the cycle as a row of filled and hollow dots.
pub struct DotIndicator<W: Write + Send> {
    out: W,
    gate: Option<Arc<AtomicBool>>,
}

impl DotIndicator<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> DotIndicator<W> {
    pub fn new(out: W) -> Self {
        Self { out, gate: None }
    }

    pub fn with_gate(mut self, gate: Arc<AtomicBool>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> Indicator for DotIndicator<W> {
    fn render_indicator(&mut self, position: u8, cycle_length: u8) {
        if let Some(gate) = &self.gate {
            if !gate.load(Ordering::Relaxed) {
                return;
            }
        }
        let dots: Vec<String> = lit_dots(position, cycle_length)
            .into_iter()
            .map(|active| {
                if active {
                    "●".yellow().to_string()
                } else {
                    "○".dimmed().to_string()
                }
            })
            .collect();
        if let Err(e) = writeln!(self.out, "\n{}", dots.join(" ")).and_then(|_| self.out.flush()) {
            warn!("Indicator write failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lights_completed_positions() {
        assert_eq!(lit_dots(0, 4), vec![false, false, false, false]);
        assert_eq!(lit_dots(3, 4), vec![true, true, true, false]);
    }

    #[test]
    fn prints_a_row_of_dots() {
        colored::control::set_override(false);
        let mut indicator = DotIndicator::new(Vec::new());
        indicator.render_indicator(2, 4);
        let out = String::from_utf8(indicator.into_inner()).unwrap();
        assert_eq!(out, "\n● ● ○ ○\n");
    }
}
