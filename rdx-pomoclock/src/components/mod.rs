//! Contains the collaborators the phase cycle controller calls out to.
//!
//! Each collaborator is a small trait with a terminal or file-backed
//! implementation. The controller only ever sees the traits, so the state
//! machine can be driven in tests without a display, speaker or disk.

pub mod alert;
pub mod display;
pub mod indicator;
pub mod store;

pub use alert::{Alert, SilentAlert, ToneAlert};
pub use display::{Display, LineMode, RingGeometry, TerminalDisplay};
pub use indicator::{DotIndicator, Indicator};
pub use store::{CounterStore, JsonFileStore, MemoryStore};

/// The full set of side effects a controller needs.
pub struct Collaborators {
    pub display: Box<dyn Display>,
    pub alert: Box<dyn Alert>,
    pub store: Box<dyn CounterStore>,
    pub indicator: Box<dyn Indicator>,
}

impl Collaborators {
    pub fn new(
        display: impl Display + 'static,
        alert: impl Alert + 'static,
        store: impl CounterStore + 'static,
        indicator: impl Indicator + 'static,
    ) -> Self {
        Self {
            display: Box::new(display),
            alert: Box::new(alert),
            store: Box::new(store),
            indicator: Box::new(indicator),
        }
    }
}
