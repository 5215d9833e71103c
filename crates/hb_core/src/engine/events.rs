//! Append-only event log.
//!
//! The orchestrator is the only writer. Observers (tests, a narration
//! layer) get a read-only view after the play; nothing simulation-
//! critical ever reads back out of the log.

use tracing::debug;

use crate::models::event::{PlayEvent, PlayEventKind};

#[derive(Clone, Debug, Default)]
pub struct EventLog {
    events: Vec<PlayEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tick: u32, kind: PlayEventKind) {
        debug!(tick, event = ?kind, "play event");
        self.events.push(PlayEvent { tick, kind });
    }

    pub fn as_slice(&self) -> &[PlayEvent] {
        &self.events
    }

    pub fn into_vec(self) -> Vec<PlayEvent> {
        self.events
    }

    pub fn contains(&self, pred: impl Fn(&PlayEventKind) -> bool) -> bool {
        self.events.iter().any(|e| pred(&e.kind))
    }
}
