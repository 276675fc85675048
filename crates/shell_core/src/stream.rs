use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle event emitted by a streaming command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum StreamEvent {
    Started { url: String, total: u64 },
    Progress { received: u64 },
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Phase {
    #[default]
    Idle,
    Started,
    Progressing,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceViolation {
    StartedOutOfOrder,
    AfterFinished,
}

impl fmt::Display for SequenceViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceViolation::StartedOutOfOrder => write!(f, "started after other events"),
            SequenceViolation::AfterFinished => write!(f, "event after finished"),
        }
    }
}

/// Ordering guard for one streaming invocation.
///
/// Accepted events always match `Started? Progress* Finished?`: `Started` only
/// as the very first event and nothing after `Finished`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StreamSequence {
    phase: Phase,
    delivered: usize,
}

impl StreamSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accept(&mut self, event: &StreamEvent) -> Result<(), SequenceViolation> {
        let next = match (self.phase, event) {
            (Phase::Finished, _) => return Err(SequenceViolation::AfterFinished),
            (Phase::Idle, StreamEvent::Started { .. }) => Phase::Started,
            (_, StreamEvent::Started { .. }) => return Err(SequenceViolation::StartedOutOfOrder),
            (_, StreamEvent::Progress { .. }) => Phase::Progressing,
            (_, StreamEvent::Finished) => Phase::Finished,
        };
        self.phase = next;
        self.delivered += 1;
        Ok(())
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn delivered(&self) -> usize {
        self.delivered
    }
}
