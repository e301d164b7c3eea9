use std::sync::atomic::{AtomicU8, Ordering};

use strum::Display;

/// Observed state of the index store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum IndexAvailability {
    Unavailable,
    Available,
}

impl IndexAvailability {
    pub fn is_available(self) -> bool {
        matches!(self, IndexAvailability::Available)
    }
}

const UNKNOWN: u8 = 0;
const UNAVAILABLE: u8 = 1;
const AVAILABLE: u8 = 2;

/// Remembers the last probed availability and logs every transition
#[derive(Debug)]
pub struct AvailabilityTracker {
    name: &'static str,
    state: AtomicU8,
}

impl AvailabilityTracker {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: AtomicU8::new(UNKNOWN),
        }
    }

    /// Last observed state; `None` before the first probe
    pub fn current(&self) -> Option<IndexAvailability> {
        decode(self.state.load(Ordering::Acquire))
    }

    /// Record a probe result, returning it for chaining
    pub fn observe(&self, now: IndexAvailability) -> IndexAvailability {
        let previous = decode(self.state.swap(encode(now), Ordering::AcqRel));

        match (previous, now) {
            (Some(IndexAvailability::Available), IndexAvailability::Unavailable) => {
                tracing::warn!(store = self.name, "Index store became unavailable");
            }
            (Some(IndexAvailability::Unavailable), IndexAvailability::Available) => {
                tracing::info!(store = self.name, "Index store recovered");
            }
            (None, state) => {
                tracing::info!(store = self.name, %state, "Index store availability established");
            }
            _ => {}
        }

        now
    }
}

fn encode(state: IndexAvailability) -> u8 {
    match state {
        IndexAvailability::Unavailable => UNAVAILABLE,
        IndexAvailability::Available => AVAILABLE,
    }
}

fn decode(raw: u8) -> Option<IndexAvailability> {
    match raw {
        UNAVAILABLE => Some(IndexAvailability::Unavailable),
        AVAILABLE => Some(IndexAvailability::Available),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_until_first_probe() {
        let tracker = AvailabilityTracker::new("test");
        assert_eq!(tracker.current(), None);
    }

    #[test]
    fn test_tracks_transitions() {
        let tracker = AvailabilityTracker::new("test");

        tracker.observe(IndexAvailability::Available);
        assert_eq!(tracker.current(), Some(IndexAvailability::Available));

        let state = tracker.observe(IndexAvailability::Unavailable);
        assert!(!state.is_available());
        assert_eq!(tracker.current(), Some(IndexAvailability::Unavailable));
    }
}
