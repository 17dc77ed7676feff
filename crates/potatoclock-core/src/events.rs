use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::TimerMode;

/// Number of events a session keeps for displays that poll with a cursor.
pub const EVENT_LOG_CAPACITY: usize = 128;

/// Every state change in the session produces an Event.
///
/// Displays poll for them; the one-shot visual cues (watering animation,
/// expiry alarm, planting) are driven from here rather than from state diffs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TaskAdded {
        task_id: String,
        at: DateTime<Utc>,
    },
    TaskToggled {
        task_id: String,
        done: bool,
        at: DateTime<Utc>,
    },
    /// The declared focus moved, either by `set_focus` or by self-healing.
    FocusChanged {
        task_id: Option<String>,
        healed: bool,
        at: DateTime<Utc>,
    },
    TimerSet {
        mode: TimerMode,
        duration_secs: u32,
        bound_task_id: Option<String>,
        at: DateTime<Utc>,
    },
    TimerStarted {
        mode: TimerMode,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerPaused {
        mode: TimerMode,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: TimerMode,
        duration_secs: u32,
        at: DateTime<Utc>,
    },
    TimerSkipped {
        from: TimerMode,
        to: TimerMode,
        at: DateTime<Utc>,
    },
    /// Countdown hit zero while running. `at` is the exact expiry instant,
    /// which can be earlier than the read that observed it.
    TimerExpired {
        from: TimerMode,
        to: TimerMode,
        duration_secs: u32,
        at: DateTime<Utc>,
    },
    GardenWatered {
        added: u32,
        water_count: u32,
        stage: u8,
        at: DateTime<Utc>,
    },
    FlowerPlanted {
        flower_id: String,
        task_id: Option<String>,
        at: DateTime<Utc>,
    },
}

/// An event tagged with its position in the session's log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequencedEvent {
    pub seq: u64,
    pub event: Event,
}

/// Bounded, append-only event log with monotonically increasing sequence numbers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    next_seq: u64,
    entries: VecDeque<SequencedEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: Event) -> u64 {
        self.next_seq += 1;
        let seq = self.next_seq;
        self.entries.push_back(SequencedEvent { seq, event });
        while self.entries.len() > EVENT_LOG_CAPACITY {
            self.entries.pop_front();
        }
        seq
    }

    pub fn extend(&mut self, events: impl IntoIterator<Item = Event>) {
        for event in events {
            self.push(event);
        }
    }

    /// Sequence number of the newest event (0 when nothing was ever logged).
    pub fn last_seq(&self) -> u64 {
        self.next_seq
    }

    /// Events strictly newer than `cursor`, oldest first.
    pub fn since(&self, cursor: u64) -> Vec<SequencedEvent> {
        self.entries
            .iter()
            .filter(|e| e.seq > cursor)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn added(id: &str) -> Event {
        Event::TaskAdded {
            task_id: id.to_string(),
            at: DateTime::from_timestamp(0, 0).unwrap(),
        }
    }

    #[test]
    fn since_returns_only_newer_events() {
        let mut log = EventLog::new();
        log.push(added("a"));
        log.push(added("b"));
        log.push(added("c"));

        let newer = log.since(1);
        assert_eq!(newer.len(), 2);
        assert_eq!(newer[0].seq, 2);
        assert_eq!(newer[1].seq, 3);
        assert!(log.since(3).is_empty());
    }

    #[test]
    fn log_is_bounded_but_sequence_keeps_counting() {
        let mut log = EventLog::new();
        for i in 0..(EVENT_LOG_CAPACITY + 10) {
            log.push(added(&i.to_string()));
        }
        assert_eq!(log.len(), EVENT_LOG_CAPACITY);
        assert_eq!(log.last_seq(), (EVENT_LOG_CAPACITY + 10) as u64);
        assert_eq!(log.since(0)[0].seq, 11);
    }

    #[test]
    fn event_serializes_with_type_tag() {
        let json = serde_json::to_value(added("a")).unwrap();
        assert_eq!(json["type"], "task_added");
        assert_eq!(json["task_id"], "a");
    }
}
