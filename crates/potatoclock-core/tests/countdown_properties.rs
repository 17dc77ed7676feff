//! Property tests for the countdown and progress under arbitrary command
//! sequences and clock movement.

use chrono::{DateTime, Duration, Utc};
use potatoclock_core::{Command, Event, ModeDurations, SessionState, TimerAction, TimerMode};
use proptest::prelude::*;

fn t0() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

#[derive(Debug, Clone)]
enum Step {
    /// Move the clock; negative steps model wall-clock adjustments.
    Advance(i64),
    Add,
    Toggle(usize),
    Control(TimerAction),
    Set(TimerMode, u32),
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        6 => (-30i64..400).prop_map(Step::Advance),
        1 => Just(Step::Add),
        1 => (0usize..16).prop_map(Step::Toggle),
        1 => Just(Step::Control(TimerAction::Pause)),
        1 => Just(Step::Control(TimerAction::Start)),
        1 => Just(Step::Control(TimerAction::Skip)),
        1 => Just(Step::Control(TimerAction::Reset)),
        1 => (prop_oneof![Just(TimerMode::Work), Just(TimerMode::Rest)], 1u32..=5)
            .prop_map(|(mode, minutes)| Step::Set(mode, minutes)),
    ]
}

/// Events that legitimately refill the countdown.
fn restarts(event: &Event) -> bool {
    matches!(
        event,
        Event::TimerExpired { .. }
            | Event::TimerSkipped { .. }
            | Event::TimerReset { .. }
            | Event::TimerSet { .. }
    )
}

proptest! {
    #[test]
    fn countdown_only_rises_across_expiry(steps in proptest::collection::vec(step(), 1..80)) {
        let mut session = SessionState::new(ModeDurations::from_minutes(3, 1), t0());
        session
            .apply(Command::TimerControl { action: TimerAction::Start }, t0())
            .unwrap();

        let mut now = t0();
        let first = session.snapshot(now);
        let mut prev = first.timer;
        let mut prev_seq = first.last_event_seq;
        for step in steps {
            match step {
                Step::Advance(secs) => now += Duration::seconds(secs),
                Step::Add => {
                    session
                        .apply(Command::AddTask { text: "x".into() }, now)
                        .unwrap();
                }
                Step::Toggle(i) => {
                    let id = session.tasks().list().get(i).map(|t| t.id.clone());
                    if let Some(id) = id {
                        session.apply(Command::ToggleDone { id }, now).unwrap();
                    }
                }
                Step::Control(action) => {
                    session.apply(Command::TimerControl { action }, now).unwrap();
                }
                Step::Set(mode, duration_min) => {
                    session
                        .apply(
                            Command::TimerSet { mode, duration_min, bound_task_id: None },
                            now,
                        )
                        .unwrap();
                }
            }
            let snap = session.snapshot(now);
            let timer = snap.timer.clone();
            let refilled = session.events_since(prev_seq).iter().any(|e| restarts(&e.event));
            if !refilled {
                prop_assert_eq!(timer.mode, prev.mode);
                prop_assert!(
                    timer.remaining_sec <= prev.remaining_sec,
                    "countdown rose from {} to {} without an expiry",
                    prev.remaining_sec,
                    timer.remaining_sec
                );
                if !prev.running {
                    prop_assert_eq!(timer.remaining_sec, prev.remaining_sec);
                }
            }
            prop_assert!(timer.remaining_sec <= timer.duration_sec);

            let progress = snap.progress;
            prop_assert_eq!(progress.total, snap.tasks.len());
            prop_assert_eq!(progress.done, snap.tasks.iter().filter(|t| t.done).count());
            prev = timer;
            prev_seq = snap.last_event_seq;
        }
    }

    #[test]
    fn repeated_reads_at_same_instant_are_stable(offset in 0i64..2000) {
        let mut session = SessionState::new(ModeDurations::default(), t0());
        session
            .apply(Command::TimerControl { action: TimerAction::Start }, t0())
            .unwrap();
        let at = t0() + Duration::seconds(offset);
        let first = session.snapshot(at);
        let second = session.snapshot(at);
        prop_assert_eq!(first, second);
    }
}
