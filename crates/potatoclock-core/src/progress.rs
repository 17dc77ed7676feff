use serde::{Deserialize, Serialize};

use crate::task::Task;

/// Completion counters derived from the task list. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Progress {
    pub total: usize,
    pub done: usize,
    pub pct: u8,
}

impl Progress {
    pub fn of(tasks: &[Task]) -> Self {
        let total = tasks.len();
        let done = tasks.iter().filter(|t| t.done).count();
        Self {
            total,
            done,
            pct: percent(done, total),
        }
    }
}

/// `round(100 * done / total)`, half away from zero; 0 for an empty list.
pub fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = (done as f64 * 100.0 / total as f64).round();
    pct.clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use proptest::prelude::*;

    fn tasks(flags: &[bool]) -> Vec<Task> {
        flags
            .iter()
            .enumerate()
            .map(|(i, done)| Task {
                id: i.to_string(),
                text: format!("task {i}"),
                done: *done,
                created_at: DateTime::from_timestamp(0, 0).unwrap(),
            })
            .collect()
    }

    #[test]
    fn empty_list_is_zero_percent() {
        assert_eq!(Progress::of(&[]), Progress { total: 0, done: 0, pct: 0 });
    }

    #[test]
    fn rounding() {
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 8), 13);
        assert_eq!(percent(1, 1), 100);
    }

    proptest! {
        #[test]
        fn counters_match_task_list(flags in proptest::collection::vec(any::<bool>(), 0..64)) {
            let list = tasks(&flags);
            let progress = Progress::of(&list);
            let done = flags.iter().filter(|d| **d).count();
            prop_assert_eq!(progress.total, flags.len());
            prop_assert_eq!(progress.done, done);
            prop_assert!(progress.pct <= 100);
            if flags.is_empty() {
                prop_assert_eq!(progress.pct, 0);
            } else {
                let expected = (100.0 * done as f64 / flags.len() as f64).round() as u8;
                prop_assert_eq!(progress.pct, expected);
            }
        }
    }
}
