use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::wire::StateResponse;
use crate::clock::Clock;
use crate::error::CommandError;
use crate::session::{Command, CommandOutcome, SessionState};
use crate::storage::SessionStore;
use crate::timer::ModeDurations;

/// Shared owner of the one session.
///
/// Commands and snapshot reads take the same lock, so a reader sees either
/// all of a command's effects or none of them. Cloning shares the session.
#[derive(Clone)]
pub struct SessionHandle {
    session: Arc<Mutex<SessionState>>,
    clock: Arc<dyn Clock>,
    store: Option<Arc<dyn SessionStore>>,
}

impl SessionHandle {
    pub fn new(session: SessionState, clock: Arc<dyn Clock>) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            clock,
            store: None,
        }
    }

    /// Fresh session with the given interval lengths.
    pub fn fresh(durations: ModeDurations, clock: Arc<dyn Clock>) -> Self {
        let now = clock.now();
        Self::new(SessionState::new(durations, now), clock)
    }

    /// Restore the saved session from `store`, or start fresh when there is
    /// none or it cannot be read. The store is kept for saving afterwards.
    pub fn restore(
        durations: ModeDurations,
        clock: Arc<dyn Clock>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        let handle = match store.load() {
            Ok(Some(session)) => {
                info!(revision = session.revision(), "restored saved session");
                Self::new(session, clock)
            }
            Ok(None) => Self::fresh(durations, clock),
            Err(e) => {
                warn!(error = %e, "saved session unreadable, starting fresh");
                Self::fresh(durations, clock)
            }
        };
        handle.with_store(store)
    }

    pub fn with_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply one command and persist the result.
    ///
    /// A failed save is logged and does not undo the command.
    pub fn execute(&self, command: Command) -> Result<CommandOutcome, CommandError> {
        self.execute_then(command, |_| ()).map(|(outcome, ())| outcome)
    }

    /// Like [`execute`](Self::execute), then `read` the session under the
    /// same lock.
    pub fn execute_then<R>(
        &self,
        command: Command,
        read: impl FnOnce(&SessionState) -> R,
    ) -> Result<(CommandOutcome, R), CommandError> {
        let now = self.clock.now();
        let mut session = self.lock();
        let outcome = session.apply(command, now)?;
        if let Some(store) = &self.store {
            if let Err(e) = store.save(&*session) {
                warn!(error = %e, revision = session.revision(), "failed to persist session");
            }
        }
        Ok((outcome, read(&*session)))
    }

    /// Snapshot plus the events newer than `since`.
    pub fn state_since(&self, since: u64) -> StateResponse {
        let now = self.clock.now();
        let mut session = self.lock();
        let state = session.snapshot(now);
        StateResponse {
            progress: state.progress,
            now: state.now,
            events: session.events_since(since),
            state,
        }
    }

    pub fn suggest_rest_idea(&self) -> Result<String, CommandError> {
        let now = self.clock.now();
        self.lock().suggest_rest_idea(now, &mut rand::thread_rng())
    }

    /// Copy of the whole session.
    pub fn export(&self) -> SessionState {
        self.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::DatabaseError;
    use crate::timer::TimerAction;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingStore {
        saves: AtomicUsize,
        fail: bool,
    }

    impl SessionStore for CountingStore {
        fn load(&self) -> Result<Option<SessionState>, DatabaseError> {
            if self.fail {
                return Err(DatabaseError::Corrupt("bad".into()));
            }
            Ok(None)
        }

        fn save(&self, _session: &SessionState) -> Result<(), DatabaseError> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DatabaseError::Locked);
            }
            Ok(())
        }
    }

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::at_epoch_secs(1_700_000_000))
    }

    #[test]
    fn saves_only_applied_commands() {
        let store = Arc::new(CountingStore {
            saves: AtomicUsize::new(0),
            fail: false,
        });
        let handle = SessionHandle::restore(ModeDurations::default(), clock(), store.clone());
        handle
            .execute(Command::AddTask { text: "a".into() })
            .unwrap();
        assert!(handle
            .execute(Command::AddTask { text: "".into() })
            .is_err());
        assert_eq!(store.saves.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failing_store_does_not_block_commands() {
        let store = Arc::new(CountingStore {
            saves: AtomicUsize::new(0),
            fail: true,
        });
        let handle = SessionHandle::restore(ModeDurations::default(), clock(), store);
        assert!(handle
            .execute(Command::AddTask { text: "a".into() })
            .is_ok());
        assert_eq!(handle.state_since(0).state.revision, 1);
    }

    #[test]
    fn reads_follow_the_injected_clock() {
        let clock = clock();
        let handle = SessionHandle::fresh(ModeDurations::default(), clock.clone());
        handle
            .execute(Command::TimerControl {
                action: TimerAction::Start,
            })
            .unwrap();
        clock.advance_secs(90);
        let state = handle.state_since(0);
        assert_eq!(state.state.timer.remaining_sec, 1410);
        assert_eq!(state.now, clock.now());
    }

    #[test]
    fn concurrent_commands_are_serialized() {
        let handle = SessionHandle::fresh(ModeDurations::default(), clock());
        let threads: Vec<_> = (0..8)
            .map(|i| {
                let handle = handle.clone();
                std::thread::spawn(move || {
                    for j in 0..10 {
                        handle
                            .execute(Command::AddTask {
                                text: format!("t{i}-{j}"),
                            })
                            .unwrap();
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }
        let state = handle.state_since(0);
        assert_eq!(state.state.tasks.len(), 80);
        assert_eq!(state.state.revision, 80);
        assert_eq!(state.progress.total, 80);
    }
}
