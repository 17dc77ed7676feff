//! End-to-end tests: a server on an ephemeral port driven through the
//! display-side client.

use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use potatoclock_core::{
    DatabaseError, ErrorKind, ManualClock, ModeDurations, PollUpdate, SessionHandle, SessionState,
    SessionStore, SnapshotPoller, SyncClient, SyncError, TimerAction, TimerMode,
};
use potatoclock_server::{spawn, AppState};

async fn start() -> (SyncClient, Arc<ManualClock>, String) {
    let clock = Arc::new(ManualClock::at_epoch_secs(1_700_000_000));
    let session = SessionHandle::fresh(ModeDurations::default(), clock.clone());
    let addr = spawn(AppState::new(session), "127.0.0.1:0").await.unwrap();
    let base = format!("http://{addr}");
    let client = SyncClient::new(&base, Duration::from_secs(2)).unwrap();
    (client, clock, base)
}

fn rejected_kind(err: SyncError) -> (u16, ErrorKind) {
    match err {
        SyncError::Rejected { status, kind, .. } => (status, kind),
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn test_health() {
    let (client, _, _) = start().await;
    let body = client.health().await.unwrap();
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn test_add_and_complete_task() {
    let (client, _, _) = start().await;
    let added = client.add_task("  Write report  ").await.unwrap();
    assert!(added.ok);
    assert_eq!(added.task.text, "Write report");
    assert_eq!(added.progress.total, 1);

    let toggled = client.toggle_done(&added.task.id).await.unwrap();
    assert!(toggled.task.done);
    assert_eq!(toggled.progress.done, 1);
    assert_eq!(toggled.progress.pct, 100);

    let state = client.state(0).await.unwrap();
    assert_eq!(state.state.garden.water_count, 1);
    assert_eq!(state.progress.pct, 100);
    assert_eq!(state.state.revision, 2);
}

#[tokio::test]
async fn test_errors_map_to_status_codes() {
    let (client, _, _) = start().await;

    let err = client.add_task("   ").await.unwrap_err();
    assert_eq!(rejected_kind(err), (400, ErrorKind::Validation));

    let err = client.toggle_done("missing").await.unwrap_err();
    assert_eq!(rejected_kind(err), (404, ErrorKind::NotFound));

    let err = client.plant(None).await.unwrap_err();
    assert_eq!(rejected_kind(err), (409, ErrorKind::NotReady));

    let err = client.timer_set(TimerMode::Work, 0, None).await.unwrap_err();
    assert_eq!(rejected_kind(err), (400, ErrorKind::Validation));

    let err = client.rest_idea().await.unwrap_err();
    assert_eq!(rejected_kind(err), (409, ErrorKind::InvalidState));

    // Nothing above was applied.
    assert_eq!(client.state(0).await.unwrap().state.revision, 0);
}

#[tokio::test]
async fn test_malformed_body_is_validation_error() {
    let (_, _, base) = start().await;
    let resp = reqwest::Client::new()
        .post(format!("{base}/api/tasks"))
        .header("content-type", "application/json")
        .body("{\"txt\": 1}")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"]["kind"], "validation");
}

#[tokio::test]
async fn test_plant_accepts_empty_body() {
    let (_, _, base) = start().await;
    let resp = reqwest::Client::new()
        .post(format!("{base}/api/garden/plant"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 409);
}

#[tokio::test]
async fn test_timer_expiry_seen_by_poller() {
    let (client, clock, _) = start().await;
    client.add_task("focus here").await.unwrap();
    client.timer_set(TimerMode::Work, 1, None).await.unwrap();
    let started = client.timer_control(TimerAction::Start).await.unwrap();
    assert!(started.timer.running);

    let mut poller = SnapshotPoller::new();
    assert!(matches!(
        poller.apply(client.state(poller.cursor()).await),
        PollUpdate::Accepted
    ));

    clock.advance_secs(60);
    assert!(matches!(
        poller.apply(client.state(poller.cursor()).await),
        PollUpdate::Accepted
    ));
    let held = poller.current().unwrap();
    assert_eq!(held.state.timer.mode, TimerMode::Rest);
    assert_eq!(held.state.timer.remaining_sec, 300);
    assert_eq!(poller.fresh_events().len(), 1);

    // Pausing twice is the same as once.
    let once = client.timer_control(TimerAction::Pause).await.unwrap();
    let twice = client.timer_control(TimerAction::Pause).await.unwrap();
    assert_eq!(once.timer, twice.timer);
}

#[tokio::test]
async fn test_focus_and_rest_ideas() {
    let (client, _, _) = start().await;
    let a = client.add_task("A").await.unwrap().task.id;
    let b = client.add_task("B").await.unwrap().task.id;

    let focus = client.set_focus(&b).await.unwrap();
    assert_eq!(focus.focus.as_deref(), Some(b.as_str()));

    client.toggle_done(&a).await.unwrap();
    let err = client.set_focus(&a).await.unwrap_err();
    assert_eq!(rejected_kind(err), (409, ErrorKind::InvalidState));

    let idea = client.add_rest_idea("  look   at a tree ").await.unwrap();
    assert_eq!(idea.idea, "Look at a tree");

    client.timer_control(TimerAction::Skip).await.unwrap();
    let suggestion = client.rest_idea().await.unwrap();
    assert!(!suggestion.idea.is_empty());
}

/// Store whose `save` waits until the test releases it (or 5s pass).
struct GatedStore {
    release: Mutex<Receiver<()>>,
}

impl SessionStore for GatedStore {
    fn load(&self) -> Result<Option<SessionState>, DatabaseError> {
        Ok(None)
    }

    fn save(&self, _session: &SessionState) -> Result<(), DatabaseError> {
        let _ = self
            .release
            .lock()
            .unwrap()
            .recv_timeout(Duration::from_secs(5));
        Ok(())
    }
}

#[tokio::test]
async fn test_slow_save_does_not_stall_other_requests() {
    let (release, gate) = mpsc::channel();
    let clock = Arc::new(ManualClock::at_epoch_secs(1_700_000_000));
    let session = SessionHandle::fresh(ModeDurations::default(), clock).with_store(Arc::new(
        GatedStore {
            release: Mutex::new(gate),
        },
    ));
    let addr = spawn(AppState::new(session), "127.0.0.1:0").await.unwrap();
    let base = format!("http://{addr}");

    let began = Instant::now();
    let writer_base = base.clone();
    let write = tokio::spawn(async move {
        let writer = SyncClient::new(&writer_base, Duration::from_secs(10)).unwrap();
        writer.add_task("slow save").await
    });
    tokio::time::sleep(Duration::from_millis(100)).await;

    // The save is still parked; health must answer on the runtime anyway.
    let client = SyncClient::new(&base, Duration::from_secs(10)).unwrap();
    let health = client.health().await.unwrap();
    assert_eq!(health["ok"], true);
    assert!(began.elapsed() < Duration::from_secs(3));

    release.send(()).unwrap();
    let added = write.await.unwrap().unwrap();
    assert_eq!(added.task.text, "slow save");
    assert_eq!(client.state(0).await.unwrap().state.revision, 1);
}
