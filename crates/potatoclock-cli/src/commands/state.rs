use std::ops::ControlFlow;
use std::time::Duration;

use potatoclock_core::{
    format_countdown, Config, Event, PollUpdate, SnapshotPoller, StateResponse,
};

use super::{print_json, Backend, CliResult};

/// Print the full snapshot as JSON.
pub fn show(backend: &Backend, since: u64) -> CliResult {
    print_json(&backend.state(since)?)
}

/// One status line per accepted snapshot, plus a line per one-shot event.
pub fn watch(backend: &Backend, count: Option<u64>, interval_ms: Option<u64>) -> CliResult {
    let Backend::Remote { client, runtime } = backend else {
        return Err("watch needs a running server; drop --local".into());
    };
    let every = Duration::from_millis(
        interval_ms.unwrap_or_else(|| Config::load_or_default().client.poll_interval_ms),
    );

    let mut poller = SnapshotPoller::new();
    let mut seen = 0u64;
    runtime.block_on(poller.watch(client, every, |update, poller| {
        match update {
            PollUpdate::Accepted => {
                if let Some(state) = poller.current() {
                    for event in poller.fresh_events() {
                        if let Some(line) = describe_event(&event.event) {
                            println!("{line}");
                        }
                    }
                    println!("{}", status_line(state));
                }
            }
            PollUpdate::Stale => {}
            PollUpdate::Failed(e) => eprintln!("offline: {e}"),
        }
        seen += 1;
        match count {
            Some(limit) if seen >= limit => ControlFlow::Break(()),
            _ => ControlFlow::Continue(()),
        }
    }));
    Ok(())
}

pub fn status_line(state: &StateResponse) -> String {
    let snap = &state.state;
    let focus = snap
        .focus_task_id
        .as_deref()
        .and_then(|id| snap.tasks.iter().find(|t| t.id == id))
        .map(|t| t.text.as_str())
        .unwrap_or("-");
    format!(
        "{} {} {} | {}/{} done ({}%) | stage {} | focus: {}",
        format_countdown(snap.timer.remaining_sec),
        snap.timer.mode,
        if snap.timer.running { "running" } else { "paused" },
        state.progress.done,
        state.progress.total,
        state.progress.pct,
        snap.garden.stage,
        focus,
    )
}

fn describe_event(event: &Event) -> Option<String> {
    match event {
        Event::TimerExpired { from, to, .. } => Some(format!("alarm: {from} finished, {to} begins")),
        Event::GardenWatered { stage, .. } => Some(format!("watered (stage {stage})")),
        Event::FlowerPlanted { .. } => Some("flower planted".to_string()),
        _ => None,
    }
}
