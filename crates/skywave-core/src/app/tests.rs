use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::vec::Vec;

use super::*;
use crate::clock::MIN_PLAUSIBLE_EPOCH;
use crate::stream::{MetadataEvent, MetadataKind, TITLE_WINDOW_MS, copy_truncated};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Call {
    Join,
    Disconnect,
    ClockSync,
    StreamStart,
    StreamStop,
}

#[derive(Clone, Default)]
struct Shared {
    calls: Rc<RefCell<Vec<Call>>>,
    associated: Rc<Cell<bool>>,
    dbm: Rc<Cell<Option<i8>>>,
    clock_unix: Rc<Cell<Option<i64>>>,
    pump_ok: Rc<Cell<bool>>,
    stream_running: Rc<Cell<bool>>,
    start_fails: Rc<Cell<bool>>,
    metadata: Rc<RefCell<Option<MetadataEvent>>>,
}

impl Shared {
    fn push(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn count(&self, call: Call) -> usize {
        self.calls.borrow().iter().filter(|&&c| c == call).count()
    }
}

fn shared() -> Shared {
    let shared = Shared::default();
    shared.pump_ok.set(true);
    shared
}

struct FakeLink(Shared);

impl NetworkLink for FakeLink {
    type Error = ();

    fn begin_join(&mut self) -> Result<(), ()> {
        self.0.push(Call::Join);
        Ok(())
    }

    fn is_associated(&self) -> bool {
        self.0.associated.get()
    }

    fn signal_dbm(&self) -> Option<i8> {
        self.0.dbm.get()
    }

    fn assigned_address(&self) -> Option<[u8; 4]> {
        self.0.associated.get().then_some([10, 0, 0, 7])
    }

    fn disconnect(&mut self, _force: bool) {
        self.0.push(Call::Disconnect);
        self.0.associated.set(false);
    }
}

struct FakeClock(Shared);

impl ClockSource for FakeClock {
    type Error = ();

    fn begin_sync(&mut self, _servers: &'static [&'static str]) -> Result<(), ()> {
        self.0.push(Call::ClockSync);
        Ok(())
    }

    fn now_unix(&self) -> Option<i64> {
        self.0.clock_unix.get()
    }
}

struct FakeStream(Shared);

impl StreamPipeline for FakeStream {
    type Error = ();

    fn start(&mut self, _url: &'static str) -> Result<(), ()> {
        self.0.push(Call::StreamStart);
        if self.0.start_fails.get() {
            return Err(());
        }
        self.0.stream_running.set(true);
        Ok(())
    }

    fn pump(&mut self) -> bool {
        if !self.0.pump_ok.get() {
            self.0.stream_running.set(false);
            return false;
        }
        true
    }

    fn stop(&mut self) {
        self.0.push(Call::StreamStop);
        self.0.stream_running.set(false);
    }

    fn is_running(&self) -> bool {
        self.0.stream_running.get()
    }

    fn poll_metadata(&mut self) -> Option<MetadataEvent> {
        self.0.metadata.borrow_mut().take()
    }
}

type TestApp = RadioApp<FakeLink, FakeClock, FakeStream>;

const TEST_SERVERS: &[&str] = &["test.pool.example"];

fn make_app(shared: &Shared) -> TestApp {
    RadioApp::new(
        FakeLink(shared.clone()),
        FakeClock(shared.clone()),
        FakeStream(shared.clone()),
        RadioConfig {
            app_title: "Test",
            network_label: "testnet",
            station_url: "http://radio.example/stream",
            station_label: "Test Station",
            time_servers: TEST_SERVERS,
            utc_offset_minutes: 0,
        },
    )
}

/// Associates, syncs, and returns the tick time at which `Ready` was
/// entered (and the session started).
fn drive_to_ready(app: &mut TestApp, shared: &Shared, start: u64) -> u64 {
    let _ = app.tick(start);
    shared.associated.set(true);
    let _ = app.tick(start + 10);
    shared.clock_unix.set(Some(MIN_PLAUSIBLE_EPOCH + 1_000));
    let _ = app.tick(start + 20);
    assert_eq!(app.phase(), Phase::Ready);
    start + 20
}

fn status_label(app: &TestApp, now_ms: u64) -> String {
    let mut seen = None;
    app.with_screen(now_ms, |screen| {
        if let Screen::Ready { status, .. } = screen {
            seen = Some(match status {
                StatusLine::Track(title) => format!("track:{title}"),
                StatusLine::Playing => "playing".to_string(),
                StatusLine::Stopped => "stopped".to_string(),
            });
        }
    });
    seen.expect("not on the ready screen")
}

#[test]
fn boot_sequence_follows_transition_table() {
    let shared = shared();
    let mut app = make_app(&shared);

    let mut phases = Vec::new();
    for tick in 1u64..=41 {
        if tick == 5 {
            shared.associated.set(true);
        }
        if tick == 40 {
            shared.clock_unix.set(Some(MIN_PLAUSIBLE_EPOCH));
        }
        phases.push(app.phase());
        let _ = app.tick(tick);
    }

    assert_eq!(phases[0], Phase::Booting);
    assert!(phases[1..5].iter().all(|&p| p == Phase::ConnectingNetwork));
    assert!(phases[5..40].iter().all(|&p| p == Phase::SyncingClock));
    assert_eq!(phases[40], Phase::Ready);
    assert_eq!(
        shared.calls(),
        vec![Call::Join, Call::ClockSync, Call::StreamStart]
    );
    assert_eq!(app.assigned_address(), Some([10, 0, 0, 7]));
}

#[test]
fn join_timeout_restarts_after_settle_delay() {
    let shared = shared();
    let mut app = make_app(&shared);

    let _ = app.tick(0);
    assert_eq!(shared.count(Call::Join), 1);

    let _ = app.tick(JOIN_TIMEOUT_MS);
    assert_eq!(shared.count(Call::Disconnect), 0);

    let _ = app.tick(JOIN_TIMEOUT_MS + 1);
    assert_eq!(shared.count(Call::Disconnect), 1);
    assert_eq!(shared.count(Call::Join), 1);

    let _ = app.tick(JOIN_TIMEOUT_MS + REJOIN_SETTLE_MS);
    assert_eq!(shared.count(Call::Join), 1);

    let _ = app.tick(JOIN_TIMEOUT_MS + 1 + REJOIN_SETTLE_MS);
    assert_eq!(shared.count(Call::Join), 2);

    assert_eq!(app.phase(), Phase::ConnectingNetwork);
    assert_eq!(shared.count(Call::ClockSync), 0);
}

#[test]
fn ready_link_loss_stops_stream_before_rejoining() {
    let shared = shared();
    let mut app = make_app(&shared);
    let ready_at = drive_to_ready(&mut app, &shared, 0);

    shared.calls.borrow_mut().clear();
    shared.associated.set(false);

    let _ = app.tick(ready_at + LINK_POLL_INTERVAL_MS);
    assert_eq!(app.phase(), Phase::ConnectingNetwork);
    assert_eq!(shared.calls(), vec![Call::StreamStop, Call::Join]);

    // Recover: the machine goes back through sync, never through boot,
    // and the previous track metadata is gone.
    shared.associated.set(true);
    let resync = ready_at + LINK_POLL_INTERVAL_MS + 10;
    let _ = app.tick(resync);
    assert_eq!(app.phase(), Phase::SyncingClock);
    let _ = app.tick(resync + 10);
    assert_eq!(app.phase(), Phase::Ready);
    assert_eq!(status_label(&app, resync + 11), "playing");
}

#[test]
fn progress_renders_respect_min_interval() {
    let shared = shared();
    let mut app = make_app(&shared);

    let mut render_times = Vec::new();
    for now in (0..2_000u64).step_by(10) {
        if app.tick(now) == TickResult::RenderRequested {
            render_times.push(now);
        }
    }

    assert!(render_times.len() >= 2);
    for pair in render_times.windows(2) {
        assert!(pair[1] - pair[0] >= PROGRESS_FRAME_MS);
    }
}

#[test]
fn ready_renders_respect_min_interval() {
    let shared = shared();
    let mut app = make_app(&shared);
    let ready_at = drive_to_ready(&mut app, &shared, 0);

    let mut render_times = Vec::new();
    for step in 1..100u64 {
        let now = ready_at + step * 20;
        if app.tick(now) == TickResult::RenderRequested {
            render_times.push(now);
        }
    }

    assert!(render_times.len() >= 2);
    for pair in render_times.windows(2) {
        assert!(pair[1] - pair[0] >= READY_FRAME_MS);
    }
}

#[test]
fn transition_is_visible_in_same_tick_frame() {
    let shared = shared();
    let mut app = make_app(&shared);
    let _ = app.tick(0);
    shared.associated.set(true);
    let _ = app.tick(10);
    shared.clock_unix.set(Some(MIN_PLAUSIBLE_EPOCH + 1_000));

    // The tick that enters Ready also requests the ready frame.
    assert_eq!(app.tick(20), TickResult::RenderRequested);
    let mut on_ready_screen = false;
    app.with_screen(20, |screen| {
        on_ready_screen = matches!(screen, Screen::Ready { .. });
    });
    assert!(on_ready_screen);
}

#[test]
fn metadata_window_governs_status_line() {
    let shared = shared();
    let mut app = make_app(&shared);
    let ready_at = drive_to_ready(&mut app, &shared, 0);

    let arrive = ready_at + 100;
    *shared.metadata.borrow_mut() = Some(MetadataEvent {
        kind: MetadataKind::TrackTitle,
        text: copy_truncated("Artist - Song"),
    });
    let _ = app.tick(arrive);

    assert_eq!(status_label(&app, arrive + 1), "track:Artist - Song");
    assert_eq!(
        status_label(&app, arrive + TITLE_WINDOW_MS - 1),
        "track:Artist - Song"
    );
    assert_eq!(status_label(&app, arrive + TITLE_WINDOW_MS), "playing");
}

#[test]
fn long_titles_are_truncated_for_display() {
    let shared = shared();
    let mut app = make_app(&shared);
    let ready_at = drive_to_ready(&mut app, &shared, 0);

    *shared.metadata.borrow_mut() = Some(MetadataEvent {
        kind: MetadataKind::TrackTitle,
        text: copy_truncated("0123456789012345678901234567890123456789"),
    });
    let _ = app.tick(ready_at + 100);

    let label = status_label(&app, ready_at + 101);
    let title = label.strip_prefix("track:").unwrap();
    assert_eq!(title.chars().count(), crate::stream::TITLE_DISPLAY_CHARS);
}

#[test]
fn pump_failure_restarts_once_after_cooldown() {
    let shared = shared();
    let mut app = make_app(&shared);
    let ready_at = drive_to_ready(&mut app, &shared, 0);
    assert_eq!(shared.count(Call::StreamStart), 1);

    shared.pump_ok.set(false);
    let failed_at = ready_at + 100;
    let _ = app.tick(failed_at);
    shared.pump_ok.set(true);

    let _ = app.tick(failed_at + 1_000);
    let _ = app.tick(failed_at + STREAM_RESTART_COOLDOWN_MS - 1);
    assert_eq!(shared.count(Call::StreamStart), 1);

    let _ = app.tick(failed_at + STREAM_RESTART_COOLDOWN_MS);
    assert_eq!(shared.count(Call::StreamStart), 2);

    let _ = app.tick(failed_at + STREAM_RESTART_COOLDOWN_MS + 10);
    assert_eq!(shared.count(Call::StreamStart), 2);
    assert_eq!(status_label(&app, failed_at + STREAM_RESTART_COOLDOWN_MS + 11), "playing");
}

#[test]
fn failed_start_is_retried_on_cooldown_schedule() {
    let shared = shared();
    let mut app = make_app(&shared);
    shared.start_fails.set(true);
    let ready_at = drive_to_ready(&mut app, &shared, 0);
    assert_eq!(shared.count(Call::StreamStart), 1);
    assert_eq!(status_label(&app, ready_at + 1), "stopped");

    let _ = app.tick(ready_at + STREAM_RESTART_COOLDOWN_MS - 1);
    assert_eq!(shared.count(Call::StreamStart), 1);

    shared.start_fails.set(false);
    let _ = app.tick(ready_at + STREAM_RESTART_COOLDOWN_MS);
    assert_eq!(shared.count(Call::StreamStart), 2);
    assert_eq!(status_label(&app, ready_at + STREAM_RESTART_COOLDOWN_MS + 1), "playing");
}
