//! Runtime state machine for the connect → sync → ready sequence and
//! steady-state stream supervision.

use log::{info, warn};

use crate::{
    clock::{ClockSource, WallClock, is_plausible},
    link::{NetworkLink, QualityLevel},
    render::{PROGRESS_FRAME_MS, READY_FRAME_MS, SPINNER_STEPS, Screen, StatusLine},
    stream::{NowPlaying, StreamPipeline, TITLE_DISPLAY_CHARS, truncate_chars},
};

/// A join attempt is abandoned and restarted after this budget.
const JOIN_TIMEOUT_MS: u64 = 15_000;
/// Settle delay between a forced disconnect and the next join.
const REJOIN_SETTLE_MS: u64 = 400;
/// Association is polled this often while ready, not every tick.
const LINK_POLL_INTERVAL_MS: u64 = 2_000;
/// Minimum spacing between stream restart attempts.
const STREAM_RESTART_COOLDOWN_MS: u64 = 5_000;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    Booting,
    ConnectingNetwork,
    SyncingClock,
    Ready,
}

impl Phase {
    const COUNT: usize = 4;

    const fn index(self) -> usize {
        match self {
            Self::Booting => 0,
            Self::ConnectingNetwork => 1,
            Self::SyncingClock => 2,
            Self::Ready => 3,
        }
    }

    const fn frame_interval_ms(self) -> u64 {
        match self {
            Self::Ready => READY_FRAME_MS,
            _ => PROGRESS_FRAME_MS,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TickResult {
    NoRender,
    RenderRequested,
}

/// Deploy-time inputs. Timing policy lives in module constants.
#[derive(Clone, Copy, Debug)]
pub struct RadioConfig {
    pub app_title: &'static str,
    pub network_label: &'static str,
    pub station_url: &'static str,
    pub station_label: &'static str,
    pub time_servers: &'static [&'static str],
    pub utc_offset_minutes: i32,
}

#[derive(Clone, Copy, Debug, Default)]
struct SessionState {
    running: bool,
    /// Last restart attempt or last observed failure; restart attempts
    /// are spaced at least a cooldown apart from this stamp.
    cooldown_since_ms: Option<u64>,
}

/// Per-phase last-presented stamps; the only gate on presentation.
#[derive(Clone, Copy, Debug, Default)]
struct RenderThrottle {
    last_present_ms: [Option<u64>; Phase::COUNT],
}

impl RenderThrottle {
    fn due(&self, phase: Phase, now_ms: u64) -> bool {
        match self.last_present_ms[phase.index()] {
            Some(last) => now_ms.saturating_sub(last) >= phase.frame_interval_ms(),
            None => true,
        }
    }

    fn mark(&mut self, phase: Phase, now_ms: u64) {
        self.last_present_ms[phase.index()] = Some(now_ms);
    }

    fn clear(&mut self, phase: Phase) {
        self.last_present_ms[phase.index()] = None;
    }
}

pub struct RadioApp<NET, CLK, STR>
where
    NET: NetworkLink,
    CLK: ClockSource,
    STR: StreamPipeline,
{
    link: NET,
    clock: CLK,
    stream: STR,
    config: RadioConfig,
    phase: Phase,
    attempt_started_ms: u64,
    rejoin_at_ms: Option<u64>,
    address: Option<[u8; 4]>,
    last_link_poll_ms: u64,
    session: SessionState,
    now_playing: NowPlaying,
    throttle: RenderThrottle,
    spinner_step: u8,
}

include!("machine.rs");
include!("supervisor.rs");
include!("view.rs");

#[cfg(test)]
mod tests;
