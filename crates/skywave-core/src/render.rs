//! Screen view models consumed by the board renderer.

use crate::clock::WallClock;
use crate::link::QualityLevel;

/// Minimum redraw interval for the animated progress screens.
pub const PROGRESS_FRAME_MS: u64 = 120;
/// Minimum redraw interval for the ready screen; the seconds readout is
/// the fastest-changing element.
pub const READY_FRAME_MS: u64 = 500;
/// Cyclic progress indicator positions; one step per presented frame.
pub const SPINNER_STEPS: u8 = 8;

/// Status line on the ready screen.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StatusLine<'a> {
    /// Current track title, already truncated for display.
    Track(&'a str),
    Playing,
    Stopped,
}

/// App-level view model consumed by the board renderer.
pub enum Screen<'a> {
    Progress {
        title: &'a str,
        subtitle: &'a str,
        detail: &'a str,
        spinner_step: u8,
    },
    Ready {
        station: &'a str,
        quality: QualityLevel,
        clock: Option<WallClock>,
        status: StatusLine<'a>,
    },
}
