use super::*;
use skywave_core::link::QualityLevel;

const BARS: usize = 4;
const BAR_WIDTH: usize = 2;
const BAR_GAP: usize = 1;
const BAR_STEP_PX: usize = 2;

pub(super) const fn signal_icon_width() -> usize {
    BARS * (BAR_WIDTH + BAR_GAP)
}

/// Four ascending bars; empty slots stay hollow, and an unusable link
/// gets a slash through the icon.
pub(super) fn draw_signal_bars(
    frame: &mut FrameBuffer,
    x: usize,
    y: usize,
    quality: QualityLevel,
    on: bool,
) {
    let lit = quality.bars() as usize;

    for bar in 0..BARS {
        let bar_h = (bar + 1) * BAR_STEP_PX;
        let bar_x = x + bar * (BAR_WIDTH + BAR_GAP);
        let bar_y = y + (BARS * BAR_STEP_PX) - bar_h;

        if bar < lit {
            draw_filled_rect(frame, bar_x, bar_y, BAR_WIDTH, bar_h, on);
        } else {
            draw_rect(frame, bar_x, bar_y, BAR_WIDTH, bar_h, on);
        }
    }

    if quality == QualityLevel::None {
        for i in 0..signal_icon_width() {
            set_pixel(frame, x + i, y + (BARS * BAR_STEP_PX).saturating_sub(1 + i), on);
        }
    }
}

/// Station name left, signal icon right, rule underneath.
pub(super) fn draw_ready_header(
    frame: &mut FrameBuffer,
    station: &str,
    quality: QualityLevel,
    on: bool,
) {
    let icon_x = WIDTH - signal_icon_width();
    let station_budget = chars_for_width(icon_x.saturating_sub(4), 1);

    draw_text(frame, 0, 1, clip_text(station, station_budget), 1, on);
    draw_signal_bars(frame, icon_x, 0, quality, on);
    draw_hline(frame, 0, 10, WIDTH, on);
}
