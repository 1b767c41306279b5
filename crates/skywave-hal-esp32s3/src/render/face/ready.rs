use super::*;
use skywave_core::clock::WallClock;
use skywave_core::link::QualityLevel;
use skywave_core::render::StatusLine;

pub(super) fn draw_ready_face(
    frame: &mut FrameBuffer,
    station: &str,
    quality: QualityLevel,
    clock: Option<WallClock>,
    status: StatusLine<'_>,
) {
    draw_ready_header(frame, station, quality, true);

    match clock {
        Some(clock) => {
            draw_text_centered(frame, 16, clock.time_text().as_str(), 2, true);
            draw_text_centered(frame, 34, clock.date_text().as_str(), 1, true);
        }
        None => {
            draw_text_centered(frame, 16, "--:--:--", 2, true);
        }
    }

    draw_hline(frame, 0, HEIGHT - 14, WIDTH, true);
    let label = match status {
        StatusLine::Track(title) => title,
        StatusLine::Playing => "PLAYING",
        StatusLine::Stopped => "STOPPED",
    };
    let budget = chars_for_width(WIDTH - 2, 1);
    draw_text_centered(frame, HEIGHT - 9, clip_text(label, budget), 1, true);
}
