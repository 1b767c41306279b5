use super::*;
use skywave_core::render::SPINNER_STEPS;

/// Eight spinner positions on a circle around the face center.
const SPINNER_POINTS: [(isize, isize); SPINNER_STEPS as usize] = [
    (0, -12),
    (9, -9),
    (12, 0),
    (9, 9),
    (0, 12),
    (-9, 9),
    (-12, 0),
    (-9, -9),
];

const SPINNER_CENTER: (isize, isize) = (64, 27);

pub(super) fn draw_progress_face(
    frame: &mut FrameBuffer,
    title: &str,
    subtitle: &str,
    detail: &str,
    spinner_step: u8,
) {
    draw_text_centered(frame, 2, title, 1, true);
    draw_hline(frame, 24, 10, WIDTH - 48, true);

    draw_spinner(frame, spinner_step, true);

    draw_text_centered(frame, 44, subtitle, 1, true);
    if !detail.is_empty() {
        let budget = chars_for_width(WIDTH - 8, 1);
        draw_text_centered(frame, 55, clip_text(detail, budget), 1, true);
    }
}

/// The head dot is largest; two trailing positions fade out behind it.
fn draw_spinner(frame: &mut FrameBuffer, step: u8, on: bool) {
    let head = (step % SPINNER_STEPS) as usize;
    let (cx, cy) = SPINNER_CENTER;

    for (idx, (dx, dy)) in SPINNER_POINTS.iter().enumerate() {
        let age = (idx + SPINNER_POINTS.len() - head) % SPINNER_POINTS.len();
        let size: isize = match age {
            0 => 4,
            1 => 3,
            2 => 2,
            _ => continue,
        };

        let x = cx + dx - size / 2;
        let y = cy + dy - size / 2;
        if x < 0 || y < 0 {
            continue;
        }
        draw_filled_rect(frame, x as usize, y as usize, size as usize, size as usize, on);
    }
}
