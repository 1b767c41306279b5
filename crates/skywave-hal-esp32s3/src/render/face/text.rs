use super::*;

pub(super) fn draw_text(
    frame: &mut FrameBuffer,
    x: usize,
    y: usize,
    text: &str,
    scale: usize,
    on: bool,
) {
    let mut cursor_x = x;

    for c in text.chars() {
        draw_glyph(frame, cursor_x, y, glyph(c), scale, on);
        cursor_x += 6 * scale;
    }
}

pub(super) fn text_pixel_width(text: &str, scale: usize) -> usize {
    let chars = text.chars().count();
    if chars == 0 { 0 } else { chars * (6 * scale) - scale }
}

pub(super) fn draw_text_centered(
    frame: &mut FrameBuffer,
    y: usize,
    text: &str,
    scale: usize,
    on: bool,
) {
    let width = text_pixel_width(text, scale);
    let x = WIDTH.saturating_sub(width) / 2;
    draw_text(frame, x, y, text, scale, on);
}

/// Characters that fit a pixel budget at the given scale.
pub(super) fn chars_for_width(max_width: usize, scale: usize) -> usize {
    (max_width + scale) / (6 * scale)
}

/// Clips at a character cap without splitting a UTF-8 sequence.
pub(super) fn clip_text(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
