use skywave_core::render::Screen;
use ssd1309::{
    FrameBuffer,
    command::{HEIGHT, WIDTH},
};

use super::FrameRenderer;

mod glyph;
mod header;
mod primitives;
mod progress;
mod ready;
mod text;

#[allow(unused_imports)]
use self::{glyph::*, header::*, primitives::*, progress::*, ready::*, text::*};

/// Renderer for the progress and ready faces.
#[derive(Debug, Default, Clone, Copy)]
pub struct FaceRenderer;

impl FaceRenderer {
    pub const fn new() -> Self {
        Self
    }
}

impl FrameRenderer for FaceRenderer {
    fn render(&mut self, screen: Screen<'_>, frame: &mut FrameBuffer) {
        frame.clear(false);

        match screen {
            Screen::Progress {
                title,
                subtitle,
                detail,
                spinner_step,
            } => draw_progress_face(frame, title, subtitle, detail, spinner_step),
            Screen::Ready {
                station,
                quality,
                clock,
                status,
            } => draw_ready_face(frame, station, quality, clock, status),
        }
    }
}
