pub mod face;

use skywave_core::render::Screen;
use ssd1309::FrameBuffer;

pub trait FrameRenderer {
    fn render(&mut self, screen: Screen<'_>, frame: &mut FrameBuffer);
}
