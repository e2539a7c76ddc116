use crate::geom::{Vec2, Viewport};
use crate::raster::BlitRect;

/// Uniform scale plus centring offset that fits a fixed-size world into the window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldProjection {
    pub scale: f32,
    pub offset: Vec2,
    pub world_width: f32,
    pub world_height: f32,
}

impl WorldProjection {
    pub fn fit(world_width: f32, world_height: f32, viewport: Viewport) -> Self {
        let scale = if world_width > 0.0 && world_height > 0.0 && !viewport.is_empty() {
            (viewport.width as f32 / world_width).min(viewport.height as f32 / world_height)
        } else {
            0.0
        };
        let offset = Vec2::new(
            (viewport.width as f32 - world_width * scale) * 0.5,
            (viewport.height as f32 - world_height * scale) * 0.5,
        );
        Self {
            scale,
            offset,
            world_width,
            world_height,
        }
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        Vec2::new(
            self.offset.x + world.x * self.scale,
            self.offset.y + world.y * self.scale,
        )
    }

    pub fn rect(&self, left: f32, top: f32, width: f32, height: f32) -> BlitRect {
        let origin = self.world_to_screen(Vec2::new(left, top));
        BlitRect {
            left: origin.x,
            top: origin.y,
            width: width * self.scale,
            height: height * self.scale,
        }
    }

    /// Integer pixel rect `(left, top, width, height)` for solid fills.
    pub fn rect_px(&self, left: f32, top: f32, width: f32, height: f32) -> (i32, i32, i32, i32) {
        let rect = self.rect(left, top, width, height);
        let x0 = rect.left.round() as i32;
        let y0 = rect.top.round() as i32;
        let x1 = (rect.left + rect.width).round() as i32;
        let y1 = (rect.top + rect.height).round() as i32;
        (x0, y0, x1 - x0, y1 - y0)
    }
}
