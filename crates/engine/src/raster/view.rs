use crate::geom::{Vec2, Viewport};

pub const ZOOM_DEFAULT: f32 = 1.0;
pub const ZOOM_MIN: f32 = 0.1;
pub const ZOOM_MAX: f32 = 32.0;
pub const ZOOM_STEP_FACTOR: f32 = 1.2;

/// Screen <-> image mapping for the editor canvas. The image is centered in the canvas,
/// translated by `pan` (screen pixels) and scaled by `zoom`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    zoom: f32,
    pan: Vec2,
    min_zoom: f32,
    max_zoom: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            zoom: ZOOM_DEFAULT,
            pan: Vec2::ZERO,
            min_zoom: ZOOM_MIN,
            max_zoom: ZOOM_MAX,
        }
    }
}

impl ViewTransform {
    /// Identity view whose zoom is confined to `[min_zoom, max_zoom]`. Invalid bounds fall
    /// back to the defaults.
    pub fn with_zoom_bounds(min_zoom: f32, max_zoom: f32) -> Self {
        let valid = min_zoom.is_finite() && max_zoom.is_finite() && 0.0 < min_zoom;
        if !valid || min_zoom > max_zoom {
            return Self::default();
        }
        Self {
            zoom: ZOOM_DEFAULT.clamp(min_zoom, max_zoom),
            min_zoom,
            max_zoom,
            ..Self::default()
        }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    pub fn zoom_bounds(&self) -> (f32, f32) {
        (self.min_zoom, self.max_zoom)
    }

    /// Back to zoom 1 (within bounds) and no pan; bounds are kept.
    pub fn reset(&mut self) {
        *self = Self::with_zoom_bounds(self.min_zoom, self.max_zoom);
    }

    pub fn screen_to_image(&self, screen: Vec2, canvas: Viewport, image: Viewport) -> Vec2 {
        let center = canvas.center();
        Vec2::new(
            (screen.x - center.x - self.pan.x) / self.zoom + image.width as f32 * 0.5,
            (screen.y - center.y - self.pan.y) / self.zoom + image.height as f32 * 0.5,
        )
    }

    pub fn image_to_screen(&self, point: Vec2, canvas: Viewport, image: Viewport) -> Vec2 {
        let center = canvas.center();
        Vec2::new(
            (point.x - image.width as f32 * 0.5) * self.zoom + center.x + self.pan.x,
            (point.y - image.height as f32 * 0.5) * self.zoom + center.y + self.pan.y,
        )
    }

    /// Screen-space translation; independent of zoom.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan = self.pan + delta;
    }

    /// Multiplies zoom by `factor` (clamped to the zoom bounds) keeping the image point
    /// under `anchor` fixed on screen.
    pub fn zoom_at(&mut self, anchor: Vec2, factor: f32, canvas: Viewport, image: Viewport) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let anchored = self.screen_to_image(anchor, canvas, image);
        self.zoom = self.clamp_zoom(self.zoom * factor);

        let center = canvas.center();
        self.pan = Vec2::new(
            anchor.x - center.x - (anchored.x - image.width as f32 * 0.5) * self.zoom,
            anchor.y - center.y - (anchored.y - image.height as f32 * 0.5) * self.zoom,
        );
    }

    /// Applies `steps` discrete zoom increments (positive zooms in).
    pub fn zoom_steps_at(&mut self, anchor: Vec2, steps: i32, canvas: Viewport, image: Viewport) {
        if steps == 0 {
            return;
        }
        let factor = ZOOM_STEP_FACTOR.powi(steps);
        self.zoom_at(anchor, factor, canvas, image);
    }

    /// Screen rectangle covered by the image as `(left, top, width, height)`.
    pub fn image_screen_rect(&self, canvas: Viewport, image: Viewport) -> (f32, f32, f32, f32) {
        let origin = self.image_to_screen(Vec2::ZERO, canvas, image);
        (
            origin.x,
            origin.y,
            image.width as f32 * self.zoom,
            image.height as f32 * self.zoom,
        )
    }

    fn clamp_zoom(&self, zoom: f32) -> f32 {
        if !zoom.is_finite() {
            return self.zoom;
        }
        zoom.clamp(self.min_zoom, self.max_zoom)
    }
}
