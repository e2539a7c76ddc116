use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use tracing::warn;
use winit::window::Window;

use crate::geom::Viewport;
use crate::raster::FrameCanvas;

/// Window-sized RGBA framebuffer presented through `pixels`. One buffer pixel per window pixel.
pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
}

impl Renderer {
    pub fn new(window: Arc<Window>) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport::new(size.width, size.height),
        })
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.viewport = Viewport::new(width, height);
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width.max(1), height.max(1), window);
        Pixels::new(width.max(1), height.max(1), surface)
    }

    /// Lets `draw` fill the frame, then presents it.
    pub fn render_frame<F>(&mut self, draw: F) -> Result<(), Error>
    where
        F: FnOnce(&mut FrameCanvas<'_>),
    {
        if self.viewport.is_empty() {
            return Ok(());
        }
        let Viewport { width, height } = self.viewport;
        match FrameCanvas::new(self.pixels.frame_mut(), width, height) {
            Some(mut canvas) => draw(&mut canvas),
            None => {
                warn!(width, height, "frame_size_mismatch");
                return Ok(());
            }
        }
        self.pixels.render()
    }
}
