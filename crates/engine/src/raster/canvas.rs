use super::{PixelBuffer, BYTES_PER_PIXEL};

/// Mutable view over an RGBA8 frame (typically `Pixels::frame_mut`). Every draw call clips
/// against the frame bounds, so callers can pass arbitrary screen coordinates.
pub struct FrameCanvas<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
}

/// Destination rectangle for a scaled blit, in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlitRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl<'a> FrameCanvas<'a> {
    /// Returns `None` when `frame` is too short for `width * height` pixels.
    pub fn new(frame: &'a mut [u8], width: u32, height: u32) -> Option<Self> {
        let needed = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(BYTES_PER_PIXEL)?;
        if frame.len() < needed {
            return None;
        }
        Some(Self {
            frame,
            width,
            height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn clear(&mut self, color: [u8; 4]) {
        for chunk in self.frame.chunks_exact_mut(BYTES_PER_PIXEL) {
            chunk.copy_from_slice(&color);
        }
    }

    pub fn write_pixel_clipped(&mut self, x: i32, y: i32, color: [u8; 4]) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let offset = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        self.frame[offset..offset + BYTES_PER_PIXEL].copy_from_slice(&color);
    }

    pub fn fill_rect(&mut self, left: i32, top: i32, width: i32, height: i32, color: [u8; 4]) {
        let (x0, x1) = clip_span(left, width, self.width);
        let (y0, y1) = clip_span(top, height, self.height);
        for y in y0..y1 {
            for x in x0..x1 {
                self.write_pixel_clipped(x, y, color);
            }
        }
    }

    pub fn rect_outline(&mut self, left: i32, top: i32, width: i32, height: i32, color: [u8; 4]) {
        self.rect_outline_dashed(left, top, width, height, color, 0);
    }

    /// Outline with `dash` pixels on, `dash` pixels off. A dash of zero draws a solid line.
    pub fn rect_outline_dashed(
        &mut self,
        left: i32,
        top: i32,
        width: i32,
        height: i32,
        color: [u8; 4],
        dash: u32,
    ) {
        if width <= 0 || height <= 0 {
            return;
        }
        let right = left + width - 1;
        let bottom = top + height - 1;
        let on = |step: i32| dash == 0 || (step as u32 / dash) % 2 == 0;

        for (step, x) in (left..=right).enumerate() {
            if on(step as i32) {
                self.write_pixel_clipped(x, top, color);
                self.write_pixel_clipped(x, bottom, color);
            }
        }
        for (step, y) in (top..=bottom).enumerate() {
            if on(step as i32) {
                self.write_pixel_clipped(left, y, color);
                self.write_pixel_clipped(right, y, color);
            }
        }
    }

    /// Two-tone checkerboard inside the rectangle, cells anchored at the rectangle origin.
    pub fn checkerboard(
        &mut self,
        left: i32,
        top: i32,
        width: i32,
        height: i32,
        cell: u32,
        colors: [[u8; 4]; 2],
    ) {
        let cell = cell.max(1) as i32;
        let (x0, x1) = clip_span(left, width, self.width);
        let (y0, y1) = clip_span(top, height, self.height);
        for y in y0..y1 {
            let row = (y - top).div_euclid(cell);
            for x in x0..x1 {
                let col = (x - left).div_euclid(cell);
                let color = colors[((row + col) & 1) as usize];
                self.write_pixel_clipped(x, y, color);
            }
        }
    }

    /// Nearest-neighbour scaled copy of `source` into `dest`. Fully transparent source pixels
    /// are skipped; partial alpha is blended over the frame. `mirror` flips horizontally.
    pub fn blit_scaled(&mut self, source: &PixelBuffer, dest: BlitRect, mirror: bool) {
        let finite = dest.width.is_finite() && dest.height.is_finite();
        if !finite || dest.width <= 0.0 || dest.height <= 0.0 {
            return;
        }
        let left = dest.left.floor() as i32;
        let top = dest.top.floor() as i32;
        let right = (dest.left + dest.width).ceil() as i32;
        let bottom = (dest.top + dest.height).ceil() as i32;
        let draw_left = left.max(0);
        let draw_top = top.max(0);
        let draw_right = right.min(self.width as i32);
        let draw_bottom = bottom.min(self.height as i32);
        if draw_left >= draw_right || draw_top >= draw_bottom {
            return;
        }

        let scale_x = source.width() as f32 / dest.width;
        let scale_y = source.height() as f32 / dest.height;
        let max_x = source.width() - 1;
        let max_y = source.height() - 1;

        for out_y in draw_top..draw_bottom {
            let local_y = (out_y as f32 + 0.5 - dest.top) * scale_y;
            if local_y < 0.0 {
                continue;
            }
            let src_y = (local_y.floor() as u32).min(max_y);
            for out_x in draw_left..draw_right {
                let local_x = (out_x as f32 + 0.5 - dest.left) * scale_x;
                if local_x < 0.0 {
                    continue;
                }
                let mut src_x = (local_x.floor() as u32).min(max_x);
                if mirror {
                    src_x = max_x - src_x;
                }
                let Some(rgba) = source.pixel(src_x, src_y) else {
                    continue;
                };
                match rgba[3] {
                    0 => {}
                    255 => self.write_pixel_clipped(out_x, out_y, rgba),
                    _ => self.blend_pixel(out_x, out_y, rgba),
                }
            }
        }
    }

    fn blend_pixel(&mut self, x: i32, y: i32, rgba: [u8; 4]) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let offset = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        let alpha = u16::from(rgba[3]);
        for channel in 0..3 {
            let dst = u16::from(self.frame[offset + channel]);
            let src = u16::from(rgba[channel]);
            self.frame[offset + channel] = ((src * alpha + dst * (255 - alpha)) / 255) as u8;
        }
        self.frame[offset + 3] = 255;
    }
}

fn clip_span(start: i32, len: i32, limit: u32) -> (i32, i32) {
    if len <= 0 {
        return (0, 0);
    }
    let end = start.saturating_add(len).min(limit as i32);
    (start.max(0), end)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: [u8; 4] = [255, 0, 0, 255];
    const BG: [u8; 4] = [10, 10, 10, 255];

    fn frame(width: u32, height: u32) -> Vec<u8> {
        vec![0; (width * height) as usize * BYTES_PER_PIXEL]
    }

    fn read(frame: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
        let offset = ((y * width + x) as usize) * BYTES_PER_PIXEL;
        let mut out = [0; 4];
        out.copy_from_slice(&frame[offset..offset + 4]);
        out
    }

    #[test]
    fn short_frame_is_rejected() {
        let mut data = vec![0; 10];
        assert!(FrameCanvas::new(&mut data, 4, 4).is_none());
    }

    #[test]
    fn drawing_outside_frame_is_clipped_without_panic() {
        let mut data = frame(4, 4);
        let mut canvas = FrameCanvas::new(&mut data, 4, 4).expect("canvas");
        canvas.fill_rect(-10, -10, 12, 12, RED);
        canvas.rect_outline(-1, -1, 100, 100, RED);
        canvas.write_pixel_clipped(4, 0, RED);
        assert_eq!(read(&data, 4, 1, 1), RED);
        assert_eq!(read(&data, 4, 2, 2), [0; 4]);
    }

    #[test]
    fn checkerboard_alternates_cells() {
        let mut data = frame(4, 2);
        let mut canvas = FrameCanvas::new(&mut data, 4, 2).expect("canvas");
        canvas.checkerboard(0, 0, 4, 2, 2, [RED, BG]);
        assert_eq!(read(&data, 4, 0, 0), RED);
        assert_eq!(read(&data, 4, 2, 0), BG);
        assert_eq!(read(&data, 4, 3, 1), BG);
    }

    #[test]
    fn blit_scales_and_skips_transparent_pixels() {
        let sprite = PixelBuffer::from_fn(2, 1, |x, _| if x == 0 { RED } else { [0; 4] })
            .expect("sprite");
        let mut data = frame(4, 2);
        let mut canvas = FrameCanvas::new(&mut data, 4, 2).expect("canvas");
        canvas.clear(BG);
        canvas.blit_scaled(
            &sprite,
            BlitRect {
                left: 0.0,
                top: 0.0,
                width: 4.0,
                height: 2.0,
            },
            false,
        );
        assert_eq!(read(&data, 4, 0, 1), RED);
        assert_eq!(read(&data, 4, 1, 0), RED);
        assert_eq!(read(&data, 4, 2, 0), BG);
    }

    #[test]
    fn mirrored_blit_flips_columns() {
        let sprite = PixelBuffer::from_fn(2, 1, |x, _| if x == 0 { RED } else { [0; 4] })
            .expect("sprite");
        let mut data = frame(2, 1);
        let mut canvas = FrameCanvas::new(&mut data, 2, 1).expect("canvas");
        canvas.blit_scaled(
            &sprite,
            BlitRect {
                left: 0.0,
                top: 0.0,
                width: 2.0,
                height: 1.0,
            },
            true,
        );
        assert_eq!(read(&data, 2, 0, 0), [0; 4]);
        assert_eq!(read(&data, 2, 1, 0), RED);
    }

    #[test]
    fn dashed_outline_leaves_gaps() {
        let mut data = frame(8, 3);
        let mut canvas = FrameCanvas::new(&mut data, 8, 3).expect("canvas");
        canvas.rect_outline_dashed(0, 0, 8, 3, RED, 2);
        assert_eq!(read(&data, 8, 0, 0), RED);
        assert_eq!(read(&data, 8, 1, 0), RED);
        assert_eq!(read(&data, 8, 2, 0), [0; 4]);
        assert_eq!(read(&data, 8, 4, 0), RED);
    }
}
