use std::fmt;

use crate::geom::{Vec2, Viewport};
use crate::raster::{PixelBuffer, StampMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ToolKind {
    #[default]
    Pan,
    Select,
    Draw,
    Erase,
}

impl ToolKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            ToolKind::Pan => "pan",
            ToolKind::Select => "select",
            ToolKind::Draw => "draw",
            ToolKind::Erase => "erase",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Image-space rectangle. Both corners always lie inside `[0, w] x [0, h]` of the image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl SelectionRect {
    /// Bounding box of two image points after clamping both to the image.
    pub fn from_corners(a: Vec2, b: Vec2, image: Viewport) -> Self {
        let a = clamp_to_image(a, image);
        let b = clamp_to_image(b, image);
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.width >= 1.0 && self.height >= 1.0
    }

    /// Integer crop rectangle `(x, y, width, height)`, each component floored.
    pub fn crop_bounds(&self) -> (i64, i64, i64, i64) {
        (
            self.x.floor() as i64,
            self.y.floor() as i64,
            self.width.floor() as i64,
            self.height.floor() as i64,
        )
    }

    pub fn crop(&self, source: &PixelBuffer) -> Option<PixelBuffer> {
        if !self.is_valid() {
            return None;
        }
        let (x, y, width, height) = self.crop_bounds();
        source.crop_rect(x, y, width, height)
    }
}

pub fn clamp_to_image(point: Vec2, image: Viewport) -> Vec2 {
    Vec2::new(
        point.x.clamp(0.0, image.width as f32),
        point.y.clamp(0.0, image.height as f32),
    )
}

/// In-progress pointer interaction. At most one exists at a time.
#[derive(Debug, Clone, Default)]
pub(crate) enum Gesture {
    #[default]
    Idle,
    Panning {
        last: Vec2,
    },
    Selecting {
        anchor: Vec2,
    },
    Stroking {
        mode: StampMode,
        scratch: PixelBuffer,
        stamps: usize,
    },
}

impl Gesture {
    pub(crate) fn is_active(&self) -> bool {
        !matches!(self, Gesture::Idle)
    }

    pub(crate) fn scratch(&self) -> Option<&PixelBuffer> {
        match self {
            Gesture::Stroking { scratch, .. } => Some(scratch),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IMAGE: Viewport = Viewport::new(20, 10);

    #[test]
    fn selection_is_bounding_box_regardless_of_drag_direction() {
        let forward = SelectionRect::from_corners(Vec2::new(2.0, 3.0), Vec2::new(8.5, 7.0), IMAGE);
        let backward = SelectionRect::from_corners(Vec2::new(8.5, 7.0), Vec2::new(2.0, 3.0), IMAGE);
        assert_eq!(forward, backward);
        assert_eq!(
            forward,
            SelectionRect {
                x: 2.0,
                y: 3.0,
                width: 6.5,
                height: 4.0
            }
        );
    }

    #[test]
    fn selection_corners_are_clamped_to_image() {
        let rect = SelectionRect::from_corners(Vec2::new(-5.0, -5.0), Vec2::new(40.0, 4.0), IMAGE);
        assert_eq!(rect.x, 0.0);
        assert_eq!(rect.y, 0.0);
        assert_eq!(rect.width, 20.0);
        assert_eq!(rect.height, 4.0);
    }

    #[test]
    fn degenerate_selection_is_invalid() {
        let click = SelectionRect::from_corners(Vec2::new(3.0, 3.0), Vec2::new(3.4, 9.0), IMAGE);
        assert!(!click.is_valid());
        let outside = SelectionRect::from_corners(Vec2::new(30.0, 1.0), Vec2::new(45.0, 5.0), IMAGE);
        assert!(!outside.is_valid());
    }

    #[test]
    fn crop_bounds_floor_each_component() {
        let rect = SelectionRect {
            x: 1.7,
            y: 2.2,
            width: 3.9,
            height: 1.1,
        };
        assert_eq!(rect.crop_bounds(), (1, 2, 3, 1));
    }
}
