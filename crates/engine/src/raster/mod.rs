mod canvas;
mod chroma_key;
mod history;
mod pixel_buffer;
mod view;

pub use canvas::{BlitRect, FrameCanvas};
pub use chroma_key::{remove_background_local, DEFAULT_KEY_TOLERANCE};
pub use history::EditHistory;
pub use pixel_buffer::{
    ColorParseError, PixelBuffer, RasterError, Rgb, StampMode, BYTES_PER_PIXEL, TRANSPARENT,
};
pub use view::{ViewTransform, ZOOM_DEFAULT, ZOOM_MAX, ZOOM_MIN, ZOOM_STEP_FACTOR};
