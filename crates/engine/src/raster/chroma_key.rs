use super::{PixelBuffer, BYTES_PER_PIXEL, TRANSPARENT};

pub const DEFAULT_KEY_TOLERANCE: f32 = 30.0;

/// Treats the top-left pixel's colour as background and clears every pixel whose RGB
/// Euclidean distance to it is within `tolerance`. Alpha is ignored when comparing.
pub fn remove_background_local(source: &PixelBuffer, tolerance: f32) -> PixelBuffer {
    let mut out = source.clone();
    let Some(key) = source.pixel(0, 0) else {
        return out;
    };
    let tolerance_sq = tolerance.max(0.0).powi(2);

    for chunk in out.pixels_mut().chunks_exact_mut(BYTES_PER_PIXEL) {
        if rgb_distance_sq(chunk, &key) <= tolerance_sq {
            chunk.copy_from_slice(&TRANSPARENT);
        }
    }
    out
}

fn rgb_distance_sq(a: &[u8], b: &[u8; 4]) -> f32 {
    (0..3)
        .map(|channel| {
            let delta = f32::from(a[channel]) - f32::from(b[channel]);
            delta * delta
        })
        .sum()
}
