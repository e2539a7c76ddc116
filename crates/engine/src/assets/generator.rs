use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::raster::{remove_background_local, PixelBuffer, RasterError, DEFAULT_KEY_TOLERANCE};

const BLOCK_PX: u32 = 4;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("Generation blocked: {reason}")]
    Blocked { reason: String },
    #[error("generation failed: {reason}")]
    Failed { reason: String },
}

impl GenerationError {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    pub fn is_content_blocked(&self) -> bool {
        matches!(self, Self::Blocked { .. })
    }

    /// Guidance for the person who triggered the request.
    pub fn user_message(&self) -> String {
        match self {
            Self::Blocked { .. } => {
                "The image or description triggered safety filters. Try a different image or description."
                    .to_string()
            }
            Self::Failed { reason } => reason.clone(),
        }
    }
}

impl From<RasterError> for GenerationError {
    fn from(error: RasterError) -> Self {
        Self::failed(error.to_string())
    }
}

/// The image-generation backend. Every call is single-shot and may fail.
pub trait ImageGenerator: Send + Sync {
    fn generate_character_sheet(
        &self,
        reference: &PixelBuffer,
        description: &str,
    ) -> Result<PixelBuffer, GenerationError>;

    fn generate_background(&self, description: &str) -> Result<PixelBuffer, GenerationError>;

    fn remove_background(&self, image: &PixelBuffer) -> Result<PixelBuffer, GenerationError>;
}

/// Offline generator. Backgrounds are a pure function of the description text.
#[derive(Debug, Clone)]
pub struct ProceduralGenerator {
    width: u32,
    height: u32,
    ground_y: u32,
    blocked_terms: Vec<String>,
}

impl ProceduralGenerator {
    pub fn new(width: u32, height: u32, ground_y: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            ground_y: ground_y.min(height),
            blocked_terms: Vec::new(),
        }
    }

    /// Descriptions containing any of `terms` (case-insensitive) are rejected as blocked.
    pub fn with_blocked_terms<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blocked_terms = terms
            .into_iter()
            .map(|term| term.into().to_lowercase())
            .filter(|term| !term.is_empty())
            .collect();
        self
    }

    fn check_description(&self, description: &str) -> Result<(), GenerationError> {
        if description.trim().is_empty() {
            return Err(GenerationError::failed("description is empty"));
        }
        let lowered = description.to_lowercase();
        if let Some(term) = self.blocked_terms.iter().find(|term| lowered.contains(term.as_str())) {
            return Err(GenerationError::Blocked {
                reason: format!("description mentions '{term}'"),
            });
        }
        Ok(())
    }
}

impl ImageGenerator for ProceduralGenerator {
    fn generate_character_sheet(
        &self,
        reference: &PixelBuffer,
        description: &str,
    ) -> Result<PixelBuffer, GenerationError> {
        self.check_description(description)?;
        Ok(remove_background_local(reference, DEFAULT_KEY_TOLERANCE))
    }

    fn generate_background(&self, description: &str) -> Result<PixelBuffer, GenerationError> {
        self.check_description(description)?;
        let palette = Palette::from_description(description);
        let ground_y = self.ground_y;
        let height = self.height;

        let blocks_wide = self.width.div_ceil(BLOCK_PX) as usize;
        let hill_tops: Vec<u32> = (0..blocks_wide)
            .map(|block| palette.hill_top(block, ground_y))
            .collect();

        let buffer = PixelBuffer::from_fn(self.width, height, |x, y| {
            if y >= ground_y {
                let depth = (y - ground_y) / BLOCK_PX;
                return if depth % 3 == 0 {
                    palette.ground_light
                } else {
                    palette.ground
                };
            }
            let block_y = y - y % BLOCK_PX;
            if block_y >= hill_tops[(x / BLOCK_PX) as usize] {
                return palette.hill;
            }
            let t = block_y as f32 / ground_y.max(1) as f32;
            lerp_rgba(palette.sky_top, palette.sky_bottom, t)
        })?;
        Ok(buffer)
    }

    fn remove_background(&self, image: &PixelBuffer) -> Result<PixelBuffer, GenerationError> {
        Ok(remove_background_local(image, DEFAULT_KEY_TOLERANCE))
    }
}

struct Palette {
    sky_top: [u8; 4],
    sky_bottom: [u8; 4],
    hill: [u8; 4],
    ground: [u8; 4],
    ground_light: [u8; 4],
    phases: [f32; 3],
    amplitude: f32,
}

impl Palette {
    fn from_description(description: &str) -> Self {
        let digest: [u8; 32] = Sha256::digest(description.trim().as_bytes()).into();
        let mut rng = StdRng::from_seed(digest);
        let mut color = |low: u8, high: u8| {
            [
                rng.random_range(low..=high),
                rng.random_range(low..=high),
                rng.random_range(low..=high),
                255,
            ]
        };
        let sky_top = color(20, 120);
        let sky_bottom = color(120, 240);
        let hill = color(30, 140);
        let ground = color(60, 150);
        let ground_light = [
            ground[0].saturating_add(24),
            ground[1].saturating_add(24),
            ground[2].saturating_add(24),
            255,
        ];
        let phases = [
            rng.random_range(0.0..std::f32::consts::TAU),
            rng.random_range(0.0..std::f32::consts::TAU),
            rng.random_range(0.0..std::f32::consts::TAU),
        ];
        let amplitude = rng.random_range(0.15..0.45);
        Self {
            sky_top,
            sky_bottom,
            hill,
            ground,
            ground_light,
            phases,
            amplitude,
        }
    }

    fn hill_top(&self, block: usize, ground_y: u32) -> u32 {
        let x = block as f32;
        let wave = (x * 0.05 + self.phases[0]).sin() * 0.5
            + (x * 0.13 + self.phases[1]).sin() * 0.3
            + (x * 0.31 + self.phases[2]).sin() * 0.2;
        let rise = (wave * 0.5 + 0.5) * self.amplitude * ground_y as f32;
        let top = (ground_y as f32 - rise).max(0.0) as u32;
        top - top % BLOCK_PX
    }
}

fn lerp_rgba(from: [u8; 4], to: [u8; 4], t: f32) -> [u8; 4] {
    let t = t.clamp(0.0, 1.0);
    let channel = |a: u8, b: u8| (f32::from(a) + (f32::from(b) - f32::from(a)) * t).round() as u8;
    [
        channel(from[0], to[0]),
        channel(from[1], to[1]),
        channel(from[2], to[2]),
        255,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> ProceduralGenerator {
        ProceduralGenerator::new(80, 40, 30).with_blocked_terms(["Forbidden"])
    }

    #[test]
    fn backgrounds_are_deterministic_per_description() {
        let first = generator().generate_background("mossy caves").expect("bg");
        let again = generator().generate_background("mossy caves").expect("bg");
        let other = generator().generate_background("desert dunes").expect("bg");

        assert_eq!(first, again);
        assert_ne!(first, other);
        assert_eq!((first.width(), first.height()), (80, 40));
        assert_eq!(first.pixel(0, 0).map(|p| p[3]), Some(255));
    }

    #[test]
    fn ground_band_starts_at_ground_line() {
        let background = generator().generate_background("mossy caves").expect("bg");
        let ground = background.pixel(10, 34).expect("pixel");
        let ground_row_start = background.pixel(10, 30).expect("pixel");
        assert_ne!(ground, ground_row_start);
        assert_eq!(background.pixel(50, 34), Some(ground));
    }

    #[test]
    fn empty_description_fails_and_blocked_terms_are_rejected() {
        let err = generator().generate_background("   ").expect_err("empty");
        assert!(!err.is_content_blocked());

        let err = generator()
            .generate_background("a forbidden temple")
            .expect_err("blocked");
        assert!(err.is_content_blocked());
        assert!(err.user_message().contains("safety filters"));
    }

    #[test]
    fn character_sheet_keys_out_reference_background() {
        let reference = PixelBuffer::from_fn(4, 4, |x, y| {
            if x == 2 && y == 2 {
                [200, 0, 0, 255]
            } else {
                [0, 255, 0, 255]
            }
        })
        .expect("reference");
        let sheet = generator()
            .generate_character_sheet(&reference, "a knight")
            .expect("sheet");
        assert_eq!(sheet.pixel(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(sheet.pixel(2, 2), Some([200, 0, 0, 255]));
    }
}
