use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use crate::raster::{PixelBuffer, RasterError};

const DATA_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64,";
const PNG_MIME: &str = "image/png";

#[derive(Debug, Error)]
pub enum DataUriError {
    #[error("image reference is not a data: URI")]
    NotDataUri,
    #[error("data URI is not base64 encoded")]
    NotBase64,
    #[error("data URI has media type '{0}', expected image/*")]
    NotImage(String),
    #[error("data URI payload is not valid base64: {0}")]
    Base64(#[source] base64::DecodeError),
    #[error("data URI payload is not a decodable image: {0}")]
    Image(#[source] RasterError),
}

#[derive(Debug, Error)]
pub enum ImageLoadError {
    #[error("editing unavailable for this image: access to {path} was denied")]
    AccessDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read image {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: RasterError,
    },
}

impl ImageLoadError {
    pub fn is_access_denied(&self) -> bool {
        matches!(self, ImageLoadError::AccessDenied { .. })
    }
}

/// Reads and decodes an image file into RGBA. A permission failure is reported separately
/// from other IO failures so the caller can say editing is unavailable for that image.
pub fn read_image_file(path: &Path) -> Result<PixelBuffer, ImageLoadError> {
    let bytes = fs::read(path).map_err(|source| read_error(path, source))?;
    PixelBuffer::decode(&bytes).map_err(|source| ImageLoadError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

fn read_error(path: &Path, source: io::Error) -> ImageLoadError {
    let path = path.to_path_buf();
    if source.kind() == io::ErrorKind::PermissionDenied {
        ImageLoadError::AccessDenied { path, source }
    } else {
        ImageLoadError::Io { path, source }
    }
}

/// An image known both as its interchange form (a `data:` URI) and as decoded RGBA.
/// The URI text is kept verbatim so exporting an imported asset reproduces it byte for byte.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageAsset {
    data_uri: String,
    buffer: PixelBuffer,
}

impl fmt::Debug for ImageAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageAsset")
            .field("width", &self.buffer.width())
            .field("height", &self.buffer.height())
            .field("uri_len", &self.data_uri.len())
            .finish()
    }
}

impl ImageAsset {
    pub fn from_buffer(buffer: PixelBuffer) -> Result<Self, RasterError> {
        let png = buffer.encode_png()?;
        let data_uri = format!("{DATA_PREFIX}{PNG_MIME}{BASE64_MARKER}{}", STANDARD.encode(png));
        Ok(Self { data_uri, buffer })
    }

    pub fn from_data_uri(data_uri: impl Into<String>) -> Result<Self, DataUriError> {
        let data_uri = data_uri.into();
        let payload = base64_payload(&data_uri)?;
        let bytes = STANDARD.decode(payload).map_err(DataUriError::Base64)?;
        let buffer = PixelBuffer::decode(&bytes).map_err(DataUriError::Image)?;
        Ok(Self { data_uri, buffer })
    }

    pub fn data_uri(&self) -> &str {
        &self.data_uri
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }
}

fn base64_payload(data_uri: &str) -> Result<&str, DataUriError> {
    let rest = data_uri
        .strip_prefix(DATA_PREFIX)
        .ok_or(DataUriError::NotDataUri)?;
    let (media, payload) = rest
        .split_once(BASE64_MARKER)
        .ok_or(DataUriError::NotBase64)?;
    let mime = media.split(';').next().unwrap_or_default();
    if !mime.starts_with("image/") {
        return Err(DataUriError::NotImage(mime.to_string()));
    }
    Ok(payload.trim())
}

impl Serialize for ImageAsset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.data_uri)
    }
}

impl<'de> Deserialize<'de> for ImageAsset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        ImageAsset::from_data_uri(text).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_buffer() -> PixelBuffer {
        PixelBuffer::from_fn(3, 2, |x, y| [x as u8 * 40, y as u8 * 90, 7, 255]).expect("buffer")
    }

    #[test]
    fn buffer_round_trips_through_data_uri() {
        let asset = ImageAsset::from_buffer(sample_buffer()).expect("asset");
        assert!(asset.data_uri().starts_with("data:image/png;base64,"));

        let reloaded = ImageAsset::from_data_uri(asset.data_uri()).expect("reload");
        assert_eq!(reloaded.buffer(), &sample_buffer());
        assert_eq!(reloaded.data_uri(), asset.data_uri());
    }

    #[test]
    fn rejects_non_data_uris() {
        assert!(matches!(
            ImageAsset::from_data_uri("https://example.com/a.png"),
            Err(DataUriError::NotDataUri)
        ));
        assert!(matches!(
            ImageAsset::from_data_uri("data:image/png,plain"),
            Err(DataUriError::NotBase64)
        ));
        assert!(matches!(
            ImageAsset::from_data_uri("data:text/plain;base64,aGVsbG8="),
            Err(DataUriError::NotImage(_))
        ));
        assert!(matches!(
            ImageAsset::from_data_uri("data:image/png;base64,@@@"),
            Err(DataUriError::Base64(_))
        ));
        assert!(matches!(
            ImageAsset::from_data_uri("data:image/png;base64,aGVsbG8="),
            Err(DataUriError::Image(_))
        ));
    }

    #[test]
    fn read_image_file_decodes_png_and_reports_failures() {
        let dir = tempfile::tempdir().expect("tempdir");
        let good = dir.path().join("sheet.png");
        fs::write(&good, sample_buffer().encode_png().expect("png")).expect("write");
        assert_eq!(read_image_file(&good).expect("read"), sample_buffer());

        let garbage = dir.path().join("garbage.png");
        fs::write(&garbage, b"nope").expect("write");
        assert!(matches!(
            read_image_file(&garbage),
            Err(ImageLoadError::Decode { .. })
        ));

        let missing = read_image_file(&dir.path().join("missing.png")).expect_err("missing");
        assert!(matches!(missing, ImageLoadError::Io { .. }));
        assert!(!missing.is_access_denied());
    }

    #[test]
    fn permission_failures_mean_editing_is_unavailable() {
        let path = Path::new("locked.png");
        let denied = read_error(path, io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(denied.is_access_denied());
        assert!(denied
            .to_string()
            .starts_with("editing unavailable for this image"));

        let other = read_error(path, io::Error::from(io::ErrorKind::InvalidData));
        assert!(matches!(other, ImageLoadError::Io { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_file_is_access_denied() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let locked = dir.path().join("locked.png");
        fs::write(&locked, sample_buffer().encode_png().expect("png")).expect("write");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).expect("chmod");

        // Superusers bypass file modes; nothing to observe then.
        if fs::read(&locked).is_ok() {
            return;
        }
        let error = read_image_file(&locked).expect_err("locked");
        assert!(error.is_access_denied());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).expect("chmod");
    }

    #[test]
    fn serializes_as_plain_uri_string() {
        let asset = ImageAsset::from_buffer(sample_buffer()).expect("asset");
        let json = serde_json::to_string(&asset).expect("json");
        assert_eq!(json, format!("\"{}\"", asset.data_uri()));

        let parsed: ImageAsset = serde_json::from_str(&json).expect("parse");
        assert_eq!(parsed, asset);
    }
}
