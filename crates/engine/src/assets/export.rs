use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::editor::{PoseId, PoseSet};

use super::atomic_io::write_atomic;
use super::image_asset::{DataUriError, ImageAsset};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to access export file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid export document at {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("export field {field} does not hold an image data URI: {source}")]
    InvalidDataUri {
        field: String,
        #[source]
        source: DataUriError,
    },
    #[error("failed to serialize export document: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Everything needed to play a game: the poses, the first background and the prompt that
/// produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameBundle {
    pub poses: PoseSet,
    pub background: ImageAsset,
    pub description: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportDocumentRef<'a> {
    sprites: &'a PoseSet,
    world_background: &'a ImageAsset,
    initial_world_description: &'a str,
}

// Data URIs stay as text here so a bad image is reported with the field it came from.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExportDocument {
    sprites: BTreeMap<PoseId, String>,
    world_background: String,
    initial_world_description: String,
}

pub fn export_to_string(bundle: &GameBundle) -> Result<String, ExportError> {
    let document = ExportDocumentRef {
        sprites: &bundle.poses,
        world_background: &bundle.background,
        initial_world_description: &bundle.description,
    };
    serde_json::to_string_pretty(&document).map_err(ExportError::Serialize)
}

pub fn import_from_str(raw: &str) -> Result<GameBundle, ExportError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let document = serde_path_to_error::deserialize::<_, ExportDocument>(&mut deserializer)
        .map_err(|error| {
            let path = error.path().to_string();
            ExportError::Parse {
                path,
                source: error.into_inner(),
            }
        })?;

    let mut poses = PoseSet::new();
    for (pose, data_uri) in document.sprites {
        let asset = ImageAsset::from_data_uri(data_uri).map_err(|source| {
            ExportError::InvalidDataUri {
                field: format!("sprites.{pose}"),
                source,
            }
        })?;
        poses.insert(pose, asset);
    }
    let background = ImageAsset::from_data_uri(document.world_background).map_err(|source| {
        ExportError::InvalidDataUri {
            field: "worldBackground".to_string(),
            source,
        }
    })?;

    Ok(GameBundle {
        poses,
        background,
        description: document.initial_world_description,
    })
}

pub fn export_game(path: &Path, bundle: &GameBundle) -> Result<(), ExportError> {
    let text = export_to_string(bundle)?;
    write_atomic(path, text.as_bytes()).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), poses = bundle.poses.len(), "game_exported");
    Ok(())
}

pub fn import_game(path: &Path) -> Result<GameBundle, ExportError> {
    let raw = fs::read_to_string(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let bundle = import_from_str(&raw)?;
    info!(path = %path.display(), poses = bundle.poses.len(), "game_imported");
    Ok(bundle)
}
