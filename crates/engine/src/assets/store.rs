use std::io;
use std::path::{Path, PathBuf};

use chrono::{Local, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::editor::PoseSet;

use super::atomic_io::{read_optional, write_atomic};
use super::export::GameBundle;
use super::image_asset::ImageAsset;

pub const STORE_FILE_NAME: &str = "saved_games.json";
pub const DEFAULT_STORE_QUOTA_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(
        "storage limit reached: saving needs {required} bytes but the store allows {quota}; delete some saved games"
    )]
    QuotaExceeded { required: u64, quota: u64 },
    #[error("failed to access saved games at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize saved games: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("saved games file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, StoreError::QuotaExceeded { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedGame {
    pub id: String,
    pub name: String,
    pub pose_set: PoseSet,
    pub background_image: ImageAsset,
    pub description: String,
    pub created_at: String,
}

impl SavedGame {
    pub fn to_bundle(&self) -> GameBundle {
        GameBundle {
            poses: self.pose_set.clone(),
            background: self.background_image.clone(),
            description: self.description.clone(),
        }
    }
}

/// Saved games kept as one JSON array in a single file.
///
/// Reads are forgiving: a missing or unparsable file lists as empty. Writes never replace a
/// file that failed to parse.
#[derive(Debug, Clone)]
pub struct GameStore {
    path: PathBuf,
    quota: u64,
}

impl GameStore {
    pub fn new(data_dir: &Path, quota: u64) -> Self {
        Self {
            path: data_dir.join(STORE_FILE_NAME),
            quota,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn quota(&self) -> u64 {
        self.quota
    }

    pub fn list(&self) -> Vec<SavedGame> {
        match self.load() {
            Ok(games) => games,
            Err(error) => {
                warn!(path = %self.path.display(), error = %error, "saved_games_unreadable");
                Vec::new()
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<SavedGame> {
        self.list().into_iter().find(|game| game.id == id)
    }

    /// Appends a new record. An empty `name` becomes "Game from <local time>".
    pub fn save(
        &self,
        name: &str,
        poses: &PoseSet,
        background: &ImageAsset,
        description: &str,
    ) -> Result<SavedGame, StoreError> {
        let mut games = self.load()?;

        let mut id = Utc::now().timestamp_millis();
        while games.iter().any(|game| game.id == id.to_string()) {
            id += 1;
        }
        let name = match name.trim() {
            "" => format!("Game from {}", Local::now().format("%Y-%m-%d %H:%M:%S")),
            given => given.to_string(),
        };
        let record = SavedGame {
            id: id.to_string(),
            name,
            pose_set: poses.clone(),
            background_image: background.clone(),
            description: description.to_string(),
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        games.push(record.clone());

        self.persist(&games)?;
        info!(id = %record.id, name = %record.name, "saved_game_written");
        Ok(record)
    }

    /// Returns whether a record with `id` existed.
    pub fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut games = self.load()?;
        let before = games.len();
        games.retain(|game| game.id != id);
        if games.len() == before {
            return Ok(false);
        }
        self.persist(&games)?;
        info!(id, "saved_game_deleted");
        Ok(true)
    }

    fn load(&self) -> Result<Vec<SavedGame>, StoreError> {
        let raw = read_optional(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        match raw {
            None => Ok(Vec::new()),
            Some(text) if text.trim().is_empty() => Ok(Vec::new()),
            Some(text) => serde_json::from_str(&text).map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn persist(&self, games: &[SavedGame]) -> Result<(), StoreError> {
        let text = serde_json::to_string(games).map_err(StoreError::Serialize)?;
        let required = text.len() as u64;
        if required > self.quota {
            warn!(required, quota = self.quota, "saved_games_quota_exceeded");
            return Err(StoreError::QuotaExceeded {
                required,
                quota: self.quota,
            });
        }
        write_atomic(&self.path, text.as_bytes()).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}
