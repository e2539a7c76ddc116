use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod app;
pub mod assets;
pub mod editor;
pub mod geom;
pub mod raster;
pub mod sim;

pub use app::{
    draw_world, run_app, world_hud_lines, AppError, InputAction, InputSnapshot,
    LoopConfig, LoopMetricsSnapshot, PointerEvent, Renderer, Scene, SceneCommand, SceneHandoff,
    SceneKey, WorldProjection,
};
pub use assets::{
    export_game, export_to_string, import_from_str, import_game, read_image_file, DataUriError,
    ExportError, GameBundle, GameStore, GenerationError, ImageAsset, ImageGenerator,
    ImageLoadError, ProceduralGenerator, SavedGame, StoreError, DEFAULT_STORE_QUOTA_BYTES,
};
pub use editor::{
    EditorConfig, EditorError, PoseId, PoseSet, SelectionRect, SpriteEditor, ToolKind,
    POSE_COUNT,
};
pub use geom::{Vec2, Viewport};
pub use raster::{EditHistory, FrameCanvas, PixelBuffer, RasterError, Rgb, ViewTransform};
pub use sim::{
    resolve_sprite, BackgroundService, CharacterInput, CharacterSimulator, CharacterState,
    Facing, RegenResult, RegenWorker, SpriteError, WorldConfig, WorldController, WorldEvent,
};

pub const HOME_ENV_VAR: &str = "SPRITECRAFT_HOME";
pub const STORE_QUOTA_ENV_VAR: &str = "SPRITECRAFT_STORE_QUOTA_BYTES";
const DEFAULT_HOME_DIR: &str = ".spritecraft";
const EXPORTS_DIR: &str = "exports";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub data_dir: PathBuf,
    pub exports_dir: PathBuf,
    pub store_quota: u64,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current directory: {0}")]
    CurrentDir(#[source] std::io::Error),
    #[error("failed to create data directory at {path}: {source}")]
    CreateDataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{var} must be a positive byte count, got '{value}'")]
    InvalidQuota { var: &'static str, value: String },
    #[error("failed to read world config {path}: {source}")]
    ReadWorldConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid world config {path}: {detail}")]
    InvalidWorldConfig { path: PathBuf, detail: String },
}

/// Resolves and creates the data directory (`SPRITECRAFT_HOME`, else `./.spritecraft`) and
/// reads the saved-game quota override.
pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    let data_dir = match read_env(HOME_ENV_VAR)? {
        Some(value) => normalize_path(Path::new(&value)),
        None => env::current_dir()
            .map_err(StartupError::CurrentDir)?
            .join(DEFAULT_HOME_DIR),
    };
    let exports_dir = data_dir.join(EXPORTS_DIR);
    for dir in [&data_dir, &exports_dir] {
        fs::create_dir_all(dir).map_err(|source| StartupError::CreateDataDir {
            path: dir.clone(),
            source,
        })?;
    }

    let store_quota = match read_env(STORE_QUOTA_ENV_VAR)? {
        Some(value) => parse_quota(&value)?,
        None => DEFAULT_STORE_QUOTA_BYTES,
    };

    Ok(AppPaths {
        data_dir,
        exports_dir,
        store_quota,
    })
}

/// Reads a JSON world config. Missing fields keep their defaults; unknown fields are rejected
/// with the offending path in the message.
pub fn load_world_config(path: &Path) -> Result<WorldConfig, StartupError> {
    let raw = fs::read_to_string(path).map_err(|source| StartupError::ReadWorldConfig {
        path: path.to_path_buf(),
        source,
    })?;
    parse_world_config(&raw).map_err(|detail| StartupError::InvalidWorldConfig {
        path: path.to_path_buf(),
        detail,
    })
}

fn parse_world_config(raw: &str) -> Result<WorldConfig, String> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, WorldConfig>(&mut deserializer).map_err(|error| {
        let path = error.path().to_string();
        let source = error.into_inner();
        if path.is_empty() || path == "." {
            source.to_string()
        } else {
            format!("at {path}: {source}")
        }
    })
}

fn read_env(var: &'static str) -> Result<Option<String>, StartupError> {
    match env::var(var) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(source) => Err(StartupError::EnvVar { var, source }),
    }
}

fn parse_quota(value: &str) -> Result<u64, StartupError> {
    match value.trim().parse::<u64>() {
        Ok(quota) if quota > 0 => Ok(quota),
        _ => Err(StartupError::InvalidQuota {
            var: STORE_QUOTA_ENV_VAR,
            value: value.to_string(),
        }),
    }
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_must_be_positive_integer() {
        assert_eq!(parse_quota(" 1024 ").expect("quota"), 1024);
        assert!(matches!(parse_quota("0"), Err(StartupError::InvalidQuota { .. })));
        assert!(matches!(parse_quota("5MB"), Err(StartupError::InvalidQuota { .. })));
    }

    #[test]
    fn world_config_errors_name_the_field() {
        let config = parse_world_config(r#"{"gravity": 0.25, "spawn_x": 10}"#).expect("config");
        assert_eq!(config.gravity, 0.25);
        assert_eq!(config.spawn_x, 10.0);
        assert_eq!(config.run_speed, 6.0);

        let error = parse_world_config(r#"{"jump_power": "high"}"#).expect_err("type error");
        assert!(error.starts_with("at jump_power"), "{error}");
    }

    #[test]
    fn normalize_keeps_missing_paths_verbatim() {
        let missing = Path::new("definitely/not/a/real/dir");
        assert_eq!(normalize_path(missing), missing.to_path_buf());
    }
}
