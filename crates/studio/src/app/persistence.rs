use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use sprite_engine::{export_game, AppPaths, GameBundle, GameStore};
use tracing::warn;

/// Where F5 saves and F6 exports land. Shared by both scenes.
#[derive(Debug, Clone)]
pub(crate) struct GameSink {
    store: GameStore,
    exports_dir: PathBuf,
}

impl GameSink {
    pub(crate) fn new(paths: &AppPaths) -> Self {
        Self::with_dirs(&paths.data_dir, paths.exports_dir.clone(), paths.store_quota)
    }

    pub(crate) fn with_dirs(data_dir: &Path, exports_dir: PathBuf, quota: u64) -> Self {
        Self {
            store: GameStore::new(data_dir, quota),
            exports_dir,
        }
    }

    /// Saves under a generated name and returns a one-line status for the HUD.
    pub(crate) fn save(&self, bundle: &GameBundle) -> String {
        match self.store.save(
            "",
            &bundle.poses,
            &bundle.background,
            &bundle.description,
        ) {
            Ok(record) => format!("SAVED: {}", record.name),
            Err(error) if error.is_quota_exceeded() => {
                warn!(error = %error, "save_game_failed");
                "STORAGE FULL - DELETE OLD SAVES".to_string()
            }
            Err(error) => {
                warn!(error = %error, "save_game_failed");
                "SAVE FAILED - SEE LOG".to_string()
            }
        }
    }

    pub(crate) fn export(&self, bundle: &GameBundle) -> String {
        let path = self.export_path();
        match export_game(&path, bundle) {
            Ok(()) => format!("EXPORTED: {}", file_name(&path)),
            Err(error) => {
                warn!(error = %error, "export_game_failed");
                "EXPORT FAILED - SEE LOG".to_string()
            }
        }
    }

    fn export_path(&self) -> PathBuf {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis())
            .unwrap_or_default();
        let mut path = self.exports_dir.join(format!("game-{millis}.json"));
        let mut suffix = 1;
        while path.exists() {
            path = self.exports_dir.join(format!("game-{millis}-{suffix}.json"));
            suffix += 1;
        }
        path
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprite_engine::{import_game, ImageAsset, PixelBuffer, PoseId, PoseSet};

    fn bundle() -> GameBundle {
        let asset = ImageAsset::from_buffer(PixelBuffer::new_transparent(2, 2).expect("buffer"))
            .expect("asset");
        let poses: PoseSet = PoseId::ALL.iter().map(|pose| (*pose, asset.clone())).collect();
        GameBundle {
            poses,
            background: asset,
            description: "a quiet beach".to_string(),
        }
    }

    #[test]
    fn save_reports_the_generated_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sink = GameSink::with_dirs(dir.path(), dir.path().join("exports"), 1024 * 1024);

        let status = sink.save(&bundle());
        assert!(status.starts_with("SAVED: Game from "), "{status}");
        assert_eq!(sink.store.list().len(), 1);
    }

    #[test]
    fn save_over_quota_reports_storage_full() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sink = GameSink::with_dirs(dir.path(), dir.path().join("exports"), 16);

        assert_eq!(sink.save(&bundle()), "STORAGE FULL - DELETE OLD SAVES");
        assert!(sink.store.list().is_empty());
    }

    #[test]
    fn exports_never_overwrite_each_other() {
        let dir = tempfile::tempdir().expect("tempdir");
        let exports = dir.path().join("exports");
        let sink = GameSink::with_dirs(dir.path(), exports.clone(), 1024 * 1024);

        assert!(sink.export(&bundle()).starts_with("EXPORTED: game-"));
        assert!(sink.export(&bundle()).starts_with("EXPORTED: game-"));

        let files: Vec<_> = std::fs::read_dir(&exports)
            .expect("exports dir")
            .map(|entry| entry.expect("entry").path())
            .collect();
        assert_eq!(files.len(), 2);
        for path in files {
            assert_eq!(import_game(&path).expect("import"), bundle());
        }
    }
}
