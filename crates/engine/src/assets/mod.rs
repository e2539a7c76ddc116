mod atomic_io;
mod export;
mod generator;
mod image_asset;
mod store;

pub use export::{
    export_game, export_to_string, import_from_str, import_game, ExportError, GameBundle,
};
pub use generator::{GenerationError, ImageGenerator, ProceduralGenerator};
pub use image_asset::{read_image_file, DataUriError, ImageAsset, ImageLoadError};
pub use store::{
    GameStore, SavedGame, StoreError, DEFAULT_STORE_QUOTA_BYTES, STORE_FILE_NAME,
};
