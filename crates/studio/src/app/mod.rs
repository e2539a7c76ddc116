mod bootstrap;
mod editor_scene;
mod persistence;
mod saves;
mod world_scene;

use std::io;

use sprite_engine::{
    import_game, run_app, AppError, EditorError, ExportError, GameStore, GenerationError,
    StartupError, StoreError,
};
use thiserror::Error;

use crate::cli::{Cli, Command};

pub(crate) use bootstrap::init_tracing;
use bootstrap::{build_app, load_services, Launch};

#[derive(Debug, Error)]
pub(crate) enum StudioError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Editor(#[from] EditorError),
    #[error("character sheet generation failed: {0}")]
    Sheet(#[source] GenerationError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    App(#[from] AppError),
    #[error("no saved game with id {id}")]
    SavedGameNotFound { id: String },
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

pub(crate) fn run(cli: Cli) -> Result<(), StudioError> {
    let services = load_services(cli.world_config.as_deref())?;
    let launch = match cli.command {
        Command::Edit {
            image,
            description,
            sheet,
        } => Launch::Edit {
            image,
            description,
            sheet,
        },
        Command::Play { export } => Launch::Play(import_game(&export)?),
        Command::Saves { command } => {
            let store = GameStore::new(&services.paths.data_dir, services.paths.store_quota);
            let mut stdout = io::stdout().lock();
            match saves::run_saves(&store, command, &mut stdout)? {
                Some(bundle) => Launch::Play(bundle),
                None => return Ok(()),
            }
        }
    };

    let app = build_app(&services, launch)?;
    run_app(app.config, app.editor, app.world, app.start, app.handoff)?;
    Ok(())
}
