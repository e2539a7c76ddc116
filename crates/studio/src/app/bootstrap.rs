use std::path::{Path, PathBuf};
use std::sync::Arc;

use sprite_engine::{
    load_world_config, resolve_app_paths, AppPaths, EditorConfig, GameBundle, ImageGenerator,
    LoopConfig, ProceduralGenerator, Scene, SceneHandoff, SceneKey, SpriteEditor, Viewport,
    WorldConfig,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::editor_scene::EditorScene;
use super::persistence::GameSink;
use super::world_scene::WorldScene;
use super::StudioError;

const BLOCKED_TERMS_ENV_VAR: &str = "SPRITECRAFT_BLOCKED_TERMS";

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) editor: Box<dyn Scene>,
    pub(crate) world: Box<dyn Scene>,
    pub(crate) start: SceneKey,
    pub(crate) handoff: Option<SceneHandoff>,
}

/// What the window opens on.
pub(crate) enum Launch {
    Edit {
        image: PathBuf,
        description: String,
        sheet: bool,
    },
    Play(GameBundle),
}

/// Everything resolved from the environment before any window exists.
pub(crate) struct Services {
    pub(crate) paths: AppPaths,
    pub(crate) world_config: WorldConfig,
    pub(crate) generator: Arc<ProceduralGenerator>,
}

pub(crate) fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

pub(crate) fn load_services(world_config_path: Option<&Path>) -> Result<Services, StudioError> {
    let paths = resolve_app_paths()?;
    let world_config = match world_config_path {
        Some(path) => load_world_config(path)?,
        None => WorldConfig::default(),
    };
    let blocked_terms = parse_blocked_terms(std::env::var(BLOCKED_TERMS_ENV_VAR).ok().as_deref());
    info!(
        data_dir = %paths.data_dir.display(),
        store_quota = paths.store_quota,
        blocked_terms = blocked_terms.len(),
        "studio_services_ready"
    );
    let generator = ProceduralGenerator::new(
        world_config.world_width.round().max(1.0) as u32,
        world_config.world_height.round().max(1.0) as u32,
        world_config.ground_y.round().max(0.0) as u32,
    )
    .with_blocked_terms(blocked_terms);

    Ok(Services {
        paths,
        world_config,
        generator: Arc::new(generator),
    })
}

pub(crate) fn build_app(services: &Services, launch: Launch) -> Result<AppWiring, StudioError> {
    info!("=== SpriteCraft Startup ===");
    let config = LoopConfig::default();
    let sink = GameSink::new(&services.paths);
    let mut editor = SpriteEditor::new(
        EditorConfig::default(),
        Viewport::new(config.window_width, config.window_height),
    );

    let (description, start, handoff) = match launch {
        Launch::Edit {
            image,
            description,
            sheet,
        } => {
            editor.load_image_file(&image)?;
            if sheet {
                generate_sheet(&mut editor, services.generator.as_ref(), &description)?;
            }
            (description, SceneKey::Editor, None)
        }
        Launch::Play(bundle) => {
            let handoff = SceneHandoff {
                poses: bundle.poses,
                background: Some(bundle.background),
                description: bundle.description.clone(),
            };
            (bundle.description, SceneKey::World, Some(handoff))
        }
    };

    let generator: Arc<dyn ImageGenerator> = services.generator.clone();
    Ok(AppWiring {
        config,
        editor: Box::new(EditorScene::new(editor, description, sink.clone())),
        world: Box::new(WorldScene::new(services.world_config, generator, sink)),
        start,
        handoff,
    })
}

fn generate_sheet(
    editor: &mut SpriteEditor,
    generator: &dyn ImageGenerator,
    description: &str,
) -> Result<(), StudioError> {
    let Some(reference) = editor.current().cloned() else {
        return Ok(());
    };
    let sheet = generator
        .generate_character_sheet(&reference, description)
        .map_err(StudioError::Sheet)?;
    info!(
        width = sheet.width(),
        height = sheet.height(),
        "character_sheet_generated"
    );
    editor.load_image(sheet);
    Ok(())
}

fn parse_blocked_terms(raw: Option<&str>) -> Vec<String> {
    raw.map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(ToString::to_string)
            .collect::<Vec<_>>()
    })
    .unwrap_or_default()
}
