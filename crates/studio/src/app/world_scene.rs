use std::cell::Cell;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use sprite_engine::app::hud::draw_panel;
use sprite_engine::{
    draw_world, BackgroundService, CharacterInput, FrameCanvas, GameBundle, ImageAsset,
    ImageGenerator, InputAction, InputSnapshot, RegenWorker, Scene, SceneCommand, SceneHandoff,
    SceneKey, WorldConfig, WorldController, WorldEvent,
};
use tracing::{info, warn};

use super::persistence::GameSink;

const STATUS_TEXT: [u8; 4] = [250, 240, 200, 255];
const STATUS_BACKDROP: [u8; 4] = [30, 24, 12, 255];
const EMPTY_BACKGROUND: [u8; 4] = [12, 12, 16, 255];
const STATUS_SCALE: u32 = 2;
const STATUS_MARGIN: i32 = 8;

type ServiceFactory = Box<dyn Fn() -> Box<dyn BackgroundService>>;

/// Plays the current game. A fresh [`WorldController`] is built on every entry.
pub(crate) struct WorldScene {
    config: WorldConfig,
    services: ServiceFactory,
    sink: GameSink,
    world: Option<WorldController>,
    // Background and description of level one, which is what saves and exports capture.
    initial_background: Option<ImageAsset>,
    initial_description: String,
    status: Option<String>,
    sprite_error_logged: Cell<bool>,
}

impl WorldScene {
    pub(crate) fn new(
        config: WorldConfig,
        generator: Arc<dyn ImageGenerator>,
        sink: GameSink,
    ) -> Self {
        let services: ServiceFactory =
            Box::new(move || Box::new(RegenWorker::new(Arc::clone(&generator))));
        Self::with_services(config, services, sink)
    }

    fn with_services(config: WorldConfig, services: ServiceFactory, sink: GameSink) -> Self {
        Self {
            config,
            services,
            sink,
            world: None,
            initial_background: None,
            initial_description: String::new(),
            status: None,
            sprite_error_logged: Cell::new(false),
        }
    }

    fn handoff(&self, world: &WorldController) -> SceneHandoff {
        SceneHandoff {
            poses: world.poses().clone(),
            background: self.initial_background.clone(),
            description: self.initial_description.clone(),
        }
    }

    fn bundle(&self, world: &WorldController) -> Option<GameBundle> {
        Some(GameBundle {
            poses: world.poses().clone(),
            background: self.initial_background.clone()?,
            description: self.initial_description.clone(),
        })
    }

    fn persist(&mut self, export: bool) {
        let Some(world) = self.world.as_ref() else {
            return;
        };
        self.status = Some(match self.bundle(world) {
            Some(bundle) if export => self.sink.export(&bundle),
            Some(bundle) => self.sink.save(&bundle),
            None => "WAIT FOR THE WORLD TO GENERATE".to_string(),
        });
    }

    fn observe(&mut self, events: &[WorldEvent]) {
        for event in events {
            match event {
                WorldEvent::WorldGenerated => {
                    if let Some(world) = self.world.as_ref() {
                        self.initial_background = world.background().cloned();
                        self.initial_description = world.description().to_string();
                    }
                    self.status = None;
                }
                WorldEvent::KeyCollected => self.status = Some("KEY FOUND!".to_string()),
                WorldEvent::TransitionCompleted { level } => {
                    self.status = Some(format!("WELCOME TO LEVEL {level}"));
                }
                WorldEvent::TransitionStarted { .. }
                | WorldEvent::TransitionFailed { .. }
                | WorldEvent::WorldGenerationFailed { .. } => self.status = None,
            }
        }
    }
}

pub(crate) fn character_input(input: &InputSnapshot) -> CharacterInput {
    CharacterInput {
        left: input.is_down(InputAction::MoveLeft),
        right: input.is_down(InputAction::MoveRight),
        run: input.is_down(InputAction::Run),
        down: input.is_down(InputAction::Crouch),
        jump_pressed: input.pressed(InputAction::Jump),
        toggle_sit_pressed: input.pressed(InputAction::ToggleSit),
    }
}

fn session_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}

impl Scene for WorldScene {
    fn enter(&mut self, handoff: Option<SceneHandoff>) {
        let Some(handoff) = handoff else {
            warn!("world_entered_without_game");
            return;
        };
        self.initial_background = handoff.background.clone();
        self.initial_description = handoff.description.clone();
        self.status = None;
        self.sprite_error_logged.set(false);

        let needs_background = handoff.background.is_none();
        let mut world = WorldController::new(
            self.config,
            handoff.poses,
            handoff.background,
            handoff.description.clone(),
            (self.services)(),
            session_seed(),
        );
        if needs_background {
            world.request_initial_world(handoff.description);
        }
        info!(
            poses = world.poses().len(),
            generating = world.is_generating(),
            "world_entered"
        );
        self.world = Some(world);
    }

    fn update(&mut self, input: &InputSnapshot) -> SceneCommand {
        if input.pressed(InputAction::Quit) {
            return SceneCommand::Quit;
        }
        if input.pressed(InputAction::SwitchScene) {
            return match self.world.as_ref() {
                Some(world) => SceneCommand::SwitchWith(SceneKey::Editor, self.handoff(world)),
                None => SceneCommand::SwitchTo(SceneKey::Editor),
            };
        }
        if input.pressed(InputAction::SaveGame) {
            self.persist(false);
        }
        if input.pressed(InputAction::ExportGame) {
            self.persist(true);
        }

        let Some(world) = self.world.as_mut() else {
            return SceneCommand::None;
        };
        let events = world.tick(character_input(input));
        self.observe(&events);
        SceneCommand::None
    }

    fn render(&self, canvas: &mut FrameCanvas<'_>) {
        let Some(world) = self.world.as_ref() else {
            canvas.clear(EMPTY_BACKGROUND);
            return;
        };
        if let Err(error) = draw_world(canvas, world) {
            if !self.sprite_error_logged.replace(true) {
                warn!(error = %error, "sprite_unavailable");
            }
        }
        if let Some(status) = &self.status {
            let top = canvas.height() as i32 - STATUS_MARGIN - 11 * STATUS_SCALE as i32;
            draw_panel(
                canvas,
                STATUS_MARGIN,
                top,
                STATUS_SCALE,
                std::slice::from_ref(status),
                STATUS_TEXT,
                STATUS_BACKDROP,
            );
        }
    }

    fn exit(&mut self) {
        // Dropping the controller drops its worker; a result still in flight is discarded.
        if let Some(world) = self.world.take() {
            info!(level = world.level(), ticks = world.tick_count(), "world_exited");
        }
    }

    fn title(&self) -> Option<String> {
        let world = self.world.as_ref()?;
        Some(format!("SpriteCraft - level {}", world.level()))
    }

    fn is_paused(&self) -> bool {
        self.world
            .as_ref()
            .is_some_and(WorldController::is_transitioning)
    }
}
