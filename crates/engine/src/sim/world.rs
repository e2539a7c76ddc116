use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};

use crate::assets::{GenerationError, ImageAsset};
use crate::editor::PoseSet;
use crate::geom::Vec2;

use super::animation::{resolve_sprite, ResolvedSprite, SpriteError};
use super::character::{CharacterInput, CharacterSimulator, Facing, WorldConfig};
use super::regen::BackgroundService;

pub const FIRST_LEVEL: u32 = 1;

/// The level's key. `position.x` is the left edge, `position.y` the ground line it rests on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collectible {
    pub position: Vec2,
    pub collected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum InFlight {
    Initial { description: String },
    Transition { level: u32, prompt: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorldEvent {
    KeyCollected,
    TransitionStarted { level: u32 },
    TransitionCompleted { level: u32 },
    TransitionFailed { level: u32, error: GenerationError },
    WorldGenerated,
    WorldGenerationFailed { error: GenerationError },
}

/// Character, key, exit door and level progression for one play session.
///
/// Background generation is single-flight. While a level transition is outstanding every tick
/// only polls for its result and leaves the world untouched.
pub struct WorldController {
    config: WorldConfig,
    sim: CharacterSimulator,
    poses: PoseSet,
    collectible: Collectible,
    has_key: bool,
    level: u32,
    description: String,
    background: Option<ImageAsset>,
    regen: Box<dyn BackgroundService>,
    rng: StdRng,
    in_flight: Option<InFlight>,
    last_error: Option<GenerationError>,
    tick_count: u64,
}

impl WorldController {
    pub fn new(
        config: WorldConfig,
        poses: PoseSet,
        background: Option<ImageAsset>,
        description: impl Into<String>,
        regen: Box<dyn BackgroundService>,
        seed: u64,
    ) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let collectible = place_collectible(&config, &mut rng);
        Self {
            config,
            sim: CharacterSimulator::new(config),
            poses,
            collectible,
            has_key: false,
            level: FIRST_LEVEL,
            description: description.into(),
            background,
            regen,
            rng,
            in_flight: None,
            last_error: None,
            tick_count: 0,
        }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn simulator(&self) -> &CharacterSimulator {
        &self.sim
    }

    pub fn poses(&self) -> &PoseSet {
        &self.poses
    }

    pub fn collectible(&self) -> &Collectible {
        &self.collectible
    }

    pub fn has_key(&self) -> bool {
        self.has_key
    }

    pub fn is_exit_locked(&self) -> bool {
        !self.has_key
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn background(&self) -> Option<&ImageAsset> {
        self.background.as_ref()
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self.in_flight, Some(InFlight::Transition { .. }))
    }

    pub fn is_generating(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn last_error(&self) -> Option<&GenerationError> {
        self.last_error.as_ref()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn current_sprite(&self) -> Result<(ResolvedSprite, &ImageAsset), SpriteError> {
        let state = self.sim.state();
        let resolved = resolve_sprite(&self.poses, state.animation, state.facing)?;
        resolved
            .asset(&self.poses)
            .map(|asset| (resolved, asset))
            .ok_or(SpriteError::MissingStanding {
                state: state.animation,
            })
    }

    /// Starts generating the first level's background. Returns `false` when another
    /// generation is already outstanding.
    pub fn request_initial_world(&mut self, description: impl Into<String>) -> bool {
        if self.in_flight.is_some() {
            warn!("initial_world_request_rejected_busy");
            return false;
        }
        let description = description.into();
        info!(description = %description, "generation_requested");
        self.regen.request(description.clone());
        self.in_flight = Some(InFlight::Initial { description });
        true
    }

    pub fn tick(&mut self, input: CharacterInput) -> Vec<WorldEvent> {
        self.tick_count += 1;
        let mut events = Vec::new();
        self.poll_regen(&mut events);
        if self.is_transitioning() {
            return events;
        }

        self.sim.step(input);
        self.check_pickup(&mut events);
        self.check_exit(&mut events);
        events
    }

    fn check_pickup(&mut self, events: &mut Vec<WorldEvent>) {
        if self.collectible.collected || !self.sim.is_grounded() {
            return;
        }
        let config = &self.config;
        let character_center = self.sim.state().position.x + config.character_width * 0.5;
        let item_center = self.collectible.position.x + config.item_width * 0.5;
        let reach =
            (config.character_width * 0.5 + config.item_width * 0.5) - config.interaction_slack;
        if (character_center - item_center).abs() < reach {
            self.collectible.collected = true;
            self.has_key = true;
            info!(level = self.level, "collectible_picked_up");
            events.push(WorldEvent::KeyCollected);
        }
    }

    fn check_exit(&mut self, events: &mut Vec<WorldEvent>) {
        let threshold = self.config.transition_threshold_x();
        let x = self.sim.state().position.x;
        if x < threshold {
            return;
        }
        if x > threshold {
            self.sim.set_x_and_stop(threshold);
        }
        if !self.has_key || self.in_flight.is_some() {
            return;
        }

        let previous_level = self.level;
        self.level += 1;
        let direction = match self.sim.state().facing {
            Facing::Left => "left",
            Facing::Right => "right",
        };
        let prompt = format!(
            "{}. Continue this world for level {}, extending the scenery further to the {}.",
            self.description.trim_end_matches('.'),
            self.level,
            direction
        );
        info!(from = previous_level, to = self.level, "level_transition_started");
        self.regen.request(prompt.clone());
        self.in_flight = Some(InFlight::Transition {
            level: self.level,
            prompt,
        });
        events.push(WorldEvent::TransitionStarted { level: self.level });
    }

    fn poll_regen(&mut self, events: &mut Vec<WorldEvent>) {
        if self.in_flight.is_none() {
            return;
        }
        let Some(result) = self.regen.poll() else {
            return;
        };
        let Some(finished) = self.in_flight.take() else {
            return;
        };

        match (finished, result) {
            (InFlight::Initial { description }, Ok(background)) => {
                info!("generation_succeeded");
                self.description = description;
                self.background = Some(background);
                self.level = FIRST_LEVEL;
                self.reset_key();
                self.last_error = None;
                events.push(WorldEvent::WorldGenerated);
            }
            (InFlight::Initial { .. }, Err(error)) => {
                warn!(blocked = error.is_content_blocked(), error = %error, "generation_failed");
                self.last_error = Some(error.clone());
                events.push(WorldEvent::WorldGenerationFailed { error });
            }
            (InFlight::Transition { level, prompt }, Ok(background)) => {
                info!(level, "level_transition_completed");
                self.description = prompt;
                self.background = Some(background);
                self.sim.reset_to(self.config.spawn_x);
                self.reset_key();
                self.last_error = None;
                events.push(WorldEvent::TransitionCompleted { level });
            }
            (InFlight::Transition { level, .. }, Err(error)) => {
                warn!(
                    level,
                    blocked = error.is_content_blocked(),
                    error = %error,
                    "level_transition_failed"
                );
                self.level = level.saturating_sub(1).max(FIRST_LEVEL);
                let nudged = self.config.transition_threshold_x() - self.config.failure_nudge;
                self.sim.set_x_and_stop(nudged);
                self.last_error = Some(error.clone());
                events.push(WorldEvent::TransitionFailed { level, error });
            }
        }
    }

    fn reset_key(&mut self) {
        self.has_key = false;
        self.collectible = place_collectible(&self.config, &mut self.rng);
    }
}

/// Random x inside the middle half of the world, clear of the spawn point and the door.
fn place_collectible(config: &WorldConfig, rng: &mut StdRng) -> Collectible {
    let low = config.world_width * 0.25;
    let high = (config.world_width * 0.75 - config.item_width).max(low);
    let x = if high > low {
        rng.random_range(low..=high)
    } else {
        low
    };
    Collectible {
        position: Vec2::new(x, config.ground_y),
        collected: false,
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use super::*;
    use crate::editor::PoseId;
    use crate::raster::PixelBuffer;
    use crate::sim::regen::RegenResult;

    #[derive(Default)]
    struct FakeState {
        requests: Vec<String>,
        results: VecDeque<RegenResult>,
    }

    struct FakeService(Rc<RefCell<FakeState>>);

    impl BackgroundService for FakeService {
        fn request(&mut self, description: String) {
            self.0.borrow_mut().requests.push(description);
        }

        fn poll(&mut self) -> Option<RegenResult> {
            self.0.borrow_mut().results.pop_front()
        }
    }

    fn asset(shade: u8) -> ImageAsset {
        let buffer = PixelBuffer::from_fn(2, 2, |_, _| [shade, 0, 0, 255]).expect("buffer");
        ImageAsset::from_buffer(buffer).expect("asset")
    }

    fn full_poses() -> PoseSet {
        PoseId::ALL
            .into_iter()
            .map(|pose| (pose, asset(pose.index() as u8)))
            .collect()
    }

    fn world() -> (WorldController, Rc<RefCell<FakeState>>) {
        let state = Rc::new(RefCell::new(FakeState::default()));
        let controller = WorldController::new(
            WorldConfig::default(),
            full_poses(),
            Some(asset(200)),
            "a sunny meadow",
            Box::new(FakeService(Rc::clone(&state))),
            7,
        );
        (controller, state)
    }

    fn walk_right_until_blocked(world: &mut WorldController) -> Vec<WorldEvent> {
        let mut events = Vec::new();
        for _ in 0..400 {
            events.extend(world.tick(CharacterInput::idle().with_right(true).with_run(true)));
            if world.is_transitioning() {
                break;
            }
        }
        events
    }

    fn collect_key(world: &mut WorldController) {
        let target = world.collectible().position.x;
        world.sim.reset_to(target);
        let events = world.tick(CharacterInput::idle());
        assert_eq!(events, vec![WorldEvent::KeyCollected]);
    }

    #[test]
    fn collectible_spawns_in_safe_band() {
        for seed in 0..50 {
            let state = Rc::new(RefCell::new(FakeState::default()));
            let controller = WorldController::new(
                WorldConfig::default(),
                PoseSet::new(),
                None,
                "x",
                Box::new(FakeService(state)),
                seed,
            );
            let x = controller.collectible().position.x;
            assert!((200.0..=568.0).contains(&x), "seed {seed} placed key at {x}");
        }
    }

    #[test]
    fn pickup_requires_proximity_and_ground() {
        let (mut world, _) = world();
        let item_x = world.collectible().position.x;

        world.sim.reset_to(item_x - 60.0);
        assert!(world.tick(CharacterInput::idle()).is_empty());
        assert!(!world.has_key());

        world.sim.reset_to(item_x);
        world.tick(CharacterInput::idle().with_jump_pressed(true));
        assert!(!world.has_key());

        world.sim.reset_to(item_x - 30.0);
        world.tick(CharacterInput::idle());
        assert!(world.has_key());
        assert!(world.collectible().collected);
        assert!(!world.is_exit_locked());
    }

    #[test]
    fn exit_stays_locked_until_key_then_opens_once() {
        let (mut world, fake) = world();
        let key_x = world.collectible().position.x;
        // Start past the key so the first run reaches the door empty-handed.
        world.sim.reset_to(key_x + 80.0);
        walk_right_until_blocked(&mut world);

        let threshold = world.config().transition_threshold_x();
        assert!(!world.has_key());
        assert!(world.is_exit_locked());
        assert_eq!(world.simulator().state().position.x, threshold);
        assert_eq!(world.simulator().state().velocity.x, 0.0);
        assert!(fake.borrow().requests.is_empty());
        assert!(!world.is_transitioning());
        assert_eq!(world.level(), 1);

        let mut picked_up = false;
        for _ in 0..400 {
            let events = world.tick(CharacterInput::idle().with_left(true));
            if events.contains(&WorldEvent::KeyCollected) {
                picked_up = true;
                break;
            }
        }
        assert!(picked_up, "walking back never reached the key");
        assert!(world.has_key());
        assert!(fake.borrow().requests.is_empty());

        let events = walk_right_until_blocked(&mut world);
        assert!(events.contains(&WorldEvent::TransitionStarted { level: 2 }));
        assert_eq!(fake.borrow().requests.len(), 1);
        assert!(world.is_transitioning());
        assert_eq!(world.level(), 2);
    }

    #[test]
    fn unlocked_exit_issues_exactly_one_request_and_pauses_ticks() {
        let (mut world, fake) = world();
        collect_key(&mut world);
        let events = walk_right_until_blocked(&mut world);

        assert!(events.contains(&WorldEvent::TransitionStarted { level: 2 }));
        assert_eq!(fake.borrow().requests.len(), 1);
        assert!(fake.borrow().requests[0].starts_with("a sunny meadow. Continue"));
        assert!(fake.borrow().requests[0].contains("level 2"));
        assert_eq!(world.level(), 2);

        let frozen = *world.simulator().state();
        for _ in 0..30 {
            assert!(world
                .tick(CharacterInput::idle().with_left(true).with_jump_pressed(true))
                .is_empty());
        }
        assert_eq!(*world.simulator().state(), frozen);
        assert_eq!(fake.borrow().requests.len(), 1);
    }

    #[test]
    fn successful_transition_resets_character_and_key() {
        let (mut world, fake) = world();
        collect_key(&mut world);
        walk_right_until_blocked(&mut world);

        fake.borrow_mut().results.push_back(Ok(asset(99)));
        let events = world.tick(CharacterInput::idle());

        assert!(events.contains(&WorldEvent::TransitionCompleted { level: 2 }));
        assert!(!world.is_transitioning());
        assert_eq!(world.level(), 2);
        assert_eq!(world.background(), Some(&asset(99)));
        assert!(!world.has_key());
        assert!(!world.collectible().collected);
        let state = world.simulator().state();
        assert_eq!(state.position, Vec2::new(50.0, 300.0));
        assert_eq!(state.velocity, Vec2::ZERO);
        assert_eq!(state.animation, PoseId::Standing);
        assert!(world.description().contains("level 2"));
    }

    #[test]
    fn failed_transition_nudges_back_and_keeps_level() {
        let (mut world, fake) = world();
        collect_key(&mut world);
        walk_right_until_blocked(&mut world);

        let error = GenerationError::failed("network down");
        fake.borrow_mut().results.push_back(Err(error.clone()));
        let events = world.tick(CharacterInput::idle());

        assert!(events.contains(&WorldEvent::TransitionFailed { level: 2, error }));
        assert!(!world.is_transitioning());
        assert_eq!(world.level(), 1);
        assert!(world.has_key());
        assert_eq!(world.background(), Some(&asset(200)));
        assert_eq!(world.simulator().state().position.x, 688.0 - 24.0);
        assert!(world.last_error().is_some());

        world.tick(CharacterInput::idle());
        assert_eq!(world.simulator().state().position.x, 664.0);
    }

    #[test]
    fn initial_world_generation_is_single_flight() {
        let (mut world, fake) = world();
        assert!(world.request_initial_world("volcano island"));
        assert!(!world.request_initial_world("second try"));
        assert_eq!(fake.borrow().requests, vec!["volcano island".to_string()]);
        assert!(world.is_generating());
        assert!(!world.is_transitioning());

        world.tick(CharacterInput::idle().with_right(true));
        assert_ne!(world.simulator().state().position.x, 400.0);

        fake.borrow_mut().results.push_back(Ok(asset(10)));
        let events = world.tick(CharacterInput::idle());
        assert!(events.contains(&WorldEvent::WorldGenerated));
        assert_eq!(world.description(), "volcano island");
        assert!(!world.is_generating());
    }

    #[test]
    fn blocked_initial_generation_keeps_previous_background() {
        let (mut world, fake) = world();
        world.request_initial_world("something");
        let blocked = GenerationError::Blocked {
            reason: "unsafe".to_string(),
        };
        fake.borrow_mut().results.push_back(Err(blocked.clone()));
        let events = world.tick(CharacterInput::idle());

        assert!(events.contains(&WorldEvent::WorldGenerationFailed { error: blocked }));
        assert_eq!(world.background(), Some(&asset(200)));
        assert_eq!(world.description(), "a sunny meadow");
    }

    #[test]
    fn current_sprite_follows_animation_state() {
        let (mut world, _) = world();
        world.tick(CharacterInput::idle().with_left(true));
        let (resolved, image) = world.current_sprite().expect("sprite");
        assert_eq!(resolved.pose, PoseId::WalkingLeft);
        assert!(!resolved.mirror);
        assert_eq!(image, &asset(PoseId::WalkingLeft.index() as u8));
    }
}
