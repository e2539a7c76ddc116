use serde::{Deserialize, Serialize};

use crate::editor::PoseId;
use crate::geom::Vec2;

/// Physics and layout constants for the world. Units are world pixels and ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldConfig {
    pub gravity: f32,
    pub walk_speed: f32,
    pub run_speed: f32,
    pub jump_power: f32,
    pub ground_y: f32,
    pub world_width: f32,
    pub world_height: f32,
    pub character_width: f32,
    pub character_height: f32,
    pub item_width: f32,
    pub item_height: f32,
    pub door_width: f32,
    pub interaction_slack: f32,
    pub spawn_x: f32,
    pub failure_nudge: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: 0.5,
            walk_speed: 3.0,
            run_speed: 6.0,
            jump_power: 10.0,
            ground_y: 300.0,
            world_width: 800.0,
            world_height: 400.0,
            character_width: 64.0,
            character_height: 64.0,
            item_width: 32.0,
            item_height: 32.0,
            door_width: 48.0,
            interaction_slack: 8.0,
            spawn_x: 50.0,
            failure_nudge: 24.0,
        }
    }
}

impl WorldConfig {
    pub fn max_character_x(&self) -> f32 {
        (self.world_width - self.character_width).max(0.0)
    }

    pub fn transition_threshold_x(&self) -> f32 {
        (self.world_width - self.character_width - self.door_width).max(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    Left,
    #[default]
    Right,
}

/// Input sampled for one tick. `jump_pressed` and `toggle_sit_pressed` are edges: true only
/// on the tick the key went down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CharacterInput {
    pub left: bool,
    pub right: bool,
    pub run: bool,
    pub down: bool,
    pub jump_pressed: bool,
    pub toggle_sit_pressed: bool,
}

impl CharacterInput {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn with_left(mut self, left: bool) -> Self {
        self.left = left;
        self
    }

    pub fn with_right(mut self, right: bool) -> Self {
        self.right = right;
        self
    }

    pub fn with_run(mut self, run: bool) -> Self {
        self.run = run;
        self
    }

    pub fn with_down(mut self, down: bool) -> Self {
        self.down = down;
        self
    }

    pub fn with_jump_pressed(mut self, jump_pressed: bool) -> Self {
        self.jump_pressed = jump_pressed;
        self
    }

    pub fn with_toggle_sit_pressed(mut self, toggle_sit_pressed: bool) -> Self {
        self.toggle_sit_pressed = toggle_sit_pressed;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacterState {
    pub position: Vec2,
    pub velocity: Vec2,
    pub facing: Facing,
    pub is_jumping: bool,
    pub is_running: bool,
    pub is_crouching: bool,
    pub is_sitting: bool,
    pub animation: PoseId,
}

impl CharacterState {
    pub fn standing_at(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            facing: Facing::Right,
            is_jumping: false,
            is_running: false,
            is_crouching: false,
            is_sitting: false,
            animation: PoseId::Standing,
        }
    }
}

/// Animation state by strict priority: sitting, jumping, crouching, moving, standing.
pub fn resolve_animation_state(
    is_sitting: bool,
    is_jumping: bool,
    is_crouching: bool,
    horizontal_velocity: f32,
    is_running: bool,
    facing: Facing,
) -> PoseId {
    if is_sitting {
        PoseId::Sitting
    } else if is_jumping {
        PoseId::Jumping
    } else if is_crouching {
        PoseId::Crouching
    } else if horizontal_velocity != 0.0 {
        match (is_running, facing) {
            (true, _) => PoseId::Running,
            (false, Facing::Left) => PoseId::WalkingLeft,
            (false, Facing::Right) => PoseId::WalkingRight,
        }
    } else {
        PoseId::Standing
    }
}

#[derive(Debug, Clone)]
pub struct CharacterSimulator {
    config: WorldConfig,
    state: CharacterState,
}

impl CharacterSimulator {
    /// Starts standing at the horizontal centre of the world, on the ground.
    pub fn new(config: WorldConfig) -> Self {
        let x = (config.world_width * 0.5).clamp(0.0, config.max_character_x());
        Self {
            config,
            state: CharacterState::standing_at(Vec2::new(x, config.ground_y)),
        }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn state(&self) -> &CharacterState {
        &self.state
    }

    pub fn is_grounded(&self) -> bool {
        self.state.position.y >= self.config.ground_y && self.state.velocity.y == 0.0
    }

    /// Places the character standing on the ground at `x`, all motion cleared.
    pub fn reset_to(&mut self, x: f32) {
        let x = x.clamp(0.0, self.config.max_character_x());
        self.state = CharacterState::standing_at(Vec2::new(x, self.config.ground_y));
    }

    /// Moves the character horizontally and stops it, keeping the vertical state.
    pub(crate) fn set_x_and_stop(&mut self, x: f32) {
        self.state.position.x = x.clamp(0.0, self.config.max_character_x());
        self.state.velocity.x = 0.0;
        self.refresh_animation();
    }

    pub fn step(&mut self, input: CharacterInput) {
        let config = self.config;
        let grounded = self.is_grounded();
        let state = &mut self.state;

        if input.toggle_sit_pressed {
            state.is_sitting = !state.is_sitting;
            state.is_crouching = false;
            state.velocity.x = 0.0;
        }
        if state.is_sitting && !grounded {
            state.is_sitting = false;
        }

        if state.is_sitting {
            state.velocity = Vec2::ZERO;
            state.is_crouching = false;
        } else {
            state.velocity.y += config.gravity;
            state.is_running = input.run;
            state.is_crouching = input.down && !state.is_jumping && grounded;

            if state.is_crouching {
                state.velocity.x = 0.0;
            } else {
                let speed = if state.is_running {
                    config.run_speed
                } else {
                    config.walk_speed
                };
                if input.left && !input.right {
                    state.velocity.x = -speed;
                    state.facing = Facing::Left;
                } else if input.right && !input.left {
                    state.velocity.x = speed;
                    state.facing = Facing::Right;
                } else {
                    state.velocity.x = 0.0;
                }

                if input.jump_pressed && grounded && !state.is_jumping {
                    state.velocity.y = -config.jump_power;
                    state.is_jumping = true;
                }
            }
        }

        state.position = state.position + state.velocity;

        if state.position.y >= config.ground_y {
            state.position.y = config.ground_y;
            state.velocity.y = 0.0;
            state.is_jumping = false;
        }

        let max_x = config.max_character_x();
        if state.position.x <= 0.0 {
            state.position.x = 0.0;
            state.velocity.x = 0.0;
        } else if state.position.x >= max_x {
            state.position.x = max_x;
            state.velocity.x = 0.0;
        }

        self.refresh_animation();
    }

    fn refresh_animation(&mut self) {
        let state = &mut self.state;
        state.animation = resolve_animation_state(
            state.is_sitting,
            state.is_jumping,
            state.is_crouching,
            state.velocity.x,
            state.is_running,
            state.facing,
        );
    }
}
