mod animation;
mod character;
mod regen;
mod world;

pub use animation::{resolve_sprite, ResolvedSprite, SpriteError};
pub use character::{
    resolve_animation_state, CharacterInput, CharacterSimulator, CharacterState, Facing,
    WorldConfig,
};
pub use regen::{BackgroundService, RegenResult, RegenWorker};
pub use world::{Collectible, WorldController, WorldEvent, FIRST_LEVEL};
