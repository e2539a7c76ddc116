mod pose;
mod sprite_editor;
mod tools;

pub use pose::{PoseId, PoseSet, POSE_COUNT};
pub use sprite_editor::{EditorConfig, EditorError, SpriteEditor};
pub use tools::{clamp_to_image, SelectionRect, ToolKind};
