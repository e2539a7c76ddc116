pub mod hud;
mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;

pub use input::{InputAction, InputSnapshot, PointerEvent};
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use metrics::LoopMetricsSnapshot;
pub use rendering::{draw_world, world_hud_lines, Renderer, WorldProjection};
pub use scene::{Scene, SceneCommand, SceneHandoff, SceneKey};
