mod renderer;
mod transform;
mod world_view;

pub use renderer::Renderer;
pub use transform::WorldProjection;
pub use world_view::{draw_world, world_hud_lines};
