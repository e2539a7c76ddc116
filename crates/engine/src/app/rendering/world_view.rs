use crate::app::hud::draw_panel;
use crate::geom::Viewport;
use crate::raster::FrameCanvas;
use crate::sim::{SpriteError, WorldController};

use super::transform::WorldProjection;

const LETTERBOX_COLOR: [u8; 4] = [12, 12, 16, 255];
const FALLBACK_SKY: [u8; 4] = [120, 170, 220, 255];
const FALLBACK_GROUND: [u8; 4] = [90, 70, 50, 255];
const DOOR_LOCKED: [u8; 4] = [150, 60, 45, 255];
const DOOR_OPEN: [u8; 4] = [70, 170, 90, 255];
const DOOR_TRIM: [u8; 4] = [40, 28, 20, 255];
const KEY_FILL: [u8; 4] = [240, 200, 40, 255];
const KEY_EDGE: [u8; 4] = [150, 110, 10, 255];
const HUD_TEXT: [u8; 4] = [245, 245, 245, 255];
const HUD_BACKDROP: [u8; 4] = [20, 20, 28, 255];
const DOOR_HEIGHT_RATIO: f32 = 1.5;
const HUD_MARGIN: i32 = 6;
const MAX_ERROR_CHARS: usize = 48;

pub fn world_hud_lines(world: &WorldController) -> Vec<String> {
    let mut lines = vec![
        format!("LEVEL {}", world.level()),
        if world.has_key() {
            "KEY: FOUND - DOOR OPEN".to_string()
        } else {
            "KEY: MISSING - DOOR LOCKED".to_string()
        },
    ];
    if world.is_transitioning() {
        lines.push("GENERATING NEXT AREA...".to_string());
    } else if world.is_generating() {
        lines.push("GENERATING WORLD...".to_string());
    }
    if let Some(error) = world.last_error() {
        let message: String = error.user_message().chars().take(MAX_ERROR_CHARS).collect();
        lines.push(format!("ERROR: {message}"));
    }
    lines
}

/// Draws background, door, key, character and HUD. A missing sprite is reported after
/// everything else has been drawn.
pub fn draw_world(canvas: &mut FrameCanvas<'_>, world: &WorldController) -> Result<(), SpriteError> {
    let config = world.config();
    let viewport = Viewport::new(canvas.width(), canvas.height());
    let projection = WorldProjection::fit(config.world_width, config.world_height, viewport);
    canvas.clear(LETTERBOX_COLOR);

    match world.background() {
        Some(background) => canvas.blit_scaled(
            background.buffer(),
            projection.rect(0.0, 0.0, config.world_width, config.world_height),
            false,
        ),
        None => {
            let (x, y, w, h) = projection.rect_px(0.0, 0.0, config.world_width, config.ground_y);
            canvas.fill_rect(x, y, w, h, FALLBACK_SKY);
            let (x, y, w, h) = projection.rect_px(
                0.0,
                config.ground_y,
                config.world_width,
                config.world_height - config.ground_y,
            );
            canvas.fill_rect(x, y, w, h, FALLBACK_GROUND);
        }
    }

    let door_height = config.character_height * DOOR_HEIGHT_RATIO;
    let (x, y, w, h) = projection.rect_px(
        config.world_width - config.door_width,
        config.ground_y - door_height,
        config.door_width,
        door_height,
    );
    let door_color = if world.is_exit_locked() {
        DOOR_LOCKED
    } else {
        DOOR_OPEN
    };
    canvas.fill_rect(x, y, w, h, door_color);
    canvas.rect_outline(x, y, w, h, DOOR_TRIM);

    let key = world.collectible();
    if !key.collected {
        let (x, y, w, h) = projection.rect_px(
            key.position.x,
            key.position.y - config.item_height,
            config.item_width,
            config.item_height,
        );
        canvas.fill_rect(x, y, w, h, KEY_FILL);
        canvas.rect_outline(x, y, w, h, KEY_EDGE);
    }

    let sprite = world.current_sprite().map(|(resolved, asset)| {
        let position = world.simulator().state().position;
        canvas.blit_scaled(
            asset.buffer(),
            projection.rect(
                position.x,
                position.y - config.character_height,
                config.character_width,
                config.character_height,
            ),
            resolved.mirror,
        );
    });

    let hud_scale = (projection.scale * 2.0).round().max(1.0) as u32;
    let origin = projection.world_to_screen(crate::geom::Vec2::ZERO);
    draw_panel(
        canvas,
        origin.x.round() as i32 + HUD_MARGIN,
        origin.y.round() as i32 + HUD_MARGIN,
        hud_scale,
        &world_hud_lines(world),
        HUD_TEXT,
        HUD_BACKDROP,
    );

    sprite
}
