use sprite_engine::app::hud::draw_panel;
use sprite_engine::{
    EditorError, FrameCanvas, GameBundle, ImageAsset, InputAction, InputSnapshot, PointerEvent,
    PoseSet, Scene, SceneCommand, SceneHandoff, SceneKey, SpriteEditor, ToolKind, Viewport,
    POSE_COUNT,
};
use tracing::{debug, info, warn};

use super::persistence::GameSink;

const HUD_TEXT: [u8; 4] = [235, 235, 240, 255];
const HUD_BACKDROP: [u8; 4] = [18, 18, 24, 255];
const HUD_SCALE: u32 = 2;
const HUD_MARGIN: i32 = 8;

const TOOL_KEYS: [(InputAction, ToolKind); 4] = [
    (InputAction::ToolPan, ToolKind::Pan),
    (InputAction::ToolSelect, ToolKind::Select),
    (InputAction::ToolDraw, ToolKind::Draw),
    (InputAction::ToolErase, ToolKind::Erase),
];

/// Keyboard and pointer front end for [`SpriteEditor`], plus the poses cut so far.
pub(crate) struct EditorScene {
    editor: SpriteEditor,
    poses: PoseSet,
    background: Option<ImageAsset>,
    description: String,
    sink: GameSink,
    status: Option<String>,
}

impl EditorScene {
    pub(crate) fn new(editor: SpriteEditor, description: String, sink: GameSink) -> Self {
        Self {
            editor,
            poses: PoseSet::new(),
            background: None,
            description,
            sink,
            status: None,
        }
    }

    fn hud_lines(&self) -> Vec<String> {
        let zoom_percent = (self.editor.view().zoom() * 100.0).round() as i32;
        let mut lines = vec![
            format!(
                "TOOL: {}  BRUSH {}  COLOR {}  ZOOM {zoom_percent}%",
                self.editor.tool(),
                self.editor.brush_size(),
                self.editor.brush_color()
            ),
            format!(
                "POSE: {}  SAVED {}/{POSE_COUNT}",
                self.editor.selected_pose(),
                self.poses.len()
            ),
        ];
        if !self.editor.has_image() {
            lines.push("NO IMAGE LOADED".to_string());
        }
        if let Some(status) = &self.status {
            lines.push(status.clone());
        }
        lines
    }

    fn sync_canvas_size(&mut self, input: &InputSnapshot) {
        let (width, height) = input.window_size();
        let canvas = Viewport::new(width, height);
        if !canvas.is_empty() && canvas != self.editor.canvas_size() {
            self.editor.set_canvas_size(canvas);
        }
    }

    fn apply_editor_keys(&mut self, input: &InputSnapshot) -> Result<(), EditorError> {
        for (action, tool) in TOOL_KEYS {
            if input.pressed(action) {
                self.editor.set_tool(tool);
            }
        }
        if input.pressed(InputAction::BrushShrink) {
            self.editor.adjust_brush_size(-1);
        }
        if input.pressed(InputAction::BrushGrow) {
            self.editor.adjust_brush_size(1);
        }
        if input.pressed(InputAction::CyclePose) {
            self.editor.cycle_pose();
        }
        if input.pressed(InputAction::ZoomIn) {
            self.editor.zoom_in()?;
        }
        if input.pressed(InputAction::ZoomOut) {
            self.editor.zoom_out()?;
        }
        if input.pressed(InputAction::Undo) && !self.editor.undo()? {
            self.status = Some("NOTHING TO UNDO".to_string());
        }
        if input.pressed(InputAction::SavePose) {
            self.save_pose()?;
        }
        Ok(())
    }

    fn save_pose(&mut self) -> Result<(), EditorError> {
        match self.editor.save_selected_pose()? {
            Some((pose, asset)) => {
                self.poses.insert(pose, asset);
                self.status = Some(format!("SAVED POSE {pose}"));
                // Move on to the next pose still missing so a full set needs no manual cycling.
                if let Some(next) = self.poses.missing().first() {
                    self.editor.select_pose(*next);
                }
            }
            None => self.status = Some("SELECT AN AREA FIRST".to_string()),
        }
        Ok(())
    }

    fn enter_world(&mut self) -> SceneCommand {
        let missing = self.poses.missing();
        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(|pose| pose.as_str()).collect();
            info!(missing = ?names, "world_entry_blocked");
            self.status = Some(format!("MISSING POSES: {}", names.join(", ")));
            return SceneCommand::None;
        }
        SceneCommand::SwitchWith(
            SceneKey::World,
            SceneHandoff {
                poses: self.poses.clone(),
                background: self.background.clone(),
                description: self.description.clone(),
            },
        )
    }

    fn bundle(&self) -> Option<GameBundle> {
        let background = self.background.clone()?;
        Some(GameBundle {
            poses: self.poses.clone(),
            background,
            description: self.description.clone(),
        })
    }

    fn persist(&mut self, export: bool) {
        self.status = Some(match self.bundle() {
            Some(bundle) if export => self.sink.export(&bundle),
            Some(bundle) => self.sink.save(&bundle),
            None => "GENERATE A WORLD BEFORE SAVING".to_string(),
        });
    }
}

impl Scene for EditorScene {
    fn enter(&mut self, handoff: Option<SceneHandoff>) {
        if let Some(handoff) = handoff {
            self.poses = handoff.poses;
            self.background = handoff.background;
            self.description = handoff.description;
        }
        info!(
            has_image = self.editor.has_image(),
            poses = self.poses.len(),
            "editor_entered"
        );
    }

    fn update(&mut self, input: &InputSnapshot) -> SceneCommand {
        self.sync_canvas_size(input);

        if input.pressed(InputAction::Quit) {
            return SceneCommand::Quit;
        }
        if input.pressed(InputAction::SwitchScene) {
            return self.enter_world();
        }
        if input.pressed(InputAction::SaveGame) {
            self.persist(false);
        }
        if input.pressed(InputAction::ExportGame) {
            self.persist(true);
        }
        if let Err(error) = self.apply_editor_keys(input) {
            debug!(error = %error, "editor_key_ignored");
            self.status = Some("LOAD AN IMAGE TO EDIT".to_string());
        }
        SceneCommand::None
    }

    fn pointer(&mut self, event: PointerEvent) {
        let result = match event {
            PointerEvent::Down(position) => self.editor.pointer_down(position),
            PointerEvent::Move(position) => self.editor.pointer_move(position),
            PointerEvent::Up(position) => self.editor.pointer_up(position),
            PointerEvent::Leave => self.editor.pointer_leave(),
            PointerEvent::Wheel { position, steps } => self.editor.zoom_wheel(position, steps),
        };
        match result {
            Ok(()) | Err(EditorError::NoImage) => {}
            Err(error) => warn!(error = %error, "editor_pointer_failed"),
        }
    }

    fn render(&self, canvas: &mut FrameCanvas<'_>) {
        self.editor.render(canvas);
        draw_panel(
            canvas,
            HUD_MARGIN,
            HUD_MARGIN,
            HUD_SCALE,
            &self.hud_lines(),
            HUD_TEXT,
            HUD_BACKDROP,
        );
    }

    fn exit(&mut self) {
        // Commit any stroke still held by the pointer before the world takes over.
        if let Err(error) = self.editor.pointer_leave() {
            debug!(error = %error, "editor_exit_without_image");
        }
    }

    fn title(&self) -> Option<String> {
        Some(format!(
            "SpriteCraft - editor - {} ({}/{POSE_COUNT} poses)",
            self.editor.selected_pose(),
            self.poses.len()
        ))
    }
}
