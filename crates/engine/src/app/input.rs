use winit::keyboard::{KeyCode, ModifiersState};

use crate::geom::Vec2;

/// Logical actions shared by both scenes. A key may drive more than one action; each scene
/// reads only the ones it cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveLeft,
    MoveRight,
    Jump,
    Crouch,
    Run,
    ToggleSit,
    SwitchScene,
    Quit,
    SaveGame,
    ExportGame,
    ToolPan,
    ToolSelect,
    ToolDraw,
    ToolErase,
    ZoomIn,
    ZoomOut,
    Undo,
    BrushShrink,
    BrushGrow,
    CyclePose,
    SavePose,
}

const ACTION_COUNT: usize = 21;

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveLeft => 0,
            InputAction::MoveRight => 1,
            InputAction::Jump => 2,
            InputAction::Crouch => 3,
            InputAction::Run => 4,
            InputAction::ToggleSit => 5,
            InputAction::SwitchScene => 6,
            InputAction::Quit => 7,
            InputAction::SaveGame => 8,
            InputAction::ExportGame => 9,
            InputAction::ToolPan => 10,
            InputAction::ToolSelect => 11,
            InputAction::ToolDraw => 12,
            InputAction::ToolErase => 13,
            InputAction::ZoomIn => 14,
            InputAction::ZoomOut => 15,
            InputAction::Undo => 16,
            InputAction::BrushShrink => 17,
            InputAction::BrushGrow => 18,
            InputAction::CyclePose => 19,
            InputAction::SavePose => 20,
        }
    }
}

/// Actions bound to `key`. Undo needs Ctrl (or Cmd); every other binding ignores modifiers.
pub(crate) fn actions_for_key(key: KeyCode, modifiers: ModifiersState) -> &'static [InputAction] {
    use InputAction::*;

    let command_held = modifiers.control_key() || modifiers.super_key();
    match key {
        KeyCode::KeyZ if command_held => &[Undo],
        KeyCode::ArrowLeft | KeyCode::KeyA => &[MoveLeft],
        KeyCode::ArrowRight | KeyCode::KeyD => &[MoveRight],
        KeyCode::ArrowUp | KeyCode::KeyW | KeyCode::Space => &[Jump],
        KeyCode::ArrowDown => &[Crouch],
        KeyCode::KeyS => &[Crouch, ToolSelect],
        KeyCode::ShiftLeft | KeyCode::ShiftRight => &[Run],
        KeyCode::KeyC | KeyCode::KeyX => &[ToggleSit],
        KeyCode::Tab => &[SwitchScene],
        KeyCode::Escape => &[Quit],
        KeyCode::F5 => &[SaveGame],
        KeyCode::F6 => &[ExportGame],
        KeyCode::KeyP => &[ToolPan],
        KeyCode::KeyB => &[ToolDraw],
        KeyCode::KeyE => &[ToolErase],
        KeyCode::Equal | KeyCode::NumpadAdd => &[ZoomIn],
        KeyCode::Minus | KeyCode::NumpadSubtract => &[ZoomOut],
        KeyCode::BracketLeft => &[BrushShrink],
        KeyCode::BracketRight => &[BrushGrow],
        KeyCode::KeyQ => &[CyclePose],
        KeyCode::Enter | KeyCode::NumpadEnter => &[SavePose],
        _ => &[],
    }
}

/// Held state plus a press edge per action. Edges stay set until `clear_pressed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
    pressed: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        let index = action.index();
        if is_down && !self.down[index] {
            self.pressed[index] = true;
        }
        self.down[index] = is_down;
    }

    pub(crate) fn set_pressed(&mut self, action: InputAction) {
        self.pressed[action.index()] = true;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }

    pub(crate) fn was_pressed(&self, action: InputAction) -> bool {
        self.pressed[action.index()]
    }

    pub(crate) fn clear_pressed(&mut self) {
        self.pressed = [false; ACTION_COUNT];
    }

    pub(crate) fn release_all(&mut self) {
        self.down = [false; ACTION_COUNT];
    }
}

/// Pointer activity in window pixels, delivered to the active scene as it happens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Vec2),
    Move(Vec2),
    Up(Vec2),
    Leave,
    Wheel { position: Vec2, steps: f32 },
}

/// Per-tick view of the keyboard.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    actions: ActionStates,
    cursor_position_px: Option<Vec2>,
    window_width: u32,
    window_height: u32,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(
        actions: ActionStates,
        cursor_position_px: Option<Vec2>,
        window_width: u32,
        window_height: u32,
    ) -> Self {
        Self {
            actions,
            cursor_position_px,
            window_width,
            window_height,
        }
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    /// True only on the first tick after the key went down.
    pub fn pressed(&self, action: InputAction) -> bool {
        self.actions.was_pressed(action)
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        if !is_down {
            self.actions.pressed[action.index()] = false;
        }
        self
    }

    pub fn with_action_pressed(mut self, action: InputAction) -> Self {
        self.actions.set_pressed(action);
        self
    }

    pub fn with_window_size(mut self, window_size: (u32, u32)) -> Self {
        self.window_width = window_size.0;
        self.window_height = window_size.1;
        self
    }

    pub fn cursor_position_px(&self) -> Option<Vec2> {
        self.cursor_position_px
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }
}
