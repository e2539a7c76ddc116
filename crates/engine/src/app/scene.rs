use crate::assets::ImageAsset;
use crate::editor::PoseSet;
use crate::raster::FrameCanvas;

use super::input::{InputSnapshot, PointerEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneKey {
    Editor,
    World,
}

/// Game data carried across a scene switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneHandoff {
    pub poses: PoseSet,
    pub background: Option<ImageAsset>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    SwitchTo(SceneKey),
    SwitchWith(SceneKey, SceneHandoff),
    Quit,
}

pub trait Scene {
    /// Called every time the scene becomes active.
    fn enter(&mut self, handoff: Option<SceneHandoff>);
    fn update(&mut self, input: &InputSnapshot) -> SceneCommand;
    fn pointer(&mut self, _event: PointerEvent) {}
    fn render(&self, canvas: &mut FrameCanvas<'_>);
    fn exit(&mut self) {}
    fn title(&self) -> Option<String> {
        None
    }
    /// True while the scene deliberately skips simulation, e.g. waiting on generation.
    fn is_paused(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SceneTransition {
    Stay,
    Switched(SceneKey),
    Quit,
}

pub(crate) struct SceneMachine {
    editor: Box<dyn Scene>,
    world: Box<dyn Scene>,
    active: SceneKey,
    entered: bool,
}

impl SceneMachine {
    pub(crate) fn new(editor: Box<dyn Scene>, world: Box<dyn Scene>, active: SceneKey) -> Self {
        Self {
            editor,
            world,
            active,
            entered: false,
        }
    }

    pub(crate) fn active_scene(&self) -> SceneKey {
        self.active
    }

    pub(crate) fn start(&mut self, handoff: Option<SceneHandoff>) {
        if self.entered {
            return;
        }
        self.active_mut().enter(handoff);
        self.entered = true;
    }

    pub(crate) fn active(&self) -> &dyn Scene {
        match self.active {
            SceneKey::Editor => self.editor.as_ref(),
            SceneKey::World => self.world.as_ref(),
        }
    }

    pub(crate) fn active_mut(&mut self) -> &mut dyn Scene {
        match self.active {
            SceneKey::Editor => self.editor.as_mut(),
            SceneKey::World => self.world.as_mut(),
        }
    }

    pub(crate) fn update_active(&mut self, input: &InputSnapshot) -> SceneTransition {
        let command = self.active_mut().update(input);
        self.apply(command)
    }

    pub(crate) fn pointer_active(&mut self, event: PointerEvent) {
        self.active_mut().pointer(event);
    }

    pub(crate) fn apply(&mut self, command: SceneCommand) -> SceneTransition {
        match command {
            SceneCommand::None => SceneTransition::Stay,
            SceneCommand::Quit => SceneTransition::Quit,
            SceneCommand::SwitchTo(next) => self.switch_to(next, None),
            SceneCommand::SwitchWith(next, handoff) => self.switch_to(next, Some(handoff)),
        }
    }

    fn switch_to(&mut self, next: SceneKey, handoff: Option<SceneHandoff>) -> SceneTransition {
        if self.active == next {
            return SceneTransition::Stay;
        }
        self.active_mut().exit();
        self.active = next;
        self.active_mut().enter(handoff);
        SceneTransition::Switched(next)
    }

    pub(crate) fn shutdown(&mut self) {
        if self.entered {
            self.active_mut().exit();
            self.entered = false;
        }
    }
}
