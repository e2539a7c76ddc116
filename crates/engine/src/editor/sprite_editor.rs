use std::path::Path;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::assets::{read_image_file, ImageAsset, ImageLoadError};
use crate::geom::{Vec2, Viewport};
use crate::raster::{
    BlitRect, ColorParseError, EditHistory, FrameCanvas, PixelBuffer, RasterError, Rgb,
    StampMode, ViewTransform, ZOOM_MAX, ZOOM_MIN, ZOOM_STEP_FACTOR,
};

use super::pose::PoseId;
use super::tools::{clamp_to_image, Gesture, SelectionRect, ToolKind};

const CANVAS_BACKGROUND: [u8; 4] = [30, 32, 38, 255];
const CHECKER_COLORS: [[u8; 4]; 2] = [[204, 204, 204, 255], [255, 255, 255, 255]];
const CHECKER_CELL_IMAGE_PX: f32 = 4.0;
const SELECTION_COLOR: [u8; 4] = [0, 170, 255, 255];
const SELECTION_DASH_PX: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorConfig {
    pub default_brush_size: u32,
    pub min_brush_size: u32,
    pub max_brush_size: u32,
    pub default_color: Rgb,
    pub zoom_step: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_brush_size: 5,
            min_brush_size: 1,
            max_brush_size: 50,
            default_color: Rgb::BLACK,
            zoom_step: ZOOM_STEP_FACTOR,
            min_zoom: ZOOM_MIN,
            max_zoom: ZOOM_MAX,
        }
    }
}

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("no image is loaded")]
    NoImage,
    #[error(transparent)]
    Load(#[from] ImageLoadError),
    #[error("failed to encode pose {pose}: {source}")]
    EncodePose {
        pose: PoseId,
        #[source]
        source: RasterError,
    },
}

/// Headless pixel editor: one history, one view, one active tool.
///
/// Without a loaded image every tool, zoom and undo operation returns
/// [`EditorError::NoImage`].
#[derive(Debug)]
pub struct SpriteEditor {
    config: EditorConfig,
    history: Option<EditHistory>,
    view: ViewTransform,
    canvas: Viewport,
    tool: ToolKind,
    gesture: Gesture,
    selection: Option<SelectionRect>,
    brush_size: u32,
    brush_color: Rgb,
    selected_pose: PoseId,
}

impl SpriteEditor {
    pub fn new(config: EditorConfig, canvas: Viewport) -> Self {
        let brush_size = config
            .default_brush_size
            .clamp(config.min_brush_size, config.max_brush_size.max(config.min_brush_size));
        Self {
            config,
            history: None,
            view: ViewTransform::with_zoom_bounds(config.min_zoom, config.max_zoom),
            canvas,
            tool: ToolKind::default(),
            gesture: Gesture::Idle,
            selection: None,
            brush_size,
            brush_color: config.default_color,
            selected_pose: PoseId::Standing,
        }
    }

    pub fn load_image(&mut self, buffer: PixelBuffer) {
        info!(
            width = buffer.width(),
            height = buffer.height(),
            "image_loaded"
        );
        match self.history.as_mut() {
            Some(history) => history.reset(buffer),
            None => self.history = Some(EditHistory::new(buffer)),
        }
        self.view.reset();
        self.gesture = Gesture::Idle;
        self.selection = None;
    }

    /// On failure the editor is left in the "no image" state.
    pub fn load_image_file(&mut self, path: &Path) -> Result<(), EditorError> {
        match read_image_file(path) {
            Ok(buffer) => {
                self.load_image(buffer);
                Ok(())
            }
            Err(error) => {
                warn!(
                    path = %path.display(),
                    access_denied = error.is_access_denied(),
                    error = %error,
                    "image_load_failed"
                );
                self.unload();
                Err(error.into())
            }
        }
    }

    pub fn unload(&mut self) {
        self.history = None;
        self.gesture = Gesture::Idle;
        self.selection = None;
        self.view.reset();
    }

    pub fn has_image(&self) -> bool {
        self.history.is_some()
    }

    /// Zero-sized when no image is loaded.
    pub fn image_size(&self) -> Viewport {
        self.history
            .as_ref()
            .map(|history| history.current().size())
            .unwrap_or_default()
    }

    pub fn current(&self) -> Option<&PixelBuffer> {
        self.history.as_ref().map(EditHistory::current)
    }

    pub fn history(&self) -> Option<&EditHistory> {
        self.history.as_ref()
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn canvas_size(&self) -> Viewport {
        self.canvas
    }

    pub fn set_canvas_size(&mut self, canvas: Viewport) {
        self.canvas = canvas;
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    /// Finishes any gesture of the previous tool (committing a stroke) before switching.
    pub fn set_tool(&mut self, tool: ToolKind) {
        if self.tool == tool {
            return;
        }
        self.finish_gesture();
        info!(from = %self.tool, to = %tool, "tool_switched");
        self.tool = tool;
    }

    pub fn brush_size(&self) -> u32 {
        self.brush_size
    }

    pub fn set_brush_size(&mut self, size: u32) {
        let max = self.config.max_brush_size.max(self.config.min_brush_size);
        self.brush_size = size.clamp(self.config.min_brush_size, max);
    }

    pub fn adjust_brush_size(&mut self, delta: i32) {
        let next = i64::from(self.brush_size) + i64::from(delta);
        self.set_brush_size(next.clamp(0, i64::from(u32::MAX)) as u32);
    }

    pub fn brush_color(&self) -> Rgb {
        self.brush_color
    }

    pub fn set_brush_color(&mut self, color: Rgb) {
        self.brush_color = color;
    }

    pub fn set_brush_color_hex(&mut self, text: &str) -> Result<(), ColorParseError> {
        self.brush_color = text.parse()?;
        Ok(())
    }

    pub fn selected_pose(&self) -> PoseId {
        self.selected_pose
    }

    pub fn select_pose(&mut self, pose: PoseId) {
        self.selected_pose = pose;
    }

    pub fn cycle_pose(&mut self) -> PoseId {
        self.selected_pose = self.selected_pose.next();
        debug!(pose = %self.selected_pose, "pose_selected");
        self.selected_pose
    }

    pub fn selection(&self) -> Option<SelectionRect> {
        self.selection
    }

    /// The crop that [`SpriteEditor::save_pose`] would emit right now.
    pub fn selection_preview(&self) -> Option<PixelBuffer> {
        let selection = self.selection?;
        selection.crop(self.current()?)
    }

    pub fn zoom_in(&mut self) -> Result<(), EditorError> {
        self.zoom_at(self.canvas.center(), self.config.zoom_step)
    }

    pub fn zoom_out(&mut self) -> Result<(), EditorError> {
        self.zoom_at(self.canvas.center(), self.config.zoom_step.recip())
    }

    /// Wheel zoom anchored at the cursor. Positive `steps` zoom in.
    pub fn zoom_wheel(&mut self, cursor: Vec2, steps: f32) -> Result<(), EditorError> {
        if steps == 0.0 || !steps.is_finite() {
            return Ok(());
        }
        self.zoom_at(cursor, self.config.zoom_step.powf(steps))
    }

    pub fn zoom_at(&mut self, anchor: Vec2, factor: f32) -> Result<(), EditorError> {
        let image = self.require_image()?;
        self.view.zoom_at(anchor, factor, self.canvas, image);
        Ok(())
    }

    /// Returns whether anything changed. Undo during a stroke first commits the stroke,
    /// then steps back over it.
    pub fn undo(&mut self) -> Result<bool, EditorError> {
        self.require_image()?;
        self.finish_gesture();
        let Some(history) = self.history.as_mut() else {
            return Err(EditorError::NoImage);
        };
        let changed = history.undo();
        if changed {
            info!(index = history.current_index(), "undo");
        }
        Ok(changed)
    }

    pub fn pointer_down(&mut self, screen: Vec2) -> Result<(), EditorError> {
        let image = self.require_image()?;
        self.finish_gesture();

        let point = self.view.screen_to_image(screen, self.canvas, image);
        self.gesture = match self.tool {
            ToolKind::Pan => Gesture::Panning { last: screen },
            ToolKind::Select => {
                let anchor = clamp_to_image(point, image);
                self.selection = Some(SelectionRect::from_corners(anchor, anchor, image));
                Gesture::Selecting { anchor }
            }
            ToolKind::Draw | ToolKind::Erase => {
                let Some(current) = self.current() else {
                    return Err(EditorError::NoImage);
                };
                let mode = self.stamp_mode();
                let mut scratch = current.clone();
                scratch.stamp_square(point, self.brush_size, mode);
                Gesture::Stroking {
                    mode,
                    scratch,
                    stamps: 1,
                }
            }
        };
        Ok(())
    }

    pub fn pointer_move(&mut self, screen: Vec2) -> Result<(), EditorError> {
        let image = self.require_image()?;
        let point = self.view.screen_to_image(screen, self.canvas, image);
        let brush_size = self.brush_size;

        match &mut self.gesture {
            Gesture::Idle => {}
            Gesture::Panning { last } => {
                let delta = screen - *last;
                *last = screen;
                self.view.pan_by(delta);
            }
            Gesture::Selecting { anchor } => {
                self.selection = Some(SelectionRect::from_corners(*anchor, point, image));
            }
            Gesture::Stroking {
                mode,
                scratch,
                stamps,
            } => {
                scratch.stamp_square(point, brush_size, *mode);
                *stamps += 1;
            }
        }
        Ok(())
    }

    pub fn pointer_up(&mut self, screen: Vec2) -> Result<(), EditorError> {
        if self.gesture.is_active() {
            self.pointer_move(screen)?;
        }
        self.require_image()?;
        self.finish_gesture();
        Ok(())
    }

    /// Ends the gesture at the last known position.
    pub fn pointer_leave(&mut self) -> Result<(), EditorError> {
        self.require_image()?;
        self.finish_gesture();
        Ok(())
    }

    pub fn is_gesture_active(&self) -> bool {
        self.gesture.is_active()
    }

    pub fn save_selected_pose(&mut self) -> Result<Option<(PoseId, ImageAsset)>, EditorError> {
        self.save_pose(self.selected_pose)
    }

    /// Crops the current buffer to the selection and clears it. An invalid or missing
    /// selection is a logged no-op returning `Ok(None)`.
    pub fn save_pose(&mut self, pose: PoseId) -> Result<Option<(PoseId, ImageAsset)>, EditorError> {
        self.require_image()?;
        self.finish_gesture();

        let Some(cropped) = self.selection_preview() else {
            info!(pose = %pose, "save_pose_rejected");
            return Ok(None);
        };
        let (width, height) = (cropped.width(), cropped.height());
        let asset = ImageAsset::from_buffer(cropped)
            .map_err(|source| EditorError::EncodePose { pose, source })?;
        self.selection = None;
        info!(pose = %pose, width, height, "pose_saved");
        Ok(Some((pose, asset)))
    }

    /// Full redraw: checkerboard under the image, the image (live stroke included), then the
    /// dashed selection outline while the select tool is active.
    pub fn render(&self, canvas: &mut FrameCanvas<'_>) {
        canvas.clear(CANVAS_BACKGROUND);
        let Some(current) = self.current() else {
            return;
        };
        let buffer = self.gesture.scratch().unwrap_or(current);
        let image = buffer.size();
        let (left, top, width, height) = self.view.image_screen_rect(self.canvas, image);

        let cell = (CHECKER_CELL_IMAGE_PX * self.view.zoom()).round().max(1.0) as u32;
        canvas.checkerboard(
            left.round() as i32,
            top.round() as i32,
            width.round() as i32,
            height.round() as i32,
            cell,
            CHECKER_COLORS,
        );
        canvas.blit_scaled(
            buffer,
            BlitRect {
                left,
                top,
                width,
                height,
            },
            false,
        );

        if self.tool != ToolKind::Select {
            return;
        }
        if let Some(selection) = self.selection.filter(SelectionRect::is_valid) {
            let corner = self.view.image_to_screen(
                Vec2::new(selection.x, selection.y),
                self.canvas,
                image,
            );
            let zoom = self.view.zoom();
            canvas.rect_outline_dashed(
                corner.x.round() as i32,
                corner.y.round() as i32,
                (selection.width * zoom).round().max(1.0) as i32,
                (selection.height * zoom).round().max(1.0) as i32,
                SELECTION_COLOR,
                SELECTION_DASH_PX,
            );
        }
    }

    fn stamp_mode(&self) -> StampMode {
        match self.tool {
            ToolKind::Erase => StampMode::Erase,
            _ => StampMode::Draw(self.brush_color),
        }
    }

    fn require_image(&self) -> Result<Viewport, EditorError> {
        match self.current() {
            Some(buffer) => Ok(buffer.size()),
            None => Err(EditorError::NoImage),
        }
    }

    fn finish_gesture(&mut self) {
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle | Gesture::Panning { .. } => {}
            Gesture::Selecting { .. } => {
                if !self.selection.is_some_and(|selection| selection.is_valid()) {
                    self.selection = None;
                }
            }
            Gesture::Stroking {
                mode,
                scratch,
                stamps,
            } => {
                let Some(history) = self.history.as_mut() else {
                    return;
                };
                if history.commit(scratch) {
                    let erase = matches!(mode, StampMode::Erase);
                    info!(
                        erase,
                        stamps,
                        history_len = history.len(),
                        "stroke_committed"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::TRANSPARENT;

    const CANVAS: Viewport = Viewport::new(100, 100);
    const RED: Rgb = Rgb::new(255, 0, 0);
    const WHITE: [u8; 4] = [255, 255, 255, 255];

    // At zoom 1 and no pan, a 10x10 image occupies screen [45, 55).
    fn screen_of(ix: f32, iy: f32) -> Vec2 {
        Vec2::new(45.0 + ix + 0.5, 45.0 + iy + 0.5)
    }

    fn white_image() -> PixelBuffer {
        PixelBuffer::from_fn(10, 10, |_, _| WHITE).expect("image")
    }

    fn editor_with_image() -> SpriteEditor {
        let mut editor = SpriteEditor::new(EditorConfig::default(), CANVAS);
        editor.load_image(white_image());
        editor
    }

    fn frame_pixel(frame: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
        let offset = ((y * width + x) * 4) as usize;
        let mut out = [0; 4];
        out.copy_from_slice(&frame[offset..offset + 4]);
        out
    }

    #[test]
    fn operations_without_image_report_no_image() {
        let mut editor = SpriteEditor::new(EditorConfig::default(), CANVAS);
        assert!(matches!(
            editor.pointer_down(Vec2::ZERO),
            Err(EditorError::NoImage)
        ));
        assert!(matches!(editor.undo(), Err(EditorError::NoImage)));
        assert!(matches!(editor.zoom_in(), Err(EditorError::NoImage)));
        assert!(matches!(
            editor.save_pose(PoseId::Standing),
            Err(EditorError::NoImage)
        ));
        assert_eq!(editor.image_size(), Viewport::default());
    }

    #[test]
    fn failed_file_load_leaves_no_image_state() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut editor = editor_with_image();
        let result = editor.load_image_file(&dir.path().join("absent.png"));

        assert!(matches!(result, Err(EditorError::Load(ImageLoadError::Io { .. }))));
        assert!(!editor.has_image());
        assert!(editor.history().is_none());
    }

    #[test]
    fn file_load_resets_history() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("sheet.png");
        std::fs::write(&path, white_image().encode_png().expect("png")).expect("write");

        let mut editor = SpriteEditor::new(EditorConfig::default(), CANVAS);
        editor.load_image_file(&path).expect("load");
        assert_eq!(editor.image_size(), Viewport::new(10, 10));
        assert_eq!(editor.history().map(EditHistory::len), Some(1));
    }

    #[test]
    fn single_click_draws_a_dot_as_one_history_entry() {
        let mut editor = editor_with_image();
        editor.set_tool(ToolKind::Draw);
        editor.set_brush_color(RED);
        editor.set_brush_size(1);

        editor.pointer_down(screen_of(3.0, 4.0)).expect("down");
        editor.pointer_up(screen_of(3.0, 4.0)).expect("up");

        let current = editor.current().expect("image");
        assert_eq!(current.pixel(3, 4), Some(RED.opaque()));
        assert_eq!(current.pixel(4, 4), Some(WHITE));
        assert_eq!(editor.history().map(EditHistory::len), Some(2));
    }

    #[test]
    fn drag_commits_once_per_stroke_and_undo_restores() {
        let mut editor = editor_with_image();
        editor.set_tool(ToolKind::Draw);
        editor.set_brush_size(1);

        editor.pointer_down(screen_of(1.0, 1.0)).expect("down");
        for x in 2..6 {
            editor.pointer_move(screen_of(x as f32, 1.0)).expect("move");
        }
        assert_eq!(editor.history().map(EditHistory::len), Some(1));
        editor.pointer_up(screen_of(6.0, 1.0)).expect("up");
        assert_eq!(editor.history().map(EditHistory::len), Some(2));
        assert_eq!(
            editor.current().and_then(|buffer| buffer.pixel(6, 1)),
            Some(Rgb::BLACK.opaque())
        );

        assert!(editor.undo().expect("undo"));
        assert_eq!(editor.current(), Some(&white_image()));
        assert!(!editor.undo().expect("undo at start"));
    }

    #[test]
    fn pointer_leave_commits_the_stroke() {
        let mut editor = editor_with_image();
        editor.set_tool(ToolKind::Erase);
        editor.set_brush_size(3);
        editor.pointer_down(screen_of(5.0, 5.0)).expect("down");
        editor.pointer_leave().expect("leave");

        let current = editor.current().expect("image");
        assert_eq!(current.pixel(4, 4), Some(TRANSPARENT));
        assert_eq!(current.pixel(6, 6), Some(TRANSPARENT));
        assert_eq!(current.pixel(7, 7), Some(WHITE));
        assert!(!editor.is_gesture_active());
    }

    #[test]
    fn brush_size_is_clamped_to_config_bounds() {
        let mut editor = editor_with_image();
        assert_eq!(editor.brush_size(), 5);
        editor.set_brush_size(0);
        assert_eq!(editor.brush_size(), 1);
        editor.adjust_brush_size(500);
        assert_eq!(editor.brush_size(), 50);
        editor.adjust_brush_size(-10);
        assert_eq!(editor.brush_size(), 40);
    }

    #[test]
    fn pan_moves_view_by_screen_delta_without_editing() {
        let mut editor = editor_with_image();
        editor.zoom_in().expect("zoom");
        editor.pointer_down(Vec2::new(10.0, 10.0)).expect("down");
        editor.pointer_move(Vec2::new(25.0, 5.0)).expect("move");
        editor.pointer_up(Vec2::new(30.0, 5.0)).expect("up");

        assert_eq!(editor.view().pan(), Vec2::new(20.0, -5.0));
        assert_eq!(editor.history().map(EditHistory::len), Some(1));
    }

    #[test]
    fn selection_drag_then_save_pose_emits_crop_and_clears_selection() {
        let mut editor = editor_with_image();
        editor.set_tool(ToolKind::Draw);
        editor.set_brush_size(1);
        editor.pointer_down(screen_of(2.0, 3.0)).expect("down");
        editor.pointer_up(screen_of(2.0, 3.0)).expect("up");

        editor.set_tool(ToolKind::Select);
        editor.pointer_down(Vec2::new(47.0, 48.0)).expect("down");
        editor.pointer_move(Vec2::new(51.0, 50.0)).expect("move");
        editor.pointer_up(Vec2::new(51.0, 50.0)).expect("up");

        let selection = editor.selection().expect("selection");
        assert_eq!(selection.crop_bounds(), (2, 3, 4, 2));
        let preview = editor.selection_preview().expect("preview");

        let (pose, asset) = editor
            .save_pose(PoseId::Jumping)
            .expect("save")
            .expect("pose");
        assert_eq!(pose, PoseId::Jumping);
        assert_eq!(asset.buffer(), &preview);
        assert_eq!(asset.buffer().pixel(0, 0), Some(Rgb::BLACK.opaque()));
        assert!(editor.selection().is_none());
    }

    #[test]
    fn click_without_drag_discards_selection_and_save_is_noop() {
        let mut editor = editor_with_image();
        editor.set_tool(ToolKind::Select);
        editor.pointer_down(screen_of(4.0, 4.0)).expect("down");
        editor.pointer_up(screen_of(4.0, 4.0)).expect("up");

        assert!(editor.selection().is_none());
        assert!(editor.save_pose(PoseId::Standing).expect("save").is_none());
    }

    #[test]
    fn selection_is_clamped_to_image_when_dragged_outside() {
        let mut editor = editor_with_image();
        editor.set_tool(ToolKind::Select);
        editor.pointer_down(Vec2::new(0.0, 0.0)).expect("down");
        editor.pointer_up(Vec2::new(99.0, 99.0)).expect("up");

        let selection = editor.selection().expect("selection");
        assert_eq!(selection.crop_bounds(), (0, 0, 10, 10));
    }

    #[test]
    fn switching_tool_mid_stroke_commits_it() {
        let mut editor = editor_with_image();
        editor.set_tool(ToolKind::Draw);
        editor.pointer_down(screen_of(5.0, 5.0)).expect("down");
        editor.set_tool(ToolKind::Pan);

        assert!(!editor.is_gesture_active());
        assert_eq!(editor.history().map(EditHistory::len), Some(2));
    }

    #[test]
    fn zoom_buttons_anchor_at_canvas_center() {
        let mut editor = editor_with_image();
        editor.pointer_down(Vec2::new(50.0, 50.0)).expect("down");
        editor.pointer_move(Vec2::new(58.0, 47.0)).expect("move");
        editor.pointer_up(Vec2::new(58.0, 47.0)).expect("up");

        let center = CANVAS.center();
        let image = editor.image_size();
        let before = editor.view().screen_to_image(center, CANVAS, image);
        editor.zoom_in().expect("zoom in");
        editor.zoom_in().expect("zoom in");
        editor.zoom_out().expect("zoom out");
        let after = editor.view().screen_to_image(center, CANVAS, image);
        assert!((before.x - after.x).abs() < 1e-3 && (before.y - after.y).abs() < 1e-3);
        assert!((editor.view().zoom() - ZOOM_STEP_FACTOR).abs() < 1e-4);
    }

    #[test]
    fn wheel_zoom_anchors_at_cursor() {
        let mut editor = editor_with_image();
        let cursor = Vec2::new(47.0, 52.0);
        let image = editor.image_size();
        let before = editor.view().screen_to_image(cursor, CANVAS, image);
        editor.zoom_wheel(cursor, 3.0).expect("wheel");
        let after = editor.view().screen_to_image(cursor, CANVAS, image);
        assert!((before.x - after.x).abs() < 1e-3 && (before.y - after.y).abs() < 1e-3);
    }

    fn render_into(editor: &SpriteEditor, frame: &mut [u8]) {
        let mut canvas = FrameCanvas::new(frame, CANVAS.width, CANVAS.height).expect("canvas");
        editor.render(&mut canvas);
    }

    #[test]
    fn render_draws_live_stroke_and_selection_only_in_select_tool() {
        let mut editor = editor_with_image();
        let mut frame = vec![0; (CANVAS.width * CANVAS.height * 4) as usize];

        editor.set_tool(ToolKind::Draw);
        editor.set_brush_size(1);
        editor.set_brush_color(RED);
        editor.pointer_down(screen_of(0.0, 0.0)).expect("down");
        render_into(&editor, &mut frame);
        assert_eq!(frame_pixel(&frame, CANVAS.width, 45, 45), RED.opaque());
        assert_eq!(frame_pixel(&frame, CANVAS.width, 46, 45), WHITE);
        assert_eq!(frame_pixel(&frame, CANVAS.width, 10, 10), CANVAS_BACKGROUND);
        editor.pointer_up(screen_of(0.0, 0.0)).expect("up");

        editor.set_tool(ToolKind::Select);
        editor.pointer_down(Vec2::new(47.0, 47.0)).expect("down");
        editor.pointer_up(Vec2::new(53.0, 53.0)).expect("up");
        render_into(&editor, &mut frame);
        assert_eq!(frame_pixel(&frame, CANVAS.width, 47, 47), SELECTION_COLOR);

        editor.set_tool(ToolKind::Pan);
        render_into(&editor, &mut frame);
        assert_eq!(frame_pixel(&frame, CANVAS.width, 47, 47), WHITE);
    }

    #[test]
    fn cycle_pose_and_hex_colour() {
        let mut editor = editor_with_image();
        assert_eq!(editor.cycle_pose(), PoseId::WalkingLeft);
        editor.set_brush_color_hex("#00ff80").expect("colour");
        assert_eq!(editor.brush_color(), Rgb::new(0, 255, 128));
        assert!(editor.set_brush_color_hex("green").is_err());
        assert_eq!(editor.brush_color(), Rgb::new(0, 255, 128));
    }
}
