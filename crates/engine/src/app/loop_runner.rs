use std::sync::Arc;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{ModifiersState, PhysicalKey};
use winit::window::WindowBuilder;

use crate::geom::Vec2;

use super::input::{actions_for_key, ActionStates, InputAction, InputSnapshot, PointerEvent};
use super::metrics::MetricsAccumulator;
use super::scene::{SceneMachine, SceneTransition};
use super::{Renderer, Scene, SceneHandoff, SceneKey};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "SpriteCraft".to_string(),
            window_width: 1280,
            window_height: 720,
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

/// Opens the window and runs both scenes until quit. `start` is entered first with `handoff`.
pub fn run_app(
    config: LoopConfig,
    editor: Box<dyn Scene>,
    world: Box<dyn Scene>,
    start: SceneKey,
    handoff: Option<SceneHandoff>,
) -> Result<(), AppError> {
    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let mut renderer = Renderer::new(Arc::clone(&window)).map_err(AppError::CreateRenderer)?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let target_tps = config.target_tps.max(1);
    let max_frame_delta = non_zero_or(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let metrics_log_interval = non_zero_or(config.metrics_log_interval, Duration::from_secs(1));
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        "loop_config"
    );

    let size = window.inner_size();
    let mut input = InputCollector::new(size.width, size.height);
    let mut scenes = SceneMachine::new(editor, world, start);
    scenes.start(handoff);
    info!(scene = ?scenes.active_scene(), "scene_entered");

    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();
    let mut metrics = MetricsAccumulator::new(metrics_log_interval, last_frame_instant);
    let mut applied_title: Option<String> = None;

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    input.set_window_size(new_size.width, new_size.height);
                    if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::Focused(false) => input.release_all(),
                WindowEvent::ModifiersChanged(modifiers) => input.set_modifiers(modifiers.state()),
                WindowEvent::KeyboardInput { event, .. } => {
                    if event.repeat {
                        return;
                    }
                    input.handle_key(event.physical_key, event.state);
                }
                WindowEvent::CursorMoved { position, .. } => {
                    let pointer = input.handle_cursor_moved(position.x as f32, position.y as f32);
                    scenes.pointer_active(pointer);
                }
                WindowEvent::CursorLeft { .. } => {
                    scenes.pointer_active(input.handle_cursor_left());
                }
                WindowEvent::MouseInput { state, button, .. } => {
                    if let Some(pointer) = input.handle_mouse_input(button, state) {
                        scenes.pointer_active(pointer);
                    }
                }
                WindowEvent::MouseWheel { delta, .. } => {
                    if let Some(pointer) = input.handle_mouse_wheel(delta) {
                        scenes.pointer_active(pointer);
                    }
                }
                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                    last_frame_instant = now;
                    accumulator = accumulator.saturating_add(raw_frame_dt.min(max_frame_delta));

                    let plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
                    for _ in 0..plan.ticks_to_run {
                        let snapshot = input.snapshot_for_tick();
                        match scenes.update_active(&snapshot) {
                            SceneTransition::Stay => {}
                            SceneTransition::Switched(scene) => info!(scene = ?scene, "scene_switched"),
                            SceneTransition::Quit => {
                                info!(reason = "scene_request", "shutdown_requested");
                                window_target.exit();
                            }
                        }
                        metrics.record_tick(scenes.active().is_paused());
                    }
                    accumulator = plan.remaining_accumulator;
                    if plan.dropped_backlog > Duration::ZERO {
                        warn!(
                            dropped_backlog_ms = plan.dropped_backlog.as_millis() as u64,
                            max_ticks_per_frame, "sim_clamp_triggered"
                        );
                    }

                    let active = scenes.active();
                    if let Err(error) = renderer.render_frame(|canvas| active.render(canvas)) {
                        warn!(error = %error, "renderer_draw_failed");
                        window_target.exit();
                    }
                    let title = active.title();
                    if title != applied_title {
                        window.set_title(title.as_deref().unwrap_or(&config.window_title));
                        applied_title = title;
                    }
                    metrics.record_frame(raw_frame_dt);

                    if let Some(snapshot) = metrics.maybe_snapshot(now) {
                        info!(
                            fps = snapshot.fps,
                            tps = snapshot.tps,
                            frame_time_ms = snapshot.frame_time_ms,
                            paused_ticks = snapshot.paused_ticks,
                            scene = ?scenes.active_scene(),
                            "loop_metrics"
                        );
                    }
                }
                _ => {}
            },
            Event::AboutToWait => window.request_redraw(),
            Event::LoopExiting => {
                scenes.shutdown();
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

/// Keyboard state sampled once per tick, plus pointer translation into scene events.
#[derive(Debug, Default)]
struct InputCollector {
    actions: ActionStates,
    modifiers: ModifiersState,
    cursor_position_px: Option<Vec2>,
    left_mouse_is_down: bool,
    window_width: u32,
    window_height: u32,
}

impl InputCollector {
    fn new(window_width: u32, window_height: u32) -> Self {
        Self {
            window_width,
            window_height,
            ..Self::default()
        }
    }

    fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_width = width;
        self.window_height = height;
    }

    fn set_modifiers(&mut self, modifiers: ModifiersState) {
        self.modifiers = modifiers;
    }

    fn handle_key(&mut self, key: PhysicalKey, state: ElementState) {
        let PhysicalKey::Code(code) = key else {
            return;
        };
        match state {
            ElementState::Pressed => {
                for action in actions_for_key(code, self.modifiers) {
                    self.actions.set(*action, true);
                }
            }
            // Release whatever the key could have pressed, whatever the modifiers are now.
            ElementState::Released => {
                let plain = actions_for_key(code, ModifiersState::empty());
                let chorded = actions_for_key(code, ModifiersState::CONTROL);
                for action in plain.iter().chain(chorded) {
                    self.actions.set(*action, false);
                }
            }
        }
    }

    fn release_all(&mut self) {
        self.actions.release_all();
        self.modifiers = ModifiersState::empty();
    }

    fn snapshot_for_tick(&mut self) -> InputSnapshot {
        let snapshot = InputSnapshot::new(
            self.actions,
            self.cursor_position_px,
            self.window_width,
            self.window_height,
        );
        self.actions.clear_pressed();
        snapshot
    }

    fn handle_cursor_moved(&mut self, x: f32, y: f32) -> PointerEvent {
        let position = Vec2::new(x, y);
        self.cursor_position_px = Some(position);
        PointerEvent::Move(position)
    }

    fn handle_cursor_left(&mut self) -> PointerEvent {
        self.cursor_position_px = None;
        self.left_mouse_is_down = false;
        PointerEvent::Leave
    }

    fn handle_mouse_input(&mut self, button: MouseButton, state: ElementState) -> Option<PointerEvent> {
        if button != MouseButton::Left {
            return None;
        }
        let position = self.cursor_position_px?;
        match state {
            ElementState::Pressed if !self.left_mouse_is_down => {
                self.left_mouse_is_down = true;
                Some(PointerEvent::Down(position))
            }
            ElementState::Released if self.left_mouse_is_down => {
                self.left_mouse_is_down = false;
                Some(PointerEvent::Up(position))
            }
            _ => None,
        }
    }

    fn handle_mouse_wheel(&mut self, delta: MouseScrollDelta) -> Option<PointerEvent> {
        let position = self.cursor_position_px?;
        let steps = zoom_steps_from_scroll_delta(delta);
        (steps != 0.0).then_some(PointerEvent::Wheel { position, steps })
    }
}

#[derive(Debug, Clone, Copy)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(mut accumulator: Duration, fixed_dt: Duration, max_ticks_per_frame: u32) -> StepPlan {
    let mut ticks_to_run = 0u32;
    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator -= fixed_dt;
        ticks_to_run += 1;
    }

    let dropped_backlog = if accumulator >= fixed_dt {
        std::mem::take(&mut accumulator)
    } else {
        Duration::ZERO
    };
    StepPlan {
        ticks_to_run,
        remaining_accumulator: accumulator,
        dropped_backlog,
    }
}

fn non_zero_or(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

/// Line deltas pass through; pixel deltas (touchpads) count as one step per event.
fn zoom_steps_from_scroll_delta(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(position) if position.y > 0.0 => 1.0,
        MouseScrollDelta::PixelDelta(position) if position.y < 0.0 => -1.0,
        MouseScrollDelta::PixelDelta(_) => 0.0,
    }
}
