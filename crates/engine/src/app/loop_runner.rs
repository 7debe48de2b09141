use std::collections::HashSet;
use std::env;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{debug, info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use super::frame::{FrameDriver, FrameOutcome};
use super::input::ActionStates;
use super::metrics::MetricsAccumulator;
use super::rendering::Renderer;
use super::{CancelToken, InputAction, InputSnapshot, MetricsHandle, Scene};

pub const SLOW_FRAME_ENV_VAR: &str = "FEEL_SLOW_FRAME_MS";

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    /// Upper bound on the per-frame delta handed to the scene.
    pub max_frame_delta: Duration,
    pub metrics_log_interval: Duration,
    pub simulated_slow_frame_ms: u64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Feel Playground".to_string(),
            window_width: 960,
            window_height: 360,
            max_frame_delta: Duration::from_millis(33),
            metrics_log_interval: Duration::from_secs(1),
            simulated_slow_frame_ms: 0,
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

pub fn run_app(
    config: LoopConfig,
    scene: Box<dyn Scene>,
    cancel: CancelToken,
) -> Result<(), AppError> {
    run_app_with_metrics(config, scene, MetricsHandle::default(), cancel)
}

/// Opens the window and drives `scene` once per redraw until the window is
/// closed, the scene asks to quit, or `cancel` fires.
pub fn run_app_with_metrics(
    config: LoopConfig,
    scene: Box<dyn Scene>,
    metrics_handle: MetricsHandle,
    cancel: CancelToken,
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

    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(33));
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    let slow_frame_delay = resolve_slow_frame_delay(config.simulated_slow_frame_ms);

    let mut driver = FrameDriver::new(scene, max_frame_delta, cancel);
    driver.load();
    info!(
        width = config.window_width,
        height = config.window_height,
        scale_factor = window.scale_factor(),
        "scene_loaded"
    );
    info!(
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        slow_frame_delay_ms = slow_frame_delay.as_millis() as u64,
        "loop_config"
    );

    let mut input_collector = InputCollector::default();
    let mut metrics_accumulator = MetricsAccumulator::new(metrics_log_interval, Instant::now());
    let mut last_applied_title: Option<String> = None;

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    if let Err(error) =
                        renderer.resize(new_size.width, new_size.height, window.scale_factor())
                    {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                    let size = window.inner_size();
                    if let Err(error) = renderer.resize(size.width, size.height, scale_factor) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::Focused(false) => input_collector.release_all(),
                WindowEvent::KeyboardInput { event, .. } => {
                    input_collector.handle_keyboard_input(&event);
                    if input_collector.quit_requested {
                        info!(reason = "escape_key", "shutdown_requested");
                        window_target.exit();
                    }
                }
                WindowEvent::RedrawRequested => {
                    if slow_frame_delay > Duration::ZERO {
                        // Debug perturbation to exercise the frame delta clamp.
                        thread::sleep(slow_frame_delay);
                    }

                    let now = Instant::now();
                    let input = input_collector.snapshot_for_frame();
                    match driver.run_frame(now, &input, renderer.view()) {
                        FrameOutcome::Presented(delta) => {
                            metrics_accumulator.record_step();
                            metrics_accumulator.record_frame(delta.raw);
                            if delta.raw > delta.clamped {
                                debug!(
                                    raw_ms = delta.raw.as_millis() as u64,
                                    clamped_ms = delta.clamped.as_millis() as u64,
                                    "frame_delta_clamped"
                                );
                            }
                            if let Err(error) = renderer.render(driver.draw_list()) {
                                warn!(error = %error, "renderer_draw_failed");
                                window_target.exit();
                            }
                            let next_title = driver.debug_title();
                            if next_title != last_applied_title {
                                let title =
                                    next_title.as_deref().unwrap_or(&config.window_title);
                                window.set_title(title);
                                last_applied_title = next_title;
                            }
                        }
                        FrameOutcome::Skipped => {
                            metrics_accumulator.record_skipped();
                            debug!("frame_skipped");
                        }
                        FrameOutcome::QuitRequested => {
                            info!(reason = "scene", "shutdown_requested");
                            window_target.exit();
                        }
                        FrameOutcome::Cancelled => {
                            info!(reason = "cancelled", "shutdown_requested");
                            window_target.exit();
                        }
                        FrameOutcome::Faulted => window_target.exit(),
                    }

                    if let Some(snapshot) = metrics_accumulator.maybe_snapshot(now) {
                        metrics_handle.publish(snapshot);
                        info!(
                            fps = snapshot.fps,
                            steps_per_second = snapshot.steps_per_second,
                            frame_time_ms = snapshot.frame_time_ms,
                            skipped_frames = snapshot.skipped_frames,
                            "loop_metrics"
                        );
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                if driver.is_cancelled() {
                    info!(reason = "cancelled", "shutdown_requested");
                    window_target.exit();
                } else {
                    window.request_redraw();
                }
            }
            Event::LoopExiting => {
                driver.unload();
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

/// Live set of held keys. Actions are derived per frame by OR-ing every key
/// bound to them, so releasing one of two bound keys keeps the action down.
#[derive(Debug, Default)]
struct InputCollector {
    quit_requested: bool,
    mode_toggle_is_down: bool,
    mode_toggle_pressed_edge: bool,
    held_keys: HashSet<KeyCode>,
}

impl InputCollector {
    fn mark_quit_requested(&mut self) {
        self.quit_requested = true;
    }

    fn handle_keyboard_input(&mut self, key_event: &winit::event::KeyEvent) {
        let is_pressed = key_event.state == ElementState::Pressed;
        self.update_action_state_from_physical_key(key_event.physical_key, is_pressed);
        self.handle_mode_toggle_key_state(
            is_mode_toggle_key(key_event.physical_key),
            key_event.state,
        );
    }

    fn handle_mode_toggle_key_state(&mut self, is_toggle_key: bool, state: ElementState) {
        if !is_toggle_key {
            return;
        }

        match state {
            ElementState::Pressed => {
                if !self.mode_toggle_is_down {
                    self.mode_toggle_pressed_edge = true;
                }
                self.mode_toggle_is_down = true;
            }
            ElementState::Released => self.mode_toggle_is_down = false,
        }
    }

    fn update_action_state_from_physical_key(&mut self, key: PhysicalKey, is_pressed: bool) {
        let PhysicalKey::Code(code) = key else {
            return;
        };
        if code == KeyCode::Escape && is_pressed {
            self.mark_quit_requested();
        }
        if action_for_key(code).is_none() {
            return;
        }
        if is_pressed {
            self.held_keys.insert(code);
        } else {
            self.held_keys.remove(&code);
        }
    }

    /// Focus loss drops every held key; the window never sees their key-up.
    fn release_all(&mut self) {
        self.held_keys.clear();
        self.mode_toggle_is_down = false;
    }

    fn action_states(&self) -> ActionStates {
        let mut states = ActionStates::default();
        for action in self.held_keys.iter().filter_map(|code| action_for_key(*code)) {
            states.set(action, true);
        }
        states
    }

    fn snapshot_for_frame(&mut self) -> InputSnapshot {
        let snapshot = InputSnapshot::new(
            self.quit_requested,
            self.mode_toggle_pressed_edge,
            self.action_states(),
        );
        self.mode_toggle_pressed_edge = false;
        snapshot
    }
}

fn action_for_key(code: KeyCode) -> Option<InputAction> {
    match code {
        KeyCode::KeyA | KeyCode::ArrowLeft => Some(InputAction::MoveLeft),
        KeyCode::KeyD | KeyCode::ArrowRight => Some(InputAction::MoveRight),
        KeyCode::Space | KeyCode::KeyW | KeyCode::ArrowUp => Some(InputAction::Jump),
        _ => None,
    }
}

fn is_mode_toggle_key(key: PhysicalKey) -> bool {
    matches!(
        key,
        PhysicalKey::Code(KeyCode::Tab) | PhysicalKey::Code(KeyCode::F1)
    )
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

fn resolve_slow_frame_delay(config_slow_frame_ms: u64) -> Duration {
    match env::var(SLOW_FRAME_ENV_VAR) {
        Ok(value) => parse_slow_frame_ms(&value).unwrap_or_else(|| {
            warn!(
                env_var = SLOW_FRAME_ENV_VAR,
                value = value.as_str(),
                "invalid slow-frame env var value; falling back to config"
            );
            Duration::from_millis(config_slow_frame_ms)
        }),
        Err(env::VarError::NotPresent) => Duration::from_millis(config_slow_frame_ms),
        Err(err) => {
            warn!(
                env_var = SLOW_FRAME_ENV_VAR,
                error = %err,
                "unable to read slow-frame env var; falling back to config"
            );
            Duration::from_millis(config_slow_frame_ms)
        }
    }
}

fn parse_slow_frame_ms(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_clamps_to_roughly_two_frames() {
        assert_eq!(LoopConfig::default().max_frame_delta, Duration::from_millis(33));
    }

    #[test]
    fn zero_durations_fall_back() {
        assert_eq!(
            normalize_non_zero_duration(Duration::ZERO, Duration::from_millis(33)),
            Duration::from_millis(33)
        );
        assert_eq!(
            normalize_non_zero_duration(Duration::from_millis(10), Duration::from_millis(33)),
            Duration::from_millis(10)
        );
    }

    #[test]
    fn slow_frame_value_parses_millis() {
        assert_eq!(parse_slow_frame_ms(" 40 "), Some(Duration::from_millis(40)));
        assert_eq!(parse_slow_frame_ms("fast"), None);
    }

    #[test]
    fn movement_and_jump_keys_map_to_actions() {
        let mut input = InputCollector::default();

        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::KeyA), true);
        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::Space), true);

        let snapshot = input.snapshot_for_frame();
        assert!(snapshot.is_down(InputAction::MoveLeft));
        assert!(snapshot.is_down(InputAction::Jump));
        assert!(!snapshot.is_down(InputAction::MoveRight));
    }

    #[test]
    fn arrow_keys_and_w_share_bindings() {
        let mut input = InputCollector::default();
        input
            .update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::ArrowRight), true);
        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::KeyW), true);

        let snapshot = input.snapshot_for_frame();
        assert!(snapshot.is_down(InputAction::MoveRight));
        assert!(snapshot.is_down(InputAction::Jump));
    }

    #[test]
    fn key_release_clears_action_state() {
        let mut input = InputCollector::default();
        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::KeyD), true);
        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::KeyD), false);

        assert!(!input.snapshot_for_frame().is_down(InputAction::MoveRight));
    }

    #[test]
    fn releasing_one_of_two_bound_keys_keeps_the_action() {
        let mut input = InputCollector::default();
        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::KeyD), true);
        input
            .update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::ArrowRight), true);
        input
            .update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::ArrowRight), false);
        assert!(input.snapshot_for_frame().is_down(InputAction::MoveRight));

        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::Space), true);
        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::KeyW), true);
        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::Space), false);
        assert!(input.snapshot_for_frame().is_down(InputAction::Jump));

        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::KeyD), false);
        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::KeyW), false);
        let snapshot = input.snapshot_for_frame();
        assert!(!snapshot.is_down(InputAction::MoveRight));
        assert!(!snapshot.is_down(InputAction::Jump));
    }

    #[test]
    fn unbound_keys_are_not_tracked() {
        let mut input = InputCollector::default();
        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::KeyQ), true);
        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::Escape), true);
        assert!(input.held_keys.is_empty());
    }

    #[test]
    fn held_jump_stays_down_across_snapshots() {
        let mut input = InputCollector::default();
        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::Space), true);

        assert!(input.snapshot_for_frame().is_down(InputAction::Jump));
        assert!(input.snapshot_for_frame().is_down(InputAction::Jump));
    }

    #[test]
    fn mode_toggle_is_edge_triggered() {
        let mut input = InputCollector::default();

        input.handle_mode_toggle_key_state(true, ElementState::Pressed);
        assert!(input.snapshot_for_frame().mode_toggle_pressed());
        assert!(!input.snapshot_for_frame().mode_toggle_pressed());

        input.handle_mode_toggle_key_state(true, ElementState::Pressed);
        assert!(!input.snapshot_for_frame().mode_toggle_pressed());

        input.handle_mode_toggle_key_state(true, ElementState::Released);
        input.handle_mode_toggle_key_state(true, ElementState::Pressed);
        assert!(input.snapshot_for_frame().mode_toggle_pressed());
    }

    #[test]
    fn tab_and_f1_toggle_mode() {
        assert!(is_mode_toggle_key(PhysicalKey::Code(KeyCode::Tab)));
        assert!(is_mode_toggle_key(PhysicalKey::Code(KeyCode::F1)));
        assert!(!is_mode_toggle_key(PhysicalKey::Code(KeyCode::Space)));
    }

    #[test]
    fn focus_loss_releases_held_keys() {
        let mut input = InputCollector::default();
        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::KeyD), true);
        input.handle_mode_toggle_key_state(true, ElementState::Pressed);
        input.snapshot_for_frame();

        input.release_all();
        input.handle_mode_toggle_key_state(true, ElementState::Pressed);

        let snapshot = input.snapshot_for_frame();
        assert!(!snapshot.is_down(InputAction::MoveRight));
        assert!(snapshot.mode_toggle_pressed());
    }

    #[test]
    fn escape_marks_quit() {
        let mut input = InputCollector::default();
        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::Escape), true);
        assert!(input.snapshot_for_frame().quit_requested());
    }
}
