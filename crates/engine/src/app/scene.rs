use super::input::{ActionStates, InputAction};
use super::rendering::{DrawList, ViewSize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    Quit,
}

/// Last-known input state handed to a scene once per frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    quit_requested: bool,
    mode_toggle_pressed: bool,
    actions: ActionStates,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(
        quit_requested: bool,
        mode_toggle_pressed: bool,
        actions: ActionStates,
    ) -> Self {
        Self {
            quit_requested,
            mode_toggle_pressed,
            actions,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Rising edge of the mode toggle key; true for exactly one frame per press.
    pub fn mode_toggle_pressed(&self) -> bool {
        self.mode_toggle_pressed
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_mode_toggle_pressed(mut self, mode_toggle_pressed: bool) -> Self {
        self.mode_toggle_pressed = mode_toggle_pressed;
        self
    }

    pub fn with_quit_requested(mut self, quit_requested: bool) -> Self {
        self.quit_requested = quit_requested;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

/// A scene is stepped and drawn once per display frame by the loop runner.
///
/// `update` receives the clamped frame delta and the current logical view;
/// `draw` must be a pure function of scene state and appends the whole frame
/// to `out` (the list arrives empty).
pub trait Scene {
    fn load(&mut self);
    fn update(&mut self, dt_seconds: f32, input: &InputSnapshot, view: ViewSize) -> SceneCommand;
    fn draw(&self, view: ViewSize, out: &mut DrawList);
    fn unload(&mut self);
    fn debug_title(&self) -> Option<String> {
        None
    }
}
