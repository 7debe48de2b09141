mod frame;
mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;

pub use frame::{CancelToken, FrameClock, FrameDelta};
pub use input::InputAction;
pub use loop_runner::{run_app, run_app_with_metrics, AppError, LoopConfig, SLOW_FRAME_ENV_VAR};
pub use metrics::{LoopMetricsSnapshot, MetricsHandle};
pub use rendering::{visible_world_size, world_to_view, DrawCommand, DrawList, Rgba, ViewSize};
pub use scene::{InputSnapshot, Scene, SceneCommand, Vec2};
