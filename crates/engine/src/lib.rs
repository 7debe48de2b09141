pub mod app;

pub use app::{
    run_app, run_app_with_metrics, visible_world_size, world_to_view, AppError, CancelToken,
    DrawCommand, DrawList, FrameClock, FrameDelta, InputAction, InputSnapshot, LoopConfig,
    LoopMetricsSnapshot, MetricsHandle, Rgba, Scene, SceneCommand, Vec2, ViewSize,
    SLOW_FRAME_ENV_VAR,
};
