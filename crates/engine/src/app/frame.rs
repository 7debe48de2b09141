use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::error;

use super::{DrawList, InputSnapshot, Scene, SceneCommand, ViewSize};

/// Cancellation handle owned by whoever started the loop. Clones share state;
/// once cancelled, no further frames are scheduled.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameDelta {
    pub raw: Duration,
    pub clamped: Duration,
}

/// Wall-clock delta between consecutive frames, clamped so a stall (tab
/// resume, debugger pause, minimized window) cannot blow up integration.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<Instant>,
    max_delta: Duration,
}

impl FrameClock {
    pub fn new(max_delta: Duration) -> Self {
        Self {
            last: None,
            max_delta,
        }
    }

    pub fn tick(&mut self, now: Instant) -> FrameDelta {
        let raw = self
            .last
            .map(|previous| now.saturating_duration_since(previous))
            .unwrap_or(Duration::ZERO);
        self.last = Some(now);
        FrameDelta {
            raw,
            clamped: raw.min(self.max_delta),
        }
    }

    /// Forgets the previous frame; the next tick reports a zero delta.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FrameOutcome {
    /// No drawable surface; nothing was simulated.
    Skipped,
    Presented(FrameDelta),
    QuitRequested,
    Cancelled,
    /// The scene panicked; the loop must stop.
    Faulted,
}

/// Drives one scene: one update plus one full redraw per frame.
pub(crate) struct FrameDriver {
    scene: Box<dyn Scene>,
    clock: FrameClock,
    cancel: CancelToken,
    draw_list: DrawList,
    loaded: bool,
}

impl FrameDriver {
    pub(crate) fn new(
        scene: Box<dyn Scene>,
        max_frame_delta: Duration,
        cancel: CancelToken,
    ) -> Self {
        Self {
            scene,
            clock: FrameClock::new(max_frame_delta),
            cancel,
            draw_list: DrawList::new(),
            loaded: false,
        }
    }

    pub(crate) fn load(&mut self) {
        if self.loaded {
            return;
        }
        self.scene.load();
        self.loaded = true;
    }

    pub(crate) fn unload(&mut self) {
        if !self.loaded {
            return;
        }
        self.scene.unload();
        self.loaded = false;
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub(crate) fn draw_list(&self) -> &DrawList {
        &self.draw_list
    }

    pub(crate) fn debug_title(&self) -> Option<String> {
        self.scene.debug_title()
    }

    pub(crate) fn run_frame(
        &mut self,
        now: Instant,
        input: &InputSnapshot,
        view: Option<ViewSize>,
    ) -> FrameOutcome {
        if self.cancel.is_cancelled() {
            return FrameOutcome::Cancelled;
        }
        let Some(view) = view else {
            self.clock.reset();
            return FrameOutcome::Skipped;
        };
        if !self.loaded {
            self.load();
        }

        let delta = self.clock.tick(now);
        let dt_seconds = delta.clamped.as_secs_f32();
        let scene = &mut self.scene;
        let draw_list = &mut self.draw_list;
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let command = scene.update(dt_seconds, input, view);
            draw_list.clear();
            scene.draw(view, draw_list);
            command
        }));

        match result {
            Ok(SceneCommand::None) => FrameOutcome::Presented(delta),
            Ok(SceneCommand::Quit) => FrameOutcome::QuitRequested,
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|text| (*text).to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "non-string panic payload".to_string());
                error!(panic = %message, "scene_panicked");
                self.draw_list.clear();
                FrameOutcome::Faulted
            }
        }
    }
}
