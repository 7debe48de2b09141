use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum CameraMode {
    /// Camera centred on the player every tick, no lag.
    Snap,
    /// Damped spring toward a dead-zone target with velocity look-ahead.
    SpringFollow,
}

/// Movement, jump-assist and camera parameters for one feel mode.
/// Speeds are world units per second; windows are milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Tuning {
    pub(crate) acceleration: f32,
    pub(crate) deceleration: f32,
    pub(crate) max_speed: f32,
    pub(crate) jump_velocity: f32,
    pub(crate) coyote_ms: f32,
    pub(crate) jump_buffer_ms: f32,
    pub(crate) camera: CameraMode,
}

impl Tuning {
    pub(crate) const RAW: Tuning = Tuning {
        acceleration: 2200.0,
        deceleration: 2500.0,
        max_speed: 430.0,
        jump_velocity: 670.0,
        coyote_ms: 0.0,
        jump_buffer_ms: 0.0,
        camera: CameraMode::Snap,
    };

    pub(crate) const ASSISTED: Tuning = Tuning {
        acceleration: 2600.0,
        deceleration: 3200.0,
        max_speed: 470.0,
        jump_velocity: 690.0,
        coyote_ms: 120.0,
        jump_buffer_ms: 120.0,
        camera: CameraMode::SpringFollow,
    };

    pub(crate) fn buffers_jumps(&self) -> bool {
        self.jump_buffer_ms > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum FeelMode {
    #[default]
    Raw,
    Assisted,
}

impl FeelMode {
    pub(crate) fn from_assist(assist: bool) -> Self {
        if assist {
            FeelMode::Assisted
        } else {
            FeelMode::Raw
        }
    }

    pub(crate) fn is_assisted(self) -> bool {
        self == FeelMode::Assisted
    }

    pub(crate) fn toggled(self) -> Self {
        Self::from_assist(!self.is_assisted())
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            FeelMode::Raw => "raw",
            FeelMode::Assisted => "feel tuned",
        }
    }
}

/// Parameter sets for both modes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TuningSet {
    pub(crate) raw: Tuning,
    pub(crate) assisted: Tuning,
}

impl Default for TuningSet {
    fn default() -> Self {
        Self {
            raw: Tuning::RAW,
            assisted: Tuning::ASSISTED,
        }
    }
}

impl TuningSet {
    pub(crate) fn for_mode(&self, mode: FeelMode) -> &Tuning {
        match mode {
            FeelMode::Raw => &self.raw,
            FeelMode::Assisted => &self.assisted,
        }
    }
}
