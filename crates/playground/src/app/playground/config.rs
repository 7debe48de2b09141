use std::fmt::Display;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use super::tuning::{CameraMode, Tuning, TuningSet};

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read tuning file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse tuning file '{}' at {field_path}: {source}", path.display())]
    Parse {
        path: PathBuf,
        field_path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("validation failed at {field_path}: expected {expected}, got {actual}")]
    Invalid {
        field_path: String,
        expected: &'static str,
        actual: String,
    },
}

/// On-disk shape: every field optional, missing ones keep the preset value.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TuningFile {
    #[serde(default)]
    raw: TuningOverride,
    #[serde(default)]
    assisted: TuningOverride,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TuningOverride {
    acceleration: Option<f32>,
    deceleration: Option<f32>,
    max_speed: Option<f32>,
    jump_velocity: Option<f32>,
    coyote_ms: Option<f32>,
    jump_buffer_ms: Option<f32>,
    camera: Option<CameraMode>,
}

impl TuningOverride {
    fn apply(&self, base: Tuning) -> Tuning {
        Tuning {
            acceleration: self.acceleration.unwrap_or(base.acceleration),
            deceleration: self.deceleration.unwrap_or(base.deceleration),
            max_speed: self.max_speed.unwrap_or(base.max_speed),
            jump_velocity: self.jump_velocity.unwrap_or(base.jump_velocity),
            coyote_ms: self.coyote_ms.unwrap_or(base.coyote_ms),
            jump_buffer_ms: self.jump_buffer_ms.unwrap_or(base.jump_buffer_ms),
            camera: self.camera.unwrap_or(base.camera),
        }
    }
}

pub(crate) fn load_tuning_file(path: &Path) -> Result<TuningSet, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_tuning_json(&raw, path)
}

pub(crate) fn parse_tuning_json(raw: &str, path: &Path) -> Result<TuningSet, ConfigError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let file: TuningFile =
        serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
            let field_path = match error.path().to_string() {
                p if p.is_empty() || p == "." => "<root>".to_string(),
                p => p,
            };
            ConfigError::Parse {
                path: path.to_path_buf(),
                field_path,
                source: error.into_inner(),
            }
        })?;

    let defaults = TuningSet::default();
    let set = TuningSet {
        raw: file.raw.apply(defaults.raw),
        assisted: file.assisted.apply(defaults.assisted),
    };
    validate_tuning(&set.raw, "raw")?;
    validate_tuning(&set.assisted, "assisted")?;
    Ok(set)
}

pub(crate) fn validate_tuning(tuning: &Tuning, mode: &str) -> Result<(), ConfigError> {
    let non_negative = [
        ("acceleration", tuning.acceleration),
        ("deceleration", tuning.deceleration),
        ("jump_velocity", tuning.jump_velocity),
        ("coyote_ms", tuning.coyote_ms),
        ("jump_buffer_ms", tuning.jump_buffer_ms),
    ];
    for (field, value) in non_negative {
        if !value.is_finite() || value < 0.0 {
            return Err(invalid(mode, field, "finite number >= 0", value));
        }
    }
    if !tuning.max_speed.is_finite() || tuning.max_speed <= 0.0 {
        return Err(invalid(mode, "max_speed", "finite number > 0", tuning.max_speed));
    }
    Ok(())
}

fn invalid(mode: &str, field: &str, expected: &'static str, actual: impl Display) -> ConfigError {
    ConfigError::Invalid {
        field_path: format!("{mode}.{field}"),
        expected,
        actual: actual.to_string(),
    }
}

/// Accepts the usual spellings of an on/off environment flag.
pub(crate) fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" | "" => Some(false),
        _ => None,
    }
}
