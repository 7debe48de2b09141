use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use feel_engine::{CancelToken, LoopConfig, MetricsHandle, Scene};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::playground::{self, FeelMode, TuningSet};

const ASSIST_ENV_VAR: &str = "FEEL_ASSIST";
const TUNING_PATH_ENV_VAR: &str = "FEEL_TUNING_PATH";
const RUN_SECONDS_ENV_VAR: &str = "FEEL_RUN_SECONDS";

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: Box<dyn Scene>,
    pub(crate) metrics: MetricsHandle,
    pub(crate) cancel: CancelToken,
    pub(crate) run_limit: Option<Duration>,
}

pub(crate) fn build_app() -> AppWiring {
    init_tracing();
    info!(version = env!("CARGO_PKG_VERSION"), "startup");

    let mode = resolve_start_mode(env::var(ASSIST_ENV_VAR).ok().as_deref());
    let tuning_path = env::var_os(TUNING_PATH_ENV_VAR).map(PathBuf::from);
    let tunings = resolve_tunings(tuning_path.as_deref());
    let run_limit = resolve_run_limit(env::var(RUN_SECONDS_ENV_VAR).ok().as_deref());

    let metrics = MetricsHandle::default();
    let scene = playground::build_scene(tunings, mode, metrics.clone());

    AppWiring {
        config: LoopConfig::default(),
        scene,
        metrics,
        cancel: CancelToken::new(),
        run_limit,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn resolve_start_mode(raw: Option<&str>) -> FeelMode {
    let Some(raw) = raw else {
        return FeelMode::Raw;
    };
    match playground::parse_flag(raw) {
        Some(assist) => FeelMode::from_assist(assist),
        None => {
            warn!(
                env_var = ASSIST_ENV_VAR,
                value = raw,
                "invalid assist flag; starting in raw mode"
            );
            FeelMode::Raw
        }
    }
}

fn resolve_run_limit(raw: Option<&str>) -> Option<Duration> {
    let raw = raw?;
    match raw.trim().parse::<f64>() {
        Ok(seconds) if seconds.is_finite() && seconds > 0.0 => {
            Some(Duration::from_secs_f64(seconds))
        }
        _ => {
            warn!(
                env_var = RUN_SECONDS_ENV_VAR,
                value = raw,
                "invalid run limit; running until the window closes"
            );
            None
        }
    }
}

/// Loads overrides from `path` when given. Any failure is logged and the
/// built-in presets are used instead.
fn resolve_tunings(path: Option<&Path>) -> TuningSet {
    let Some(path) = path else {
        return TuningSet::default();
    };
    match playground::load_tuning_file(path) {
        Ok(tunings) => {
            info!(path = %path.display(), "tuning_config_loaded");
            tunings
        }
        Err(error) => {
            warn!(error = %error, "tuning_config_rejected");
            TuningSet::default()
        }
    }
}
