use std::process::ExitCode;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use feel_engine::{run_app_with_metrics, CancelToken};
use tracing::{error, info};

use super::bootstrap::AppWiring;

/// Runs the window loop. Closing the window or pressing Escape ends the
/// session; with a run limit a timer also cancels the loop's token.
pub(crate) fn run(app: AppWiring) -> ExitCode {
    let cancel = app.cancel.clone();
    if let Some(limit) = app.run_limit {
        spawn_run_limit(cancel.clone(), limit);
    }

    if let Err(err) = run_app_with_metrics(app.config, app.scene, app.metrics, app.cancel) {
        error!(error = %err, "startup_failed");
        return ExitCode::FAILURE;
    }

    info!(cancelled = cancel.is_cancelled(), "session_closed");
    ExitCode::SUCCESS
}

fn spawn_run_limit(cancel: CancelToken, limit: Duration) -> JoinHandle<()> {
    thread::spawn(move || {
        thread::sleep(limit);
        if !cancel.is_cancelled() {
            info!(limit_secs = limit.as_secs_f64(), "run_limit_reached");
            cancel.cancel();
        }
    })
}
