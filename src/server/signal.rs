// Signal handling module
//
// SIGINT (Ctrl+C) and SIGTERM both request a graceful stop. Handlers are
// registered before the task is spawned, so a registration failure is a
// startup error rather than a silently ignored signal.

use super::shutdown::Shutdown;
use crate::logger;

/// Start the signal handler task (Unix)
#[cfg(unix)]
pub fn start_signal_handler(shutdown: Shutdown) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::spawn(async move {
        tokio::select! {
            _ = sigint.recv() => logger::log_signal("SIGINT"),
            _ = sigterm.recv() => logger::log_signal("SIGTERM"),
        }
        shutdown.trigger();
    });
    Ok(())
}

/// Start the signal handler task (Ctrl+C only)
#[cfg(not(unix))]
pub fn start_signal_handler(shutdown: Shutdown) -> std::io::Result<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                logger::log_signal("Ctrl+C");
                shutdown.trigger();
            }
            Err(e) => logger::log_error(&format!("Failed to listen for Ctrl+C: {e}")),
        }
    });
    Ok(())
}
