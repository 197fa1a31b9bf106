// Server loop module
// Accepts connections until the stop signal fires, then drains

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use super::shutdown::Shutdown;
use crate::config::AppState;
use crate::logger;

const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Accept loop
///
/// Runs until `shutdown` is triggered. The listener is closed as soon as the
/// stop request arrives; open connections get `shutdown_grace_secs` to finish
/// their in-flight request before the loop returns.
pub async fn run_server_loop(listener: TcpListener, state: Arc<AppState>, shutdown: Shutdown) {
    let active_connections = Arc::new(AtomicUsize::new(0));
    let mut stop = shutdown.subscribe();

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(
                            stream,
                            peer_addr,
                            &state,
                            &active_connections,
                            shutdown.subscribe(),
                        );
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = stop.recv() => break,
        }
    }

    logger::log_shutdown();
    drop(listener);

    let grace = Duration::from_secs(state.config.server.shutdown_grace_secs);
    drain_connections(&active_connections, grace).await;
}

/// Wait until every connection task has finished or `grace` has elapsed.
///
/// Connections still open after the grace period are left to the runtime,
/// which drops them when the process exits.
async fn drain_connections(active: &AtomicUsize, grace: Duration) {
    let deadline = tokio::time::Instant::now() + grace;

    loop {
        let remaining = active.load(Ordering::SeqCst);
        if remaining == 0 {
            return;
        }
        if tokio::time::Instant::now() >= deadline {
            logger::log_drain_timeout(remaining);
            return;
        }
        tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
    }
}
