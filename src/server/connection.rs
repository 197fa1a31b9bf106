// Connection handling module
// Accepts a single TCP connection and serves it until it closes or the
// server shuts down

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;

use super::shutdown::ShutdownSignal;
use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Count the connection and hand it to its own task.
///
/// # Arguments
///
/// * `stream` - The TCP stream to handle
/// * `peer_addr` - The peer's socket address
/// * `state` - Shared application state
/// * `conn_counter` - Active connection counter, decremented when the task ends
/// * `stop` - Shutdown signal for this connection
pub fn accept_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    state: &Arc<AppState>,
    conn_counter: &Arc<AtomicUsize>,
    stop: ShutdownSignal,
) {
    conn_counter.fetch_add(1, Ordering::SeqCst);

    handle_connection(
        stream,
        peer_addr,
        Arc::clone(state),
        Arc::clone(conn_counter),
        stop,
    );
}

/// Serve one connection in a spawned task.
///
/// HTTP/1.1 with keep-alive. When the stop signal fires the connection is
/// asked to shut down gracefully: the in-flight request completes, then the
/// connection closes instead of waiting for the next one.
fn handle_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
    conn_counter: Arc<AtomicUsize>,
    mut stop: ShutdownSignal,
) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);

        let service = service_fn(move |req| {
            let state = Arc::clone(&state);
            handler::handle_request(req, state, peer_addr)
        });

        let mut builder = http1::Builder::new();
        builder.keep_alive(true);
        let conn = builder.serve_connection(io, service);
        let mut conn = std::pin::pin!(conn);

        let mut stopping = false;
        let result = loop {
            tokio::select! {
                res = conn.as_mut() => break res,
                () = stop.recv(), if !stopping => {
                    stopping = true;
                    conn.as_mut().graceful_shutdown();
                }
            }
        };

        if let Err(err) = result {
            // Malformed requests and clients hanging up mid-request are routine
            if err.is_parse() {
                logger::log_rejected_request(&peer_addr, &err);
            } else if !err.is_incomplete_message() {
                logger::log_connection_error(&err);
            }
        }

        conn_counter.fetch_sub(1, Ordering::SeqCst);
    });
}
