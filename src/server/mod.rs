// Server module entry
// Binding, the accept loop, per-connection tasks and shutdown

pub mod connection;
pub mod listener;
pub mod shutdown;
pub mod signal;

// Rust does not allow `loop` as a module name, use server_loop
#[path = "loop.rs"]
pub mod server_loop;

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::AppState;
use crate::error::ServerError;

pub use listener::create_reusable_listener;
pub use server_loop::run_server_loop;
pub use shutdown::{Shutdown, ShutdownSignal};
pub use signal::start_signal_handler;

/// A bound, not yet running, file server
pub struct Server {
    listener: TcpListener,
    state: Arc<AppState>,
    local_addr: SocketAddr,
}

impl Server {
    /// Bind the configured address. Must be called inside a tokio runtime.
    pub fn bind(state: Arc<AppState>) -> Result<Self, ServerError> {
        let addr = state.config.socket_addr()?;
        let listener = create_reusable_listener(addr, state.config.server.backlog)
            .map_err(|source| ServerError::Bind { addr, source })?;
        let local_addr = listener.local_addr()?;
        Ok(Self {
            listener,
            state,
            local_addr,
        })
    }

    /// Actual bound address (differs from the configured one for port 0)
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serve until `shutdown` is triggered
    pub async fn run(self, shutdown: Shutdown) {
        run_server_loop(self.listener, self.state, shutdown).await;
    }
}
