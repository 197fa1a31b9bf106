// Configuration module entry point
// Layers built-in defaults, an optional config file and the command line

mod root;
mod state;
mod types;

use std::net::{IpAddr, SocketAddr};

use crate::cli::Args;
use crate::error::ServerError;

// Re-export public types
pub use root::ServeRoot;
pub use state::AppState;
pub use types::{Config, HttpConfig, LoggingConfig, ServerConfig};

pub const DEFAULT_DIR: &str = "client/dist";
pub const DEFAULT_HOST: &str = "0.0.0.0";

impl Config {
    /// Load configuration for the given command line.
    ///
    /// Precedence, lowest first: defaults, `--config` file, flags.
    pub fn load(args: &Args) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .set_default("server.host", DEFAULT_HOST)?
            .set_default("server.dir", DEFAULT_DIR)?
            .set_default("server.backlog", 128)?
            .set_default("server.shutdown_grace_secs", 5)?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "common")?
            .set_default(
                "http.server_name",
                concat!("cors-file-server/", env!("CARGO_PKG_VERSION")),
            )?
            .set_default("http.index_files", vec!["index.html", "index.htm"])?
            .set_default("http.directory_listing", true)?;

        if let Some(path) = args.config.as_deref() {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        builder = builder
            .set_override("server.port", i64::from(args.port))?
            .set_override_option(
                "server.dir",
                args.dir.as_ref().map(|d| d.to_string_lossy().into_owned()),
            )?
            .set_override_option("server.host", args.host.clone())?;
        if args.quiet {
            builder = builder.set_override("logging.access_log", false)?;
        }

        builder.build()?.try_deserialize()
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ServerError> {
        let ip: IpAddr = self
            .server
            .host
            .parse()
            .map_err(|_| ServerError::InvalidAddress(self.server.host.clone()))?;
        Ok(SocketAddr::new(ip, self.server.port))
    }
}
