//! Command line arguments

use clap::Parser;
use std::path::PathBuf;

/// Static file server with permissive CORS and disabled caching
#[derive(Parser, Debug, Clone, Default)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// TCP port to listen on
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: u16,

    /// Directory to serve [default: client/dist]
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Interface to bind [default: 0.0.0.0]
    #[arg(long)]
    pub host: Option<String>,

    /// Configuration file, layered under the command line flags
    #[arg(long)]
    pub config: Option<String>,

    /// Disable the per-request access log
    #[arg(long)]
    pub quiet: bool,
}
