//! Logger module
//!
//! Provides logging utilities for the file server including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Error and warning logging
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::LoggingConfig;
use std::net::SocketAddr;
use std::path::Path;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &LoggingConfig) -> std::io::Result<()> {
    writer::init(
        config.access_log_file.as_deref(),
        config.error_log_file.as_deref(),
    )
}

/// Write to info/access log
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_info(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

/// Write to access log specifically
fn write_access(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

pub fn log_server_start(root: &Path, addr: &SocketAddr) {
    write_info(&format!("Serving files from: {}", root.display()));
    write_info(&format!("Listening on port: {}", addr.port()));
}

pub fn log_workers(workers: Option<usize>) {
    match workers {
        Some(n) => write_info(&format!("[CONFIG] Using {n} worker threads")),
        None => write_info("[CONFIG] Using default worker threads (CPU cores)"),
    }
}

pub fn log_signal(name: &str) {
    write_info(&signal_message(name));
}

/// One line per signal, so file-backed logs stay line-oriented
fn signal_message(name: &str) -> String {
    format!("[SIGNAL] {name} received")
}

pub fn log_shutdown() {
    write_info("Stopping server.");
}

pub fn log_drain_timeout(remaining: usize) {
    log_warning(&format!(
        "Shutdown grace period elapsed with {remaining} connection(s) still open"
    ));
}

pub fn log_connection_error(err: &impl std::fmt::Display) {
    write_error(&format!("[ERROR] Failed to serve connection: {err}"));
}

/// A request hyper refused to parse; answered by hyper with a bare 400
pub fn log_rejected_request(peer: &SocketAddr, err: &impl std::fmt::Display) {
    log_warning(&format!("Rejected malformed request from {peer}: {err}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

/// Fatal startup errors always reach the terminal, even with an error log file
pub fn log_fatal(err: &impl std::fmt::Display) {
    eprintln!("Error: {err}");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}
