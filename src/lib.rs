//! Static file server with permissive CORS and disabled caching.
//!
//! Serves one directory over HTTP/1.x. Every response, errors included,
//! carries `Access-Control-Allow-Origin: *`, `Access-Control-Allow-Methods: GET`
//! and `Cache-Control: no-store, no-cache, must-revalidate`.

pub mod cli;
pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;

pub use error::ServerError;
