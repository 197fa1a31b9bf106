//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from the file
//! system: fixed response headers, MIME detection, HTTP dates, request path
//! normalization and response builders.

pub mod cache;
pub mod headers;
pub mod html;
pub mod mime;
pub mod path;
pub mod response;

// Re-export commonly used items
pub use headers::apply_fixed_headers;
pub use path::RequestPath;
pub use response::{
    build_304_response, build_404_response, build_501_response, build_error_response,
    build_file_response, build_html_response, build_redirect_response,
};
