//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, dispatch to
//! the static file handler, fixed header stamping and access logging.

use crate::config::AppState;
use crate::handler::static_files;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body as _, Bytes};
use hyper::header::{
    HeaderMap, HeaderValue, IF_MODIFIED_SINCE, IF_NONE_MATCH, REFERER, SERVER, USER_AGENT,
};
use hyper::http::request::Parts;
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    /// Raw (still percent-encoded) request path
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub is_head: bool,
    pub if_modified_since: Option<&'a str>,
    pub if_none_match: Option<&'a str>,
}

impl<'a> RequestContext<'a> {
    pub fn from_parts(parts: &'a Parts) -> Self {
        Self {
            path: parts.uri.path(),
            query: parts.uri.query(),
            is_head: parts.method == Method::HEAD,
            if_modified_since: header_str(&parts.headers, &IF_MODIFIED_SINCE),
            if_none_match: header_str(&parts.headers, &IF_NONE_MATCH),
        }
    }
}

/// Main entry point for HTTP request handling
///
/// Every response, errors included, leaves with the fixed CORS and
/// cache-control headers. Request bodies are never read.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let (parts, _) = req.into_parts();

    let mut response = dispatch(&parts, &state).await;
    finalize_response(&mut response, &state, parts.method == Method::HEAD);

    if state.access_log {
        log_access(&parts, &response, peer_addr, started, &state);
    }

    Ok(response)
}

async fn dispatch(parts: &Parts, state: &AppState) -> Response<Full<Bytes>> {
    match parts.method {
        Method::GET | Method::HEAD => {
            let ctx = RequestContext::from_parts(parts);
            static_files::serve(&ctx, state).await
        }
        ref method => http::build_501_response(method),
    }
}

/// Apply headers common to all responses; HEAD keeps `Content-Length` but
/// drops the body
fn finalize_response(response: &mut Response<Full<Bytes>>, state: &AppState, is_head: bool) {
    http::apply_fixed_headers(response.headers_mut());

    match HeaderValue::from_str(&state.config.http.server_name) {
        Ok(value) => {
            response.headers_mut().insert(SERVER, value);
        }
        Err(_) => logger::log_warning(&format!(
            "Invalid server name '{}', Server header omitted",
            state.config.http.server_name
        )),
    }

    if is_head {
        *response.body_mut() = Full::new(Bytes::new());
    }
}

fn log_access(
    req: &Parts,
    response: &Response<Full<Bytes>>,
    peer_addr: SocketAddr,
    started: Instant,
    state: &AppState,
) {
    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method.to_string(),
        req.uri.path().to_string(),
    );
    entry.query = req.uri.query().map(ToString::to_string);
    entry.http_version = format!("{:?}", req.version)
        .trim_start_matches("HTTP/")
        .to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response.body().size_hint().exact();
    entry.referer = header_str(&req.headers, &REFERER).map(ToString::to_string);
    entry.user_agent = header_str(&req.headers, &USER_AGENT).map(ToString::to_string);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    logger::log_access(&entry, &state.config.logging.access_log_format);
}

fn header_str<'a>(headers: &'a HeaderMap, name: &hyper::header::HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
