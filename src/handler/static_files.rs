//! Static file serving module
//!
//! Maps a request path onto the serve root: index files, directory listings,
//! trailing-slash redirects and file responses with MIME detection.

use crate::config::{AppState, ServeRoot};
use crate::handler::listing;
use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime, RequestPath};
use crate::logger;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use http_body_util::Full;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Serve a GET/HEAD request from the serve root
pub async fn serve(ctx: &RequestContext<'_>, state: &AppState) -> Response<Full<Bytes>> {
    let Some(request_path) = RequestPath::parse(ctx.path) else {
        return http::build_404_response();
    };

    let target = state.root.path().join(&request_path.relative);
    let Some(resolved) = resolve_within_root(&target, &state.root, ctx.path).await else {
        return http::build_404_response();
    };
    let Ok(metadata) = fs::metadata(&resolved).await else {
        return http::build_404_response();
    };

    if metadata.is_dir() {
        return serve_directory(ctx, state, &request_path, &resolved).await;
    }

    // A file addressed as if it were a directory
    if request_path.trailing_slash {
        return http::build_404_response();
    }

    serve_file(ctx, &resolved, &target).await
}

/// Canonicalize `target` and make sure it did not leave the root (symlinks)
///
/// Missing files are common (404), so only escapes are logged.
async fn resolve_within_root(target: &Path, root: &ServeRoot, raw_path: &str) -> Option<PathBuf> {
    let canonical = fs::canonicalize(target).await.ok()?;
    if root.contains(&canonical) {
        Some(canonical)
    } else {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {raw_path} -> {}",
            canonical.display()
        ));
        None
    }
}

async fn serve_directory(
    ctx: &RequestContext<'_>,
    state: &AppState,
    request_path: &RequestPath,
    dir: &Path,
) -> Response<Full<Bytes>> {
    if !request_path.trailing_slash {
        let location = match ctx.query {
            Some(query) => format!("{}?{query}", request_path.directory_url()),
            None => request_path.directory_url(),
        };
        return http::build_redirect_response(&location);
    }

    for index_file in &state.config.http.index_files {
        let candidate = dir.join(index_file);
        let Some(resolved) = resolve_within_root(&candidate, &state.root, ctx.path).await else {
            continue;
        };
        if fs::metadata(&resolved).await.is_ok_and(|m| m.is_file()) {
            return serve_file(ctx, &resolved, &candidate).await;
        }
    }

    if !state.config.http.directory_listing {
        return http::build_404_response();
    }

    match listing::read_entries(dir).await {
        Ok(entries) => http::build_html_response(listing::render(&request_path.decoded, &entries)),
        Err(e) => {
            logger::log_warning(&format!(
                "Failed to list directory '{}': {e}",
                dir.display()
            ));
            http::build_error_response(StatusCode::NOT_FOUND, "No permission to list directory")
        }
    }
}

/// Serve file contents from `file`; the Content-Type follows the requested
/// name so symlinked assets keep their public extension
async fn serve_file(
    ctx: &RequestContext<'_>,
    file: &Path,
    requested: &Path,
) -> Response<Full<Bytes>> {
    let modified = match fs::metadata(file).await {
        Ok(metadata) => metadata.modified().ok(),
        Err(_) => return http::build_404_response(),
    };

    if let Some(modified) = modified {
        if cache::is_not_modified(ctx.if_modified_since, ctx.if_none_match, modified) {
            return http::build_304_response();
        }
    }

    let content = match fs::read(file).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!("Failed to read file '{}': {e}", file.display()));
            return http::build_404_response();
        }
    };

    let last_modified = modified.map(cache::format_http_date);
    http::build_file_response(
        Bytes::from(content),
        mime::content_type_for(requested),
        last_modified.as_deref(),
    )
}
