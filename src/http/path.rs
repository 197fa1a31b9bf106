//! Request path normalization
//!
//! Turns the raw request target into a relative path that can only point at
//! or below the serve root. `..` is resolved lexically and never climbs past
//! the root, so `/../../etc/passwd` maps to `etc/passwd` under the root.

use percent_encoding::percent_decode_str;
use std::path::PathBuf;

use super::html::encode_link;

/// A decoded, normalized request path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPath {
    /// Decoded path as the client asked for it, used for listing titles
    pub decoded: String,
    /// Normalized segments joined into a relative path
    pub relative: PathBuf,
    /// Whether the raw path ended with `/`
    pub trailing_slash: bool,
}

impl RequestPath {
    /// Parse a request path (query and fragment are stripped first).
    ///
    /// Returns `None` for segments that could address something other than a
    /// single directory entry: embedded backslashes or NUL bytes.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.split(['?', '#']).next().unwrap_or_default();
        let decoded = percent_decode_str(raw).decode_utf8_lossy().into_owned();
        let trailing_slash = decoded.ends_with('/');

        let mut segments: Vec<&str> = Vec::new();
        for segment in decoded.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                s if s.contains(['\\', '\0']) => return None,
                s => segments.push(s),
            }
        }

        let relative = segments.iter().collect();
        Some(Self {
            decoded,
            relative,
            trailing_slash,
        })
    }

    /// Normalized path with a trailing slash, percent-encoded for a
    /// `Location` header. Always starts with exactly one `/`.
    pub fn directory_url(&self) -> String {
        let mut url = String::from("/");
        for segment in &self.relative {
            url.push_str(&encode_link(&segment.to_string_lossy()));
            url.push('/');
        }
        url
    }
}
