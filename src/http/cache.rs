//! HTTP conditional request module
//!
//! `Last-Modified` formatting and `If-Modified-Since` evaluation. Responses
//! still carry `Cache-Control: no-store`, but clients that revalidate anyway
//! get a cheap 304.

use chrono::{DateTime, NaiveDateTime, Utc};
use std::time::SystemTime;

/// IMF-fixdate, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Format a timestamp as an HTTP date
pub fn format_http_date(time: SystemTime) -> String {
    let time: DateTime<Utc> = time.into();
    time.format(HTTP_DATE_FORMAT).to_string()
}

/// Parse an IMF-fixdate; other legacy formats are treated as absent
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value.trim(), HTTP_DATE_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Check whether the client's copy is still current
///
/// `If-None-Match` takes precedence: when the client sent one, the date is
/// ignored. Comparison is done at whole-second precision.
///
/// # Returns
/// Returns true if a 304 should be sent
pub fn is_not_modified(
    if_modified_since: Option<&str>,
    if_none_match: Option<&str>,
    modified: SystemTime,
) -> bool {
    if if_none_match.is_some() {
        return false;
    }
    let Some(since) = if_modified_since.and_then(parse_http_date) else {
        return false;
    };
    let modified: DateTime<Utc> = modified.into();
    modified.timestamp() <= since.timestamp()
}
