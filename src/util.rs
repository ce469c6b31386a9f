use http::{HeaderMap, Uri};

use crate::RoutexResult;
use crate::error::ApiError;

const BODY_LOG_LIMIT: usize = 2048;

// An empty path addresses the base host itself, byte for byte;
// otherwise host and path join with exactly one slash between them.
pub(crate) fn target_url(base_host: &str, path: &str) -> RoutexResult<(String, Uri)> {
    let url = if path.is_empty() {
        base_host.to_owned()
    } else {
        let base = base_host.trim_end_matches('/');
        let relative = path.trim_start_matches('/');
        format!("{base}/{relative}")
    };
    let uri: Uri = url
        .parse()
        .map_err(|_| ApiError::InvalidUrl { url: url.clone() })?;
    if !matches!(uri.scheme_str(), Some("http") | Some("https")) || uri.host().is_none() {
        return Err(ApiError::InvalidUrl { url });
    }
    Ok((url, uri))
}

// RFC 3986 unreserved plus sub-delims plus :@/? stay verbatim.
// Already-encoded input is encoded again, so callers pass raw paths.
pub(crate) fn percent_encode_query(text: &str) -> String {
    let mut encoded = String::with_capacity(text.len());
    for byte in text.bytes() {
        if is_query_allowed(byte) {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    encoded
}

const fn is_query_allowed(byte: u8) -> bool {
    byte.is_ascii_alphanumeric()
        || matches!(
            byte,
            b'-' | b'.'
                | b'_'
                | b'~'
                | b'!'
                | b'$'
                | b'&'
                | b'\''
                | b'('
                | b')'
                | b'*'
                | b'+'
                | b','
                | b';'
                | b'='
                | b':'
                | b'@'
                | b'/'
                | b'?'
        )
}

// Client defaults merge under request headers; the request wins.
pub(crate) fn merge_headers(defaults: &HeaderMap, request: &HeaderMap) -> HeaderMap {
    let mut merged = defaults.clone();
    for (name, value) in request {
        merged.insert(name, value.clone());
    }
    merged
}

pub(crate) fn truncate_body(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    if text.chars().count() <= BODY_LOG_LIMIT {
        return text.into_owned();
    }
    let truncated: String = text.chars().take(BODY_LOG_LIMIT).collect();
    format!("{truncated}...(truncated)")
}
