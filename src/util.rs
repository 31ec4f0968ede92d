pub(crate) const API_PATH: &str = "/api/0.6";

/// `{base}/api/0.6/{path}`; tolerates a trailing slash or an `/api/0.6`
/// suffix already present on `base`.
pub(crate) fn api_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let base = base.strip_suffix(API_PATH).unwrap_or(base);
    format!("{}{}/{}", base, API_PATH, path.trim_start_matches('/'))
}

/// Appends an already-encoded query string.
pub(crate) fn append_query(url: &str, query: &str) -> String {
    if query.is_empty() {
        return url.to_string();
    }
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{}{}{}", url, sep, query)
}

pub(crate) fn truncate_for_log(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
