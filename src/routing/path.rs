//! Path canonicalization.
//!
//! Bare resource paths resolve to their `index` handler: `/posts` and
//! `/posts/` both become `/posts/index`.

const INDEX_SUFFIX: &str = "/index";

/// Canonical form of a request path.
///
/// - `/` stays `/`; paths ending in `/index` lose trailing slashes only
/// - paths with more than two segments and a non-empty last segment are kept
/// - everything else gets trailing slashes stripped and `/index` appended
pub fn canonicalize(path: &str) -> String {
    if path == "/" {
        return path.to_string();
    }
    if path.ends_with(INDEX_SUFFIX) {
        return path.trim_end_matches('/').to_string();
    }

    let segments: Vec<&str> = path.split('/').collect();
    if segments.len() > 2 && segments.last().is_some_and(|s| !s.is_empty()) {
        return path.to_string();
    }

    format!("{}{}", path.trim_end_matches('/'), INDEX_SUFFIX)
}

/// Prefix `/` if missing.
pub fn ensure_leading_slash(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}
