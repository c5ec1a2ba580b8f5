//! Static denylist of exploit-scanner request paths.
//!
//! # Design Decisions
//! - Patterns are fixed: scanner probes do not vary per deployment
//! - Matching is case-insensitive (scanners probe /WP-ADMIN too)
//! - No regex to guarantee O(n) matching

/// Path prefixes rejected outright. A match requires the prefix to be
/// followed by `/` or the end of the path, so `/wp-adminish` passes.
const BLOCKED_PREFIXES: &[&str] = &[
    "/cgi-bin",
    "/.git",
    "/.svn",
    "/.hg",
    "/wp-admin",
    "/wp-content",
    "/wp-includes",
    "/phpmyadmin",
];

/// Paths rejected by exact match.
const BLOCKED_PATHS: &[&str] = &["/wp-login.php"];

/// Final-segment extensions for server-side scripts and secret files.
const BLOCKED_EXTENSIONS: &[&str] = &[
    "php", "phtml", "asp", "aspx", "jsp", "cgi", "pl", "ini", "env", "sql", "bak", "old", "swp",
    "pem", "key",
];

/// Returns true if the path matches a known scanner/exploit probe.
pub fn is_denylisted(path: &str) -> bool {
    let path = path.to_ascii_lowercase();

    if has_blocked_extension(&path) {
        return true;
    }

    if BLOCKED_PATHS.contains(&path.as_str()) {
        return true;
    }

    // `/.env` also covers variants like `/.env.local`.
    if let Some(rest) = path.strip_prefix("/.env") {
        if rest.is_empty() || rest.starts_with('.') {
            return true;
        }
    }

    BLOCKED_PREFIXES.iter().any(|prefix| {
        path.strip_prefix(prefix)
            .map(|rest| rest.is_empty() || rest.starts_with('/'))
            .unwrap_or(false)
    })
}

fn has_blocked_extension(path: &str) -> bool {
    let segment = path.rsplit('/').next().unwrap_or("");
    segment
        .rsplit_once('.')
        .map(|(_, ext)| BLOCKED_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}
