//! Filename sanitization.

/// Map a raw filename to a form downstream media tooling accepts.
///
/// Spaces become hyphens and plus signs become underscores. Neither
/// replacement character is itself rewritten, so applying the function twice
/// is the same as applying it once. Distinct inputs may collide; callers
/// that materialize files under sanitized names deal with that.
pub fn sanitize_name(name: &str) -> String {
    name.replace(' ', "-").replace('+', "_")
}
