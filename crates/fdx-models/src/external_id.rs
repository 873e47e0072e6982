//! External image id sanitization.

/// Sanitize an object key into an external image id.
///
/// The vision service only accepts ids over `[A-Za-z0-9_.:-]`; every other
/// character (path separators included) is replaced with an underscore.
pub fn sanitize_external_id(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | ':' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
