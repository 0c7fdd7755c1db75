//! Input normalization applied before texts are sent to the provider.

/// Replace every newline with a single space.
pub fn normalize_text(text: &str) -> String {
    text.replace('\n', " ")
}
