//! Whitespace normalization.
//!
//! Uses Unicode's definition of whitespace, so tabs, newlines, carriage
//! returns and non-breaking spaces all count as separators.
//!
//! ```rust
//! use canonical::collapse_whitespace;
//!
//! assert_eq!(collapse_whitespace("  le   chat\n\nnoir  "), "le chat noir");
//! ```

/// Collapses runs of whitespace into one ASCII space and trims both ends.
///
/// Returns an empty string for empty or whitespace-only input.
///
/// ```rust
/// use canonical::collapse_whitespace;
///
/// assert_eq!(collapse_whitespace("bonjour\t\tmonde"), "bonjour monde");
/// assert_eq!(collapse_whitespace("bonjour\r\nmonde"), "bonjour monde");
/// assert_eq!(collapse_whitespace("bonjour\u{00A0}monde"), "bonjour monde");
/// assert_eq!(collapse_whitespace("   \n\t "), "");
/// ```
pub fn collapse_whitespace(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len());
    for segment in text.split_whitespace() {
        if !normalized.is_empty() {
            normalized.push(' ');
        }
        normalized.push_str(segment);
    }
    normalized
}
