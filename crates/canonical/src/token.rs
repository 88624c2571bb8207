use serde::{Deserialize, Serialize};

/// A normalized word with its UTF-8 byte offsets in the normalized text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Token {
    /// The word itself.
    pub text: String,
    /// Byte offset (inclusive) in the normalized text.
    pub start: usize,
    /// Byte offset (exclusive) in the normalized text.
    pub end: usize,
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        self.text.as_str()
    }
}

/// Splits normalized text on Unicode whitespace into non-empty tokens.
///
/// Assumes `text` already went through the normalizer. Offsets point into
/// `text` as given.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;

    for (idx, ch) in text.char_indices() {
        if ch.is_whitespace() {
            if let Some(token_start) = start.take() {
                tokens.push(Token {
                    text: text[token_start..idx].to_string(),
                    start: token_start,
                    end: idx,
                });
            }
        } else if start.is_none() {
            start = Some(idx);
        }
    }

    if let Some(token_start) = start {
        tokens.push(Token {
            text: text[token_start..].to_string(),
            start: token_start,
            end: text.len(),
        });
    }

    tokens
}

/// Rebuilds a single-spaced text from `tokens`, rewriting their offsets to
/// point into the returned string.
pub(crate) fn rejoin(tokens: &mut [Token]) -> String {
    let mut text = String::with_capacity(tokens.iter().map(|t| t.text.len() + 1).sum());
    for token in tokens.iter_mut() {
        if !text.is_empty() {
            text.push(' ');
        }
        token.start = text.len();
        text.push_str(&token.text);
        token.end = text.len();
    }
    text
}
