use std::borrow::Cow;

use unicode_normalization::UnicodeNormalization;

use crate::config::{Alphabet, NormalizeConfig};
use crate::document::NormalizedDocument;
use crate::error::NormalizeError;
use crate::stopwords::remove_stop_words;
use crate::token::{rejoin, Token};

/// Main entry point. Turns raw submission text into a [`NormalizedDocument`].
///
/// Fails with [`NormalizeError::EmptyInput`] when the text is blank, or when
/// no word survives normalization (and stop-word removal, if enabled).
pub fn normalize(input: &str, cfg: &NormalizeConfig) -> Result<NormalizedDocument, NormalizeError> {
    cfg.validate()?;

    if input.trim().is_empty() {
        tracing::debug!("rejecting blank input");
        return Err(NormalizeError::EmptyInput);
    }

    let (mut normalized_text, mut tokens) = run(input, cfg);

    if cfg.remove_stop_words {
        tokens = remove_stop_words(tokens);
        normalized_text = rejoin(&mut tokens);
    }

    if tokens.is_empty() {
        tracing::debug!(input_len = input.len(), "no words left after normalization");
        return Err(NormalizeError::EmptyInput);
    }

    Ok(NormalizedDocument {
        normalized_text,
        tokens,
        config: cfg.clone(),
    })
}

/// Lowercases, strips non-letters and collapses whitespace without
/// tokenizing or rejecting anything. Blank input yields an empty string.
///
/// ```rust
/// use canonical::{clean_text, NormalizeConfig};
///
/// let cfg = NormalizeConfig::default();
/// assert_eq!(clean_text("L'école, c'est 100% COOL !", &cfg), "lécole cest cool");
/// ```
pub fn clean_text(input: &str, cfg: &NormalizeConfig) -> String {
    run(input, cfg).0
}

/// Single pass producing the normalized text and its tokens together.
fn run(input: &str, cfg: &NormalizeConfig) -> (String, Vec<Token>) {
    // Composition comes first: it decides whether an accent is a separate
    // (droppable) code point or part of the letter.
    let composed: Cow<str> = if cfg.normalize_unicode {
        Cow::Owned(input.nfc().collect::<String>())
    } else {
        Cow::Borrowed(input)
    };

    // Case mapping needs the whole string: final sigma depends on what
    // follows it, and İ expands to i + U+0307.
    let lowered = composed.to_lowercase();

    let mut state = State {
        text: String::with_capacity(lowered.len()),
        tokens: Vec::with_capacity((lowered.len() / 5).saturating_add(1)),
        pending_space: false,
        token_start: None,
    };

    for ch in lowered.chars() {
        state.dispatch_char(ch, cfg.alphabet);
    }
    state.finalize_token();

    (state.text, state.tokens)
}

struct State {
    text: String,
    tokens: Vec<Token>,
    pending_space: bool,
    token_start: Option<usize>,
}

impl State {
    /// Whitespace ends the current word; letters extend it; anything else is
    /// dropped in place so the letters around it join up.
    fn dispatch_char(&mut self, ch: char, alphabet: Alphabet) {
        if ch.is_whitespace() {
            self.finalize_token();
            if !self.text.is_empty() {
                self.pending_space = true;
            }
        } else if alphabet.contains(ch) {
            self.append_char(ch);
        }
    }

    fn append_char(&mut self, ch: char) {
        if self.pending_space {
            self.text.push(' ');
            self.pending_space = false;
            self.token_start = Some(self.text.len());
        } else if self.token_start.is_none() {
            self.token_start = Some(self.text.len());
        }
        self.text.push(ch);
    }

    fn finalize_token(&mut self) {
        if let Some(start) = self.token_start.take() {
            if start < self.text.len() {
                let end = self.text.len();
                self.tokens.push(Token {
                    text: self.text[start..end].to_string(),
                    start,
                    end,
                });
            }
        }
    }
}
