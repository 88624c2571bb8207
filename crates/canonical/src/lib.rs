//! Plagiat text normalizer.
//!
//! Turns raw submission text into comparable words. Downstream the
//! similarity engine only ever sees the output of this crate.
//!
//! ## What we do
//!
//! - Unicode NFC composition (on by default) so accents survive filtering
//! - Lowercasing
//! - Letter filtering against a configurable alphabet (French by default);
//!   digits, punctuation and symbols vanish without leaving a gap
//! - Whitespace collapsing and tokenization with byte offsets
//! - Optional French stop-word removal (off unless asked for)
//!
//! ## Pure function guarantee
//!
//! No I/O, no clock calls, no locale dependence. Same text and config, same
//! document.
//!
//! ```rust
//! use canonical::{normalize, NormalizeConfig};
//!
//! let doc = normalize("Le chat mange une souris.", &NormalizeConfig::default()).unwrap();
//! let words: Vec<&str> = doc.words().collect();
//! assert_eq!(words, vec!["le", "chat", "mange", "une", "souris"]);
//! ```

mod config;
mod document;
mod error;
mod pipeline;
mod stopwords;
mod token;
mod whitespace;

pub use crate::config::{Alphabet, NormalizeConfig, FRENCH_ACCENTED_LETTERS};
pub use crate::document::NormalizedDocument;
pub use crate::error::NormalizeError;
pub use crate::pipeline::{clean_text, normalize};
pub use crate::stopwords::{is_stop_word, remove_stop_words, FRENCH_STOP_WORDS};
pub use crate::token::{tokenize, Token};
pub use crate::whitespace::collapse_whitespace;
