//! The normalized form of one submission.
//!
//! A [`NormalizedDocument`] is what the similarity engine consumes. It holds
//! the normalized text, the ordered token stream (duplicates kept, so that
//! frequency measures see repetitions) and the configuration it was built
//! with.
//!
//! ```rust
//! use canonical::{normalize, NormalizeConfig};
//!
//! let doc = normalize("Le chat, le CHAT!", &NormalizeConfig::default()).unwrap();
//! assert_eq!(doc.normalized_text, "le chat le chat");
//! assert_eq!(doc.len(), 4);
//! assert_eq!(doc.token_set().len(), 2);
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::NormalizeConfig;
use crate::token::Token;

/// Output of [`normalize()`](crate::normalize).
///
/// Never empty: the normalizer rejects inputs that leave no tokens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NormalizedDocument {
    /// Lowercased, letter-only text with single spaces between words.
    pub normalized_text: String,

    /// Words in their original order, with byte offsets into
    /// `normalized_text`.
    pub tokens: Vec<Token>,

    /// Snapshot of the configuration used.
    pub config: NormalizeConfig,
}

impl NormalizedDocument {
    /// Iterates over the words in order, duplicates included.
    pub fn words(&self) -> impl Iterator<Item = &str> + '_ {
        self.tokens.iter().map(|t| t.text.as_str())
    }

    /// The distinct words, in lexicographic order.
    pub fn token_set(&self) -> BTreeSet<&str> {
        self.words().collect()
    }

    /// Number of words, duplicates included.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Version of the normalization rules that produced this document.
    pub fn version(&self) -> u32 {
        self.config.version
    }
}
