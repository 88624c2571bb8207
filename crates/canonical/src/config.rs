//! Configuration types for the normalization pipeline.
//!
//! This module defines [`NormalizeConfig`], which controls how raw submission
//! text is turned into comparable tokens, and [`Alphabet`], which decides
//! which characters count as letters.
//!
//! # Versioning
//!
//! The `version` field tracks normalization behavior. Any change that alters
//! the normalized output for some input (even a bug fix) must come with a
//! version bump so that stored scores can be traced back to the rules that
//! produced them.
//!
//! # Examples
//!
//! ## Default Configuration
//!
//! ```rust
//! use canonical::{Alphabet, NormalizeConfig};
//!
//! let config = NormalizeConfig::default();
//! assert_eq!(config.version, 1);
//! assert!(config.normalize_unicode);
//! assert_eq!(config.alphabet, Alphabet::French);
//! assert!(!config.remove_stop_words);
//! ```
//!
//! ## Accepting Any Script
//!
//! ```rust
//! use canonical::{Alphabet, NormalizeConfig};
//!
//! let config = NormalizeConfig {
//!     alphabet: Alphabet::Unicode,
//!     ..Default::default()
//! };
//! ```

use serde::{Deserialize, Serialize};
use unicode_categories::UnicodeCategories;

use crate::error::NormalizeError;

/// Accented letters kept by [`Alphabet::French`] in addition to `a-z`.
pub const FRENCH_ACCENTED_LETTERS: &[char] = &[
    'à', 'â', 'ç', 'é', 'è', 'ê', 'ë', 'î', 'ï', 'ô', 'û', 'ù', 'ü', 'ÿ', 'ñ', 'æ', 'œ',
];

/// The set of characters treated as letters after lowercasing.
///
/// Every other non-whitespace character is removed from the text. Removal
/// never inserts a separator, so `"l'école"` becomes `"lécole"` and
/// `"abc123def"` becomes `"abcdef"`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Alphabet {
    /// ASCII `a-z` plus the French accented set in [`FRENCH_ACCENTED_LETTERS`].
    #[default]
    French,
    /// Any character in a Unicode letter category (`L*`).
    Unicode,
}

impl Alphabet {
    /// Returns true when `ch` (already lowercased) is kept by this alphabet.
    pub fn contains(&self, ch: char) -> bool {
        match self {
            Alphabet::French => ch.is_ascii_lowercase() || FRENCH_ACCENTED_LETTERS.contains(&ch),
            Alphabet::Unicode => ch.is_letter(),
        }
    }
}

/// Configuration for the normalization pipeline.
///
/// `NormalizeConfig` is cheap to clone and serializable so it can be carried
/// in YAML pipeline files.
///
/// ```json
/// {
///   "version": 1,
///   "normalize_unicode": true,
///   "alphabet": "french",
///   "remove_stop_words": false
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NormalizeConfig {
    /// Version of the normalization rules. Must be >= 1; version 0 is
    /// reserved and rejected with [`NormalizeError::InvalidConfig`].
    pub version: u32,

    /// If true, apply Unicode NFC composition before any other step.
    ///
    /// Composition merges a base letter and a combining accent into the
    /// precomposed letter, so that both encodings of the same word survive
    /// letter filtering identically:
    ///
    /// ```text
    /// "Café" (U+00E9)        → "café"
    /// "Cafe" + U+0301        → "café"
    /// ```
    ///
    /// With composition disabled the combining accent is not a letter and is
    /// dropped, leaving `"cafe"`.
    ///
    /// # Default
    ///
    /// `true`
    pub normalize_unicode: bool,

    /// Which characters count as letters.
    ///
    /// # Default
    ///
    /// [`Alphabet::French`]
    #[serde(default)]
    pub alphabet: Alphabet,

    /// If true, drop French function words (see
    /// [`FRENCH_STOP_WORDS`](crate::FRENCH_STOP_WORDS)) from the token stream.
    ///
    /// The scoring path never filters stop words unless a caller sets this
    /// explicitly.
    ///
    /// # Default
    ///
    /// `false`
    #[serde(default)]
    pub remove_stop_words: bool,
}

impl NormalizeConfig {
    /// Reject configurations that cannot produce stable output.
    pub fn validate(&self) -> Result<(), NormalizeError> {
        if self.version == 0 {
            return Err(NormalizeError::InvalidConfig(
                "config version must be >= 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            version: 1,
            normalize_unicode: true,
            alphabet: Alphabet::French,
            remove_stop_words: false,
        }
    }
}
