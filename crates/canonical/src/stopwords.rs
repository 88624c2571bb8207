//! French function words that carry no signal for similarity.

use crate::token::Token;

/// Fixed list of common short French function words.
///
/// Kept in byte order (so `"à"` sorts last) for binary search.
pub const FRENCH_STOP_WORDS: &[&str] = &[
    "au", "aux", "avec", "ce", "ces", "dans", "de", "des", "du", "elle", "en", "et", "eux",
    "il", "ils", "je", "la", "le", "les", "leur", "lui", "ma", "mais", "me", "mes", "moi", "mon",
    "ne", "nos", "notre", "nous", "on", "ou", "où", "par", "pas", "pour", "qu", "que", "qui",
    "sa", "se", "ses", "son", "sur", "ta", "te", "tes", "toi", "ton", "tu", "un", "une", "vos",
    "votre", "vous", "y", "à",
];

/// Returns true if `word` (already normalized) is a French stop word.
pub fn is_stop_word(word: &str) -> bool {
    FRENCH_STOP_WORDS.binary_search(&word).is_ok()
}

/// Drops stop words from a token stream, keeping the remaining order.
pub fn remove_stop_words(tokens: Vec<Token>) -> Vec<Token> {
    tokens
        .into_iter()
        .filter(|token| !is_stop_word(&token.text))
        .collect()
}
