//! Word-level differences between two documents.

use canonical::NormalizedDocument;
use serde::{Deserialize, Serialize};

/// Partition of the distinct words of two documents.
///
/// Every list is sorted lexicographically. `common ∪ unique1` is exactly the
/// word set of the first document, and the three lists are pairwise disjoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Difference {
    pub common: Vec<String>,
    pub unique1: Vec<String>,
    pub unique2: Vec<String>,
}

impl Difference {
    /// Sizes of `(common, unique1, unique2)`.
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.common.len(), self.unique1.len(), self.unique2.len())
    }
}

/// Computes which distinct words the two documents share and which are
/// specific to each.
///
/// ```rust
/// use canonical::{normalize, NormalizeConfig};
/// use matcher::diff;
///
/// let cfg = NormalizeConfig::default();
/// let a = normalize("le chat noir", &cfg).unwrap();
/// let b = normalize("le chien noir", &cfg).unwrap();
/// let d = diff(&a, &b);
/// assert_eq!(d.common, vec!["le", "noir"]);
/// assert_eq!(d.unique1, vec!["chat"]);
/// assert_eq!(d.unique2, vec!["chien"]);
/// ```
pub fn diff(doc1: &NormalizedDocument, doc2: &NormalizedDocument) -> Difference {
    let set1 = doc1.token_set();
    let set2 = doc2.token_set();
    // BTreeSet iteration is already in sorted order.
    Difference {
        common: set1.intersection(&set2).map(|w| (*w).to_string()).collect(),
        unique1: set1.difference(&set2).map(|w| (*w).to_string()).collect(),
        unique2: set2.difference(&set1).map(|w| (*w).to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canonical::{normalize, NormalizeConfig};

    fn doc(text: &str) -> NormalizedDocument {
        normalize(text, &NormalizeConfig::default()).unwrap()
    }

    #[test]
    fn identical_documents_share_everything() {
        let a = doc("Le chat mange une souris");
        let d = diff(&a, &a);
        assert_eq!(d.common, vec!["chat", "le", "mange", "souris", "une"]);
        assert!(d.unique1.is_empty());
        assert!(d.unique2.is_empty());
        assert_eq!(d.counts(), (5, 0, 0));
    }

    #[test]
    fn partition_laws_hold() {
        let a = doc("un deux trois quatre deux");
        let b = doc("trois quatre cinq six");
        let d = diff(&a, &b);

        let mut left: Vec<String> = d.common.iter().chain(&d.unique1).cloned().collect();
        left.sort();
        let expected: Vec<String> = a.token_set().into_iter().map(String::from).collect();
        assert_eq!(left, expected);

        let mut right: Vec<String> = d.common.iter().chain(&d.unique2).cloned().collect();
        right.sort();
        let expected: Vec<String> = b.token_set().into_iter().map(String::from).collect();
        assert_eq!(right, expected);

        for w in &d.unique1 {
            assert!(!d.common.contains(w) && !d.unique2.contains(w));
        }
    }

    #[test]
    fn disjoint_documents_share_nothing() {
        let d = diff(&doc("chat noir"), &doc("chien blanc"));
        assert!(d.common.is_empty());
        assert_eq!(d.unique1, vec!["chat", "noir"]);
        assert_eq!(d.unique2, vec!["blanc", "chien"]);
    }

    #[test]
    fn diff_is_mirror_symmetric() {
        let a = doc("alpha beta gamma");
        let b = doc("beta delta");
        let ab = diff(&a, &b);
        let ba = diff(&b, &a);
        assert_eq!(ab.common, ba.common);
        assert_eq!(ab.unique1, ba.unique2);
        assert_eq!(ab.unique2, ba.unique1);
    }
}
