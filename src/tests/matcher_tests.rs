//! Cross-checking tests for the Aho-Corasick matcher.
//!
//! The automaton's output is compared against a naive quadratic scan over
//! every substring of the input.

use std::collections::BTreeSet;
use std::sync::Arc;

use proptest::prelude::*;

use super::test_utils::{small_alphabet_dictionary_strategy, small_alphabet_key_strategy};
use crate::data_structures::aho_corasick_matcher::AhoCorasickMatcher;
use crate::data_structures::lanai_trie::LanaiTrie;

/// Every `(start, end)` span such that `input[start..=end]` is a dictionary
/// word, found the slow way.
fn naive_spans(dictionary: &[Vec<u8>], input: &[u8]) -> BTreeSet<(usize, usize)> {
    let mut spans = BTreeSet::new();
    for start in 0..input.len() {
        for end in start..input.len() {
            if dictionary.iter().any(|word| word.as_slice() == &input[start..=end]) {
                spans.insert((start, end));
            }
        }
    }
    spans
}

proptest! {
    /// The automaton reports exactly the dictionary occurrences a naive scan
    /// finds, with no duplicates.
    #[test]
    fn prop_matches_equal_naive_scan(
        dictionary in small_alphabet_dictionary_strategy(8, 4),
        input in small_alphabet_key_strategy(24),
    ) {
        let matcher = AhoCorasickMatcher::new();
        for pattern in &dictionary {
            matcher.insert_pattern(pattern);
        }
        matcher.build();

        let spans: Vec<(usize, usize)> = matcher
            .find_iter(&input)
            .map(|m| (m.start, m.end))
            .collect();
        let unique: BTreeSet<(usize, usize)> = spans.iter().copied().collect();

        prop_assert_eq!(spans.len(), unique.len(), "duplicate span reported");
        prop_assert_eq!(unique, naive_spans(&dictionary, &input));
    }
}

/// The overlay also works over a value-carrying trie shared with other
/// consumers.
#[test]
fn test_overlay_on_shared_value_trie() {
    let trie = Arc::new(LanaiTrie::new());
    trie.insert(b"he", b"pronoun".to_vec());
    trie.insert(b"hers", b"possessive".to_vec());

    let matcher = AhoCorasickMatcher::from_trie(Arc::clone(&trie));
    matcher.build();

    let spans: Vec<(usize, usize)> = matcher
        .find_iter(b"hers")
        .map(|m| (m.start, m.end))
        .collect();
    assert_eq!(spans, vec![(0, 1), (0, 3)]);

    // The shared trie is still a plain trie to everyone else.
    assert_eq!(trie.find(b"hers"), Some(b"possessive".to_vec()));
}
