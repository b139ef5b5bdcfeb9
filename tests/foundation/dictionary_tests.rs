//! Integration tests for the word dictionary
//!
//! Tests file round-trips, id assignment and case handling.

use phoenix_foundation::{ErrorKind, WordDictionary, WordId};
use proptest::prelude::*;

// =============================================================================
// Files
// =============================================================================

#[test]
fn saved_dictionary_reloads_identically() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("base.dic");

    let mut dict = WordDictionary::parse("HELLO 1\nTHERE 7\n", "base.dic").unwrap();
    let added = dict.add_if_absent("world");
    assert_eq!(added, WordId::new(8));
    assert!(dict.is_dirty());

    dict.save(&path).unwrap();
    assert!(!dict.is_dirty());

    let reloaded = WordDictionary::load(&path).unwrap();
    assert_eq!(reloaded.render(), dict.render());
    assert_eq!(reloaded.lookup("WORLD"), Some(added));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = WordDictionary::load(dir.path().join("nope.dic")).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Io { .. }));
    assert!(err.to_string().contains("nope.dic"));
}

#[test]
fn zero_id_is_rejected_with_line() {
    let err = WordDictionary::parse("HELLO 1\nBAD 0\n", "base.dic").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Format { line: 2, .. }));
}

// =============================================================================
// Lookup
// =============================================================================

#[test]
fn lookup_ignores_case() {
    let dict = WordDictionary::parse("boston 3\n", "base.dic").unwrap();
    assert_eq!(dict.lookup("Boston"), Some(WordId::new(3)));
    assert_eq!(dict.word(WordId::new(3)), Some("BOSTON"));
    assert_eq!(dict.lookup("denver"), None);
}

proptest! {
    #[test]
    fn added_words_are_found_again(words in prop::collection::vec("[a-z]{1,8}", 1..20)) {
        let mut dict = WordDictionary::new();
        let ids: Vec<WordId> = words.iter().map(|w| dict.add_if_absent(w)).collect();
        for (word, id) in words.iter().zip(&ids) {
            prop_assert_eq!(dict.lookup(word), Some(*id));
            prop_assert_eq!(dict.add_if_absent(word), *id);
        }
        let mut distinct = words.iter().map(|w| w.to_uppercase()).collect::<Vec<_>>();
        distinct.sort();
        distinct.dedup();
        prop_assert_eq!(dict.len(), distinct.len());
    }

    #[test]
    fn normalize_is_idempotent(word in "\\PC{0,12}") {
        let once = WordDictionary::normalize(&word);
        prop_assert_eq!(WordDictionary::normalize(&once), once);
    }
}
