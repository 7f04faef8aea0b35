//! Shared Aho–Corasick scenarios run against both
//! representations (`AcTrie` and `DatTrie`) to confirm they agree.

use warden::{AcTrie, DatTrie};

trait Matcher {
    fn contains_word(&self, text: &str) -> bool;
    fn replace_word(&self, text: &str, ch: char) -> String;
}

impl Matcher for AcTrie {
    fn contains_word(&self, text: &str) -> bool {
        AcTrie::contains_word(self, text)
    }
    fn replace_word(&self, text: &str, ch: char) -> String {
        AcTrie::replace_word(self, text, ch)
    }
}

impl Matcher for DatTrie {
    fn contains_word(&self, text: &str) -> bool {
        DatTrie::contains_word(self, text)
    }
    fn replace_word(&self, text: &str, ch: char) -> String {
        DatTrie::replace_word(self, text, ch)
    }
}

fn ac_trie(words: &[&str]) -> AcTrie {
    let mut t = AcTrie::new();
    for w in words {
        t.add_word(w);
    }
    t.build();
    t
}

fn dat_trie(words: &[&str]) -> DatTrie {
    let mut t = DatTrie::new();
    for w in words {
        t.add_word(w);
    }
    t.build();
    t
}

fn assert_scenario(words: &[&str], text: &str, contains: bool, replaced: &str) {
    let at = ac_trie(words);
    let dt = dat_trie(words);
    for (name, m) in [("AcTrie", &at as &dyn Matcher), ("DatTrie", &dt as &dyn Matcher)] {
        assert_eq!(m.contains_word(text), contains, "{name}: contains_word({text:?})");
        assert_eq!(m.replace_word(text, '*'), replaced, "{name}: replace_word({text:?})");
    }
}

#[test]
fn basic_substring_and_replace() {
    assert_scenario(&["h", "she"], "shs", true, "s*s");
    assert_scenario(&["h", "she"], "p", false, "p");
    assert_scenario(&["h", "she"], "h", true, "*");
}

#[test]
fn fail_link_chases_across_overlapping_dictionary_words() {
    assert_scenario(&["her", "say", "she", "shr"], "asherp", true, "a***rp");
}

#[test]
fn ascii_case_folding() {
    assert_scenario(&["abc"], "ABC", true, "***");
}

#[test]
fn full_width_ascii_folds_to_half_width() {
    assert_scenario(&["ab"], "\u{FF41}\u{FF42}", true, "**");
}

#[test]
fn whitespace_is_skipped_for_matching_but_preserved_on_replace() {
    assert_scenario(&["abc"], "a b c", true, "* * *");
}

#[test]
fn no_match_returns_the_original_string_unmodified() {
    let at = ac_trie(&["zzz"]);
    let dt = dat_trie(&["zzz"]);
    assert_eq!(at.replace_word("hello world", '*'), "hello world");
    assert_eq!(dt.replace_word("hello world", '*'), "hello world");
}

#[test]
fn add_word_after_build_has_no_effect_on_either_representation() {
    let mut at = ac_trie(&["abc"]);
    at.add_word("xyz");
    assert!(!at.contains_word("xyz"));

    let mut dt = dat_trie(&["abc"]);
    dt.add_word("xyz");
    assert!(!dt.contains_word("xyz"));
}

#[test]
fn large_dictionary_agrees_between_pointer_trie_and_double_array() {
    let words: Vec<String> = (0..500).map(|i| format!("word{i}suffix")).collect();
    let refs: Vec<&str> = words.iter().map(String::as_str).collect();
    let at = ac_trie(&refs);
    let dt = dat_trie(&refs);

    let samples = [
        "this contains word123suffix somewhere",
        "nothing interesting here",
        "word0suffix and word499suffix both appear",
        "WORD250SUFFIX in upper case",
    ];
    for text in samples {
        assert_eq!(at.contains_word(text), dt.contains_word(text), "mismatch for {text:?}");
        assert_eq!(at.replace_word(text, '#'), dt.replace_word(text, '#'), "mismatch for {text:?}");
    }
}
