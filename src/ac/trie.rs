// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Pointer-style Aho–Corasick automaton (arena-indexed rather than raw
//! pointers, since this crate forbids `unsafe`). Used directly for small
//! dictionaries, and as the build-time scaffold [`DatTrie`](crate::ac::dat::DatTrie)
//! compiles into a double array.

use std::collections::VecDeque;

use crate::ac::normalize::{is_whitespace, normalize, Normalized};

const ROOT: usize = 0;

pub(crate) struct TrieNode {
    ch: char,
    output: bool,
    parent: usize,
    fail: usize,
    children: Vec<usize>,
    /// Scratch slot written by `DatTrie`'s compile pass (the node's
    /// assigned double-array state). Unused by `AcTrie` itself.
    state: u32,
}

/// A pointer-based (arena-indexed) Aho–Corasick trie.
pub struct AcTrie {
    nodes: Vec<TrieNode>,
    built: bool,
}

impl Default for AcTrie {
    fn default() -> Self {
        Self::new()
    }
}

impl AcTrie {
    pub fn new() -> Self {
        Self {
            nodes: vec![TrieNode {
                ch: '\0',
                output: false,
                parent: ROOT,
                fail: ROOT,
                children: Vec::new(),
                state: 0,
            }],
            built: false,
        }
    }

    /// Register a dictionary word. Ignored once [`Self::build`] has run —
    /// the DAT's open question on post-build mutation applies here too:
    /// treat it as undefined and simply drop it.
    pub fn add_word(&mut self, word: &str) {
        if self.built {
            return;
        }
        let mut cur = ROOT;
        for c in word.chars() {
            let ch = match normalize(c) {
                Normalized::Whitespace => continue,
                Normalized::Rune(r) => r,
            };
            cur = self.child_or_insert(cur, ch);
        }
        self.nodes[cur].output = true;
    }

    fn find_child(&self, node: usize, ch: char) -> Option<usize> {
        let children = &self.nodes[node].children;
        children
            .binary_search_by(|&idx| self.nodes[idx].ch.cmp(&ch))
            .ok()
            .map(|pos| children[pos])
    }

    fn child_or_insert(&mut self, parent: usize, ch: char) -> usize {
        let pos = self.nodes[parent]
            .children
            .binary_search_by(|&idx| self.nodes[idx].ch.cmp(&ch));
        match pos {
            Ok(i) => self.nodes[parent].children[i],
            Err(i) => {
                let new_idx = self.nodes.len();
                self.nodes.push(TrieNode {
                    ch,
                    output: false,
                    parent,
                    fail: ROOT,
                    children: Vec::new(),
                    state: 0,
                });
                self.nodes[parent].children.insert(i, new_idx);
                new_idx
            }
        }
    }

    /// Compute fail links over the whole trie in BFS order. Idempotent;
    /// later `add_word` calls are simply ignored once this has run.
    pub fn build(&mut self) {
        if self.built {
            return;
        }
        let mut queue = VecDeque::new();
        for &child in self.nodes[ROOT].children.clone().iter() {
            self.nodes[child].fail = ROOT;
            queue.push_back(child);
        }
        while let Some(u) = queue.pop_front() {
            let children = self.nodes[u].children.clone();
            for &v in &children {
                let ch = self.nodes[v].ch;
                self.nodes[v].fail = self.compute_fail(self.nodes[u].fail, ch);
                queue.push_back(v);
            }
        }
        self.built = true;
    }

    fn compute_fail(&self, start: usize, ch: char) -> usize {
        let mut f = start;
        loop {
            if let Some(t) = self.find_child(f, ch) {
                return t;
            }
            if f == ROOT {
                return ROOT;
            }
            f = self.nodes[f].fail;
        }
    }

    /// Does `text` contain any dictionary word as a substring?
    pub fn contains_word(&self, text: &str) -> bool {
        let mut s = ROOT;
        for c in text.chars() {
            let ch = match normalize(c) {
                Normalized::Whitespace => continue,
                Normalized::Rune(r) => r,
            };
            loop {
                if let Some(t) = self.find_child(s, ch) {
                    s = t;
                    if self.nodes[s].output {
                        return true;
                    }
                    break;
                } else if s == ROOT {
                    break;
                } else {
                    s = self.nodes[s].fail;
                    if self.nodes[s].output {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Replace every dictionary-word occurrence in `text` with `ch`
    /// repeated once per matched rune. Whitespace is preserved positionally.
    pub fn replace_word(&self, text: &str, ch: char) -> String {
        let original: Vec<char> = text.chars().collect();
        let mut output: Option<Vec<char>> = None;
        let mut s = ROOT;

        for (i, &raw) in original.iter().enumerate() {
            if is_whitespace(raw) {
                continue;
            }
            let Normalized::Rune(c) = normalize(raw) else {
                unreachable!("is_whitespace already filtered whitespace")
            };
            loop {
                if let Some(t) = self.find_child(s, c) {
                    s = t;
                    if self.nodes[s].output {
                        self.overwrite_match(&mut output, &original, s, i, ch);
                        s = ROOT;
                    }
                    break;
                } else if s == ROOT {
                    break;
                } else {
                    s = self.nodes[s].fail;
                    if self.nodes[s].output {
                        self.overwrite_match(&mut output, &original, s, i.wrapping_sub(1), ch);
                    }
                }
            }
        }

        match output {
            Some(chars) => chars.into_iter().collect(),
            None => text.to_string(),
        }
    }

    fn overwrite_match(&self, output: &mut Option<Vec<char>>, original: &[char], mut state: usize, end: usize, ch: char) {
        let buf = output.get_or_insert_with(|| original.to_vec());
        let mut j = end as isize;
        while state != ROOT {
            while j >= 0 && is_whitespace(buf[j as usize]) {
                j -= 1;
            }
            if j < 0 {
                break;
            }
            buf[j as usize] = ch;
            state = self.nodes[state].parent;
            j -= 1;
        }
    }
}

/// Crate-internal accessors used by [`crate::ac::dat::DatTrie`] to walk the
/// build-time trie while compiling it into a double array.
impl AcTrie {
    pub(crate) fn root() -> usize {
        ROOT
    }

    pub(crate) fn children(&self, node: usize) -> &[usize] {
        &self.nodes[node].children
    }

    pub(crate) fn ch(&self, node: usize) -> char {
        self.nodes[node].ch
    }

    pub(crate) fn is_output(&self, node: usize) -> bool {
        self.nodes[node].output
    }

    pub(crate) fn fail_of(&self, node: usize) -> usize {
        self.nodes[node].fail
    }

    pub(crate) fn state_of(&self, node: usize) -> u32 {
        self.nodes[node].state
    }

    pub(crate) fn set_state(&mut self, node: usize, state: u32) {
        self.nodes[node].state = state;
    }

    pub(crate) fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trie(words: &[&str]) -> AcTrie {
        let mut t = AcTrie::new();
        for w in words {
            t.add_word(w);
        }
        t.build();
        t
    }

    #[test]
    fn basic_contains_and_replace() {
        let t = trie(&["h", "she"]);
        assert!(t.contains_word("shs"));
        assert_eq!(t.replace_word("shs", '*'), "s*s");
        assert!(!t.contains_word("p"));
        assert_eq!(t.replace_word("p", '*'), "p");
        assert!(t.contains_word("h"));
        assert_eq!(t.replace_word("h", '*'), "*");
    }

    #[test]
    fn fail_chain_across_multiple_words() {
        let t = trie(&["her", "say", "she", "shr"]);
        assert!(t.contains_word("asherp"));
        assert_eq!(t.replace_word("asherp", '*'), "a***rp");
    }

    #[test]
    fn case_folding() {
        let t = trie(&["abc"]);
        assert!(t.contains_word("ABC"));
    }

    #[test]
    fn full_width_normalization() {
        let t = trie(&["ab"]);
        assert!(t.contains_word("ａｂ"));
    }

    #[test]
    fn whitespace_skipped_but_preserved_on_replace() {
        let t = trie(&["abc"]);
        assert!(t.contains_word("a b c"));
        assert_eq!(t.replace_word("a b c", '*'), "* * *");
    }

    #[test]
    fn add_word_after_build_is_ignored() {
        let mut t = trie(&["abc"]);
        t.add_word("xyz");
        assert!(!t.contains_word("xyz"));
    }
}
