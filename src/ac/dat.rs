// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Aho–Corasick compiled to a double array: every state transition is one
//! modular add plus an equality check against `check[]`, instead of a
//! pointer-chasing child lookup. Built for dictionaries large enough that
//! [`AcTrie`](crate::ac::trie::AcTrie)'s per-node child vectors start to
//! cost more than they save.

use crate::ac::normalize::{is_whitespace, normalize, Normalized};
use crate::ac::trie::AcTrie;
use crate::bitvector::BitVector;
use crate::contracts::check_dat_edge;

/// Fixed double-array size. A hard cap on dictionary size: placement
/// panics once exhausted rather than growing and re-running.
const UNITS_LEN: usize = 0xFFFF * 4;

const LEAF_BIT: u32 = 1 << 31;
const UNUSED_BIT: u32 = 1 << 30;
const OFFSET_MASK: u32 = (1 << 31) - 1;

const fn offset_of(base: u32) -> u32 {
    base & OFFSET_MASK
}

const fn set_offset(base: u32, offset: u32) -> u32 {
    (base & LEAF_BIT) | offset
}

const fn set_leaf(base: u32) -> u32 {
    base | LEAF_BIT
}

const fn is_leaf(base: u32) -> bool {
    base & LEAF_BIT != 0
}

const fn is_used(base: u32) -> bool {
    base & UNUSED_BIT == 0
}

/// Aho–Corasick compiled to a double array (`base`/`check`), with a
/// free-slot bitmap driving placement during `build`.
pub struct DatTrie {
    building: Option<AcTrie>,
    base: Vec<u32>,
    check: Vec<u32>,
    fail: Vec<u32>,
    used: BitVector,
    built: bool,
}

impl Default for DatTrie {
    fn default() -> Self {
        Self::new()
    }
}

impl DatTrie {
    pub fn new() -> Self {
        Self {
            building: Some(AcTrie::new()),
            base: vec![UNUSED_BIT; UNITS_LEN],
            check: vec![0; UNITS_LEN],
            fail: vec![0; UNITS_LEN],
            used: BitVector::new_size(UNITS_LEN),
            built: false,
        }
    }

    /// Register a dictionary word. Ignored once [`Self::build`] has run.
    pub fn add_word(&mut self, word: &str) {
        if self.built {
            return;
        }
        if let Some(trie) = self.building.as_mut() {
            trie.add_word(word);
        }
    }

    /// Compile the accumulated words into the double array. Idempotent.
    ///
    /// Panics if the dictionary is large enough that no collision-free
    /// placement exists anywhere in `units[]` (a full wraparound of the
    /// placement search) — the fixed `4 * 0xFFFF` array is too small for
    /// this dictionary.
    pub fn build(&mut self) {
        if self.built {
            return;
        }
        let Some(mut trie) = self.building.take() else {
            self.built = true;
            return;
        };
        trie.build();

        self.used.set(0);
        let root = AcTrie::root();
        let mut frontier = vec![root];
        let mut next_k: usize = 0;
        let mut level = 0usize;

        while !frontier.is_empty() {
            let mut new_frontier = Vec::new();
            for &v in &frontier {
                let v_state = trie.state_of(v);
                let k: usize = if level == 0 {
                    0
                } else {
                    let n = self.used.next_clear_bit(next_k);
                    let (k, nk) = self.findk(&trie, n, v);
                    next_k = nk;
                    k
                };
                self.base[v_state as usize] = set_offset(self.base[v_state as usize], k as u32);

                for &child in trie.children(v) {
                    let offset = (trie.ch(child) as usize + k) % UNITS_LEN;
                    self.check[offset] = v_state;
                    trie.set_state(child, offset as u32);
                    self.used.set(offset);
                    if trie.is_output(child) {
                        self.base[offset] = set_leaf(self.base[offset]);
                    }
                    check_dat_edge(&self.check, &self.used, offset as u32, v_state);
                    new_frontier.push(child);
                }
            }
            frontier = new_frontier;
            level += 1;
        }

        for node in 1..trie.node_count() {
            let fail_node = trie.fail_of(node);
            self.fail[trie.state_of(node) as usize] = trie.state_of(fail_node);
        }

        self.built = true;
    }

    /// Find the smallest placement `k >= begin` such that every child of
    /// `v` lands on a free slot, wrapping the search once before giving up.
    /// Returns `(k, k + 1)`, the latter being the cursor the next call
    /// should resume from.
    fn findk(&self, trie: &AcTrie, begin: usize, v: usize) -> (usize, usize) {
        let mut k = begin;
        let mut cycled = false;
        loop {
            if cycled && k >= begin {
                panic!("DatTrie: units[] exhausted — dictionary too large for the fixed double array");
            }
            let mut collision_next = None;
            for &child in trie.children(v) {
                let p = trie.ch(child) as usize;
                assert!(p < UNITS_LEN, "DatTrie: rune {p:#x} exceeds the double array's slot range");
                let idx = (p + k) % UNITS_LEN;
                if self.used.get(idx) {
                    collision_next = Some(k + 1);
                    break;
                }
            }
            match collision_next {
                None => return (k, k + 1),
                Some(next) => {
                    k = self.used.next_clear_bit(next);
                    if k >= UNITS_LEN {
                        k = 0;
                        cycled = true;
                    }
                }
            }
        }
    }

    fn transition(&self, s: u32, c: char) -> Option<u32> {
        let off = offset_of(self.base[s as usize]) as usize;
        let idx = (off + c as usize) % UNITS_LEN;
        if is_used(self.base[idx]) && self.check[idx] == s {
            Some(idx as u32)
        } else {
            None
        }
    }

    /// Does `text` contain any dictionary word as a substring?
    pub fn contains_word(&self, text: &str) -> bool {
        let mut s: u32 = 0;
        for c in text.chars() {
            let ch = match normalize(c) {
                Normalized::Whitespace => continue,
                Normalized::Rune(r) => r,
            };
            loop {
                if let Some(t) = self.transition(s, ch) {
                    s = t;
                    if is_leaf(self.base[s as usize]) {
                        return true;
                    }
                    break;
                } else if s == 0 {
                    break;
                } else {
                    s = self.fail[s as usize];
                    if is_leaf(self.base[s as usize]) {
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
        let mut s: u32 = 0;

        for (i, &raw) in original.iter().enumerate() {
            if is_whitespace(raw) {
                continue;
            }
            let Normalized::Rune(c) = normalize(raw) else {
                unreachable!("is_whitespace already filtered whitespace")
            };
            loop {
                if let Some(t) = self.transition(s, c) {
                    s = t;
                    if is_leaf(self.base[s as usize]) {
                        self.overwrite_match(&mut output, &original, s, i, ch);
                        s = 0;
                    }
                    break;
                } else if s == 0 {
                    break;
                } else {
                    s = self.fail[s as usize];
                    if is_leaf(self.base[s as usize]) {
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

    fn overwrite_match(&self, output: &mut Option<Vec<char>>, original: &[char], mut state: u32, end: usize, ch: char) {
        let buf = output.get_or_insert_with(|| original.to_vec());
        let mut j = end as isize;
        while state != 0 {
            while j >= 0 && is_whitespace(buf[j as usize]) {
                j -= 1;
            }
            if j < 0 {
                break;
            }
            buf[j as usize] = ch;
            state = self.check[state as usize];
            j -= 1;
        }
    }
}
