// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Aho–Corasick sensitive-word matching, in two representations sharing one
//! normalization table and one fail-link algorithm: [`trie::AcTrie`], a
//! pointer-style automaton good for small dictionaries, and
//! [`dat::DatTrie`], the same automaton compiled to a double array for
//! large ones.

pub(crate) mod normalize;

pub mod dat;
pub mod trie;

pub use dat::DatTrie;
pub use trie::AcTrie;
