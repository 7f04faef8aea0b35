// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Three independent algorithmic cores sharing one dense-bit substrate.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │  bitvector   │  growable bitset: set/clear/rank/scan
//! └──────┬───────┘
//!        │ backs the DAT's free-slot bitmap and the Bloom filter's bits
//!        ▼
//! ┌──────────────┐     ┌──────────────┐
//! │   skiplist   │────▶│  name_index  │  substring search over registered names
//! └──────────────┘     └──────────────┘
//!
//! ┌──────────────┐     ┌──────────────┐
//! │   ac::trie   │────▶│   ac::dat    │  Aho–Corasick: pointer trie, then double array
//! └──────────────┘     └──────────────┘
//!
//! ┌──────────────┐
//! │    bloom     │  Bloom filter built on `bitvector`
//! └──────────────┘
//! ```
//!
//! [`bitvector::BitVector`] is the substrate: [`ac::dat::DatTrie`] uses it to
//! track which double-array slots are occupied, and [`bloom::BloomFilter`]
//! uses it as its bit array. [`name_index::NameIndex`] is self-contained,
//! built on the chunked [`skiplist::SkipList`].
//! [`ac::trie::AcTrie`] and [`ac::dat::DatTrie`] share one normalization
//! table ([`ac::normalize`]) and one Aho–Corasick goto/fail algorithm, differing
//! only in how transitions are laid out in memory.
//!
//! # Usage
//!
//! ```
//! use warden::name_index::{Name, NameIndex};
//!
//! let mut index = NameIndex::new_with_names(vec![
//!     Name { id: 0, text: "abc".into() },
//!     Name { id: 1, text: "bcd".into() },
//! ]);
//! assert_eq!(index.search("bc"), &[0, 1]);
//! ```
//!
//! ```
//! use warden::ac::DatTrie;
//!
//! let mut dat = DatTrie::new();
//! dat.add_word("she");
//! dat.add_word("h");
//! dat.build();
//! assert!(dat.contains_word("shs"));
//! assert_eq!(dat.replace_word("shs", '*'), "s*s");
//! ```

pub mod ac;
pub mod bitvector;
pub mod bloom;
pub mod name_index;

mod contracts;
mod skiplist;

pub use ac::{AcTrie, DatTrie};
pub use bitvector::BitVector;
pub use bloom::BloomFilter;
pub use name_index::NameIndex;
