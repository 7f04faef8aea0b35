// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! A prefix-substring name index: given a query string, return every
//! registered id whose registered name contains the query as a contiguous
//! substring.
//!
//! Each distinct rune gets its own ordered posting list — a
//! [`SkipList`](crate::skiplist) of `(id, posmask)` pairs — and a query is
//! answered by walking one iterator per query rune in lockstep, aligning on
//! a common id and then checking positional adjacency with a bitmask shift
//! chain. Names longer than [`MAX_NAME_LEN`] runes only have their first
//! `MAX_NAME_LEN` positions indexed; positions beyond that can never
//! participate in a posmask (`u32` has 32 bits), exactly mirroring the
//! length bound in the data model.

use std::collections::HashMap;

use crate::skiplist::{Position, SkipList, POS_PER_NODE};

/// The longest name-prefix indexed per identifier; also the longest query
/// this index can ever match, since a posmask is a `u32`.
pub const MAX_NAME_LEN: usize = 32;

const BUCKET_SIZE: usize = 0xFFFF;

/// One registered `(id, text)` pair, as fed to [`NameIndex::new_with_names`].
#[derive(Debug, Clone)]
pub struct Name {
    pub id: u64,
    pub text: String,
}

/// A substring index over registered names.
pub struct NameIndex {
    bucket: Vec<Option<Box<SkipList>>>,
    overflow: HashMap<char, Box<SkipList>>,
    result: Vec<u64>,
}

impl Default for NameIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl NameIndex {
    /// An empty index.
    pub fn new() -> Self {
        Self {
            bucket: (0..BUCKET_SIZE).map(|_| None).collect(),
            overflow: HashMap::new(),
            result: Vec::new(),
        }
    }

    /// Build an index from a batch of names in one linear pass.
    ///
    /// Names are sorted by id first, then each rune's staging buffer is
    /// flushed into its posting list via [`SkipList::insert_sorted_batch`]
    /// once it reaches [`POS_PER_NODE`] entries, keeping construction
    /// linear in total name length.
    pub fn new_with_names(mut names: Vec<Name>) -> Self {
        names.sort_by_key(|n| n.id);
        let mut index = Self::new();
        let mut staging: HashMap<char, Vec<Position>> = HashMap::new();
        for name in &names {
            for (k, c) in name.text.chars().enumerate().take(MAX_NAME_LEN) {
                stage(&mut index, &mut staging, c, name.id, 1u32 << k);
            }
        }
        for (c, buf) in staging {
            if !buf.is_empty() {
                index.list_mut(c).insert_sorted_batch(buf);
            }
        }
        index
    }

    /// Same contract as [`Self::new_with_names`], but the per-name
    /// tokenization runs in parallel across a `rayon` thread pool before the
    /// (inherently sequential) staging-buffer merge and flush.
    #[cfg(feature = "parallel")]
    pub fn new_with_names_parallel(mut names: Vec<Name>) -> Self {
        use rayon::prelude::*;

        names.sort_by_key(|n| n.id);
        let per_name: Vec<Vec<(char, Position)>> = names
            .par_iter()
            .map(|name| {
                name.text
                    .chars()
                    .enumerate()
                    .take(MAX_NAME_LEN)
                    .map(|(k, c)| {
                        (
                            c,
                            Position {
                                id: name.id,
                                posmask: 1u32 << k,
                            },
                        )
                    })
                    .collect()
            })
            .collect();

        let mut index = Self::new();
        let mut staging: HashMap<char, Vec<Position>> = HashMap::new();
        for entries in per_name {
            for (c, p) in entries {
                stage(&mut index, &mut staging, c, p.id, p.posmask);
            }
        }
        for (c, buf) in staging {
            if !buf.is_empty() {
                index.list_mut(c).insert_sorted_batch(buf);
            }
        }
        index
    }

    /// Register `(id, text)`, creating posting lists as needed. Unlike
    /// [`Self::new_with_names`], no ordering assumption is made about `id`;
    /// per-node balancing in the skip-list absorbs out-of-order arrivals.
    pub fn add(&mut self, id: u64, text: &str) {
        for (k, c) in text.chars().enumerate().take(MAX_NAME_LEN) {
            self.list_mut(c).insert(id, 1u32 << k);
        }
    }

    /// Every id whose registered name contains `query` as a contiguous
    /// substring.
    ///
    /// The returned slice borrows a scratch buffer owned by this index and
    /// is overwritten by the next call: the compiler enforces this directly
    /// since `search` takes `&mut self` and returns a borrow tied to it, so
    /// a caller cannot hold a previous result across a second call without
    /// a borrow-checker error. Copy the slice if you need to retain it.
    pub fn search(&mut self, query: &str) -> &[u64] {
        self.result.clear();
        let runes: Vec<char> = query.chars().collect();
        if runes.is_empty() || runes.len() > MAX_NAME_LEN {
            return &self.result;
        }

        let mut cursors: Vec<PostingCursor<'_>> = Vec::with_capacity(runes.len());
        for &c in &runes {
            let Some(list) = self.list_ref(c) else {
                return &self.result;
            };
            let Some(cursor) = PostingCursor::new(list) else {
                return &self.result;
            };
            cursors.push(cursor);
        }

        // Accumulate into a local buffer rather than `self.result` directly:
        // every cursor holds a `&SkipList` borrowed through `self.list_ref`,
        // which ties up `*self` immutably for as long as `cursors` is alive,
        // so `self.result` can't be mutated in the same breath. Move the
        // finished buffer into `self.result` only after `cursors` is dropped.
        let mut hits = Vec::new();
        let mut max_id = cursors[0].id;
        'search: loop {
            loop {
                let before = max_id;
                for cursor in &mut cursors {
                    if cursor.id < max_id && !cursor.advance_to(max_id) {
                        break 'search;
                    }
                    if cursor.id > max_id {
                        max_id = cursor.id;
                    }
                }
                if max_id == before {
                    break;
                }
            }

            let mut p = cursors[0].posmask;
            for cursor in &cursors[1..] {
                p = (p << 1) & cursor.posmask;
                if p == 0 {
                    break;
                }
            }
            if p != 0 {
                hits.push(cursors[0].id);
            }

            max_id += 1;
        }

        drop(cursors);
        self.result = hits;
        &self.result
    }

    /// Undo a previous `add(id, text)`. Returns `false` (a no-op) if any
    /// rune's posting record is missing or doesn't carry the expected bit —
    /// i.e. `text` was never added for `id` in this exact form.
    pub fn remove(&mut self, id: u64, text: &str) -> bool {
        let runes: Vec<char> = text.chars().take(MAX_NAME_LEN).collect();
        for (k, &c) in runes.iter().enumerate() {
            let bit = 1u32 << k;
            let Some(list) = self.list_ref(c) else {
                return false;
            };
            let Some((node, idx)) = list.search(id) else {
                return false;
            };
            if list.node_positions(node)[idx].posmask & bit == 0 {
                return false;
            }
        }
        for (k, &c) in runes.iter().enumerate() {
            self.list_mut(c).delete(id, 1u32 << k);
        }
        true
    }

    fn list_ref(&self, c: char) -> Option<&SkipList> {
        let code = c as u32 as usize;
        if code < BUCKET_SIZE {
            self.bucket[code].as_deref()
        } else {
            self.overflow.get(&c).map(Box::as_ref)
        }
    }

    fn list_mut(&mut self, c: char) -> &mut SkipList {
        let code = c as u32 as usize;
        if code < BUCKET_SIZE {
            self.bucket[code].get_or_insert_with(|| Box::new(SkipList::new()))
        } else {
            self.overflow.entry(c).or_insert_with(|| Box::new(SkipList::new()))
        }
    }
}

/// Shared staging-buffer logic used by both the sequential and parallel
/// batch constructors: OR into the last record if it shares `id`, otherwise
/// push a new one, flushing the buffer first if it's already full.
fn stage(index: &mut NameIndex, staging: &mut HashMap<char, Vec<Position>>, c: char, id: u64, bit: u32) {
    let buf = staging.entry(c).or_default();
    if let Some(last) = buf.last_mut() {
        if last.id == id {
            last.posmask |= bit;
            return;
        }
    }
    if buf.len() >= POS_PER_NODE {
        index.list_mut(c).insert_sorted_batch(std::mem::take(buf));
    }
    buf.push(Position { id, posmask: bit });
}

/// Walks one posting list's `(id, posmask)` records in ascending id order.
struct PostingCursor<'a> {
    list: &'a SkipList,
    node: Option<usize>,
    index: usize,
    id: u64,
    posmask: u32,
}

impl<'a> PostingCursor<'a> {
    fn new(list: &'a SkipList) -> Option<Self> {
        let node = list.first()?;
        let p = list.node_positions(node)[0];
        Some(Self {
            list,
            node: Some(node),
            index: 0,
            id: p.id,
            posmask: p.posmask,
        })
    }

    fn advance(&mut self) -> bool {
        let Some(node) = self.node else { return false };
        self.index += 1;
        let mut node = node;
        if self.index >= self.list.node_positions(node).len() {
            match self.list.node_forward0(node) {
                Some(next) => {
                    node = next;
                    self.index = 0;
                    self.node = Some(node);
                }
                None => {
                    self.node = None;
                    return false;
                }
            }
        }
        let p = self.list.node_positions(node)[self.index];
        self.id = p.id;
        self.posmask = p.posmask;
        true
    }

    /// Advance until `self.id >= target`, or report exhaustion.
    fn advance_to(&mut self, target: u64) -> bool {
        while self.id < target {
            if !self.advance() {
                return false;
            }
        }
        true
    }
}
