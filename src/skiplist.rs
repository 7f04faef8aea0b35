// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! A chunked skip-list: each node holds a sorted run of up to
//! [`POS_PER_NODE`] postings rather than a single key. This trades pointer
//! count for in-node binary search, and is the backing storage for every
//! per-rune posting list in [`crate::name_index::NameIndex`].
//!
//! Nodes live in a per-list arena addressed by index rather than by raw
//! pointer (this crate forbids `unsafe`), with a small capacity-16 free-list
//! of retired slots to cut allocation churn on delete-heavy workloads —
//! the same tradeoff the reference implementation makes with its pooled
//! node freelist, just scoped to one instance instead of a process-wide
//! singleton so that distinct `SkipList`s never share hidden state.

use rand::Rng;

/// Maximum postings held directly in one node before it must split or
/// borrow from a neighbor.
pub(crate) const POS_PER_NODE: usize = 256;

const MAX_LEVEL: usize = 10;
const LEVEL_P: f64 = 0.25;
const FREE_LIST_CAP: usize = 16;

/// One posting: `posmask` bit `k` means the indexed rune occurs at
/// position `k` of `id`'s name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Position {
    pub id: u64,
    pub posmask: u32,
}

struct SkipNode {
    positions: Vec<Position>,
    forward: Vec<Option<usize>>,
}

impl SkipNode {
    fn min(&self) -> u64 {
        self.positions[0].id
    }

    fn max(&self) -> u64 {
        self.positions.last().expect("node is never empty while linked").id
    }

    fn len(&self) -> usize {
        self.positions.len()
    }

    fn find(&self, id: u64) -> Result<usize, usize> {
        self.positions.binary_search_by_key(&id, |p| p.id)
    }

    fn check_invariants(&self) {
        let ids: Vec<u64> = self.positions.iter().map(|p| p.id).collect();
        let posmasks: Vec<u32> = self.positions.iter().map(|p| p.posmask).collect();
        crate::contracts::check_posting_run_sorted(&ids, &posmasks);
    }
}

/// A predecessor/successor reference: either the list's header sentinel or
/// a real arena slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Link {
    Header,
    Node(usize),
}

/// A chunked skip-list over ascending `u64` ids.
pub(crate) struct SkipList {
    header_forward: [Option<usize>; MAX_LEVEL],
    arena: Vec<SkipNode>,
    free_slots: Vec<usize>,
    level: usize,
}

impl SkipList {
    pub(crate) fn new() -> Self {
        Self {
            header_forward: [None; MAX_LEVEL],
            arena: Vec::new(),
            free_slots: Vec::new(),
            level: 1,
        }
    }

    fn forward_of(&self, link: Link, level: usize) -> Option<usize> {
        match link {
            Link::Header => self.header_forward[level],
            Link::Node(i) => self.arena[i].forward.get(level).copied().flatten(),
        }
    }

    fn set_forward(&mut self, link: Link, level: usize, target: Option<usize>) {
        match link {
            Link::Header => self.header_forward[level] = target,
            Link::Node(i) => self.arena[i].forward[level] = target,
        }
    }

    fn random_level(&self) -> usize {
        let mut level = 1;
        let mut rng = rand::thread_rng();
        while level < MAX_LEVEL && rng.gen::<f64>() < LEVEL_P {
            level += 1;
        }
        level
    }

    fn alloc_node(&mut self, level: usize, positions: Vec<Position>) -> usize {
        let node = SkipNode {
            positions,
            forward: vec![None; level],
        };
        if let Some(slot) = self.free_slots.pop() {
            self.arena[slot] = node;
            slot
        } else {
            self.arena.push(node);
            self.arena.len() - 1
        }
    }

    fn free_node(&mut self, idx: usize) {
        if self.free_slots.len() < FREE_LIST_CAP {
            self.arena[idx].positions.clear();
            self.arena[idx].forward.clear();
            self.free_slots.push(idx);
        }
    }

    /// The first node in forward-0 order, if the list is non-empty.
    pub(crate) fn first(&self) -> Option<usize> {
        self.header_forward[0]
    }

    pub(crate) fn node_positions(&self, idx: usize) -> &[Position] {
        &self.arena[idx].positions
    }

    pub(crate) fn node_forward0(&self, idx: usize) -> Option<usize> {
        self.arena[idx].forward[0]
    }

    /// Descend to the node whose run may contain `key` and binary search it.
    pub(crate) fn search(&self, key: u64) -> Option<(usize, usize)> {
        let mut link = Link::Header;
        for level in (0..self.level).rev() {
            loop {
                match self.forward_of(link, level) {
                    Some(y) if self.arena[y].min() <= key => link = Link::Node(y),
                    _ => break,
                }
            }
        }
        match link {
            Link::Node(idx) => self.arena[idx].find(key).ok().map(|pi| (idx, pi)),
            Link::Header => None,
        }
    }

    /// For each level, the last node whose `max() < id` (or the header).
    fn locate_predecessors(&self, id: u64) -> [Link; MAX_LEVEL] {
        let mut prev = [Link::Header; MAX_LEVEL];
        let mut link = Link::Header;
        for level in (0..self.level).rev() {
            loop {
                match self.forward_of(link, level) {
                    Some(y) if self.arena[y].max() < id => link = Link::Node(y),
                    _ => break,
                }
            }
            prev[level] = link;
        }
        prev
    }

    /// Splice a brand-new node holding `positions` (already sorted,
    /// minimum id greater than every existing predecessor) into the list.
    fn splice_new_node(&mut self, prev: &[Link; MAX_LEVEL], positions: Vec<Position>) {
        let level = self.random_level();
        let mut prev = *prev;
        if level > self.level {
            for l in self.level..level {
                prev[l] = Link::Header;
            }
            self.level = level;
        }
        let new_idx = self.alloc_node(level, positions);
        for l in 0..level {
            let after = self.forward_of(prev[l], l);
            self.arena[new_idx].forward[l] = after;
            self.set_forward(prev[l], l, Some(new_idx));
        }
        self.arena[new_idx].check_invariants();
    }

    /// Split a full node `xi` at `index`, inserting `(id, pos)` at the
    /// boundary, and splice the new right-half node into the list.
    fn split_and_insert(&mut self, xi: usize, index: usize, id: u64, pos: u32, prev: &[Link; MAX_LEVEL]) {
        let level = self.random_level();
        let mut prev = *prev;
        if level > self.level {
            for l in self.level..level {
                prev[l] = Link::Header;
            }
            self.level = level;
        }

        let tail = self.arena[xi].positions.split_off(index);
        self.arena[xi].positions.push(Position { id, posmask: pos });
        let new_idx = self.alloc_node(level, tail);

        for l in 0..level {
            if self.forward_of(prev[l], l) == Some(xi) {
                let after_x = self.arena[xi].forward.get(l).copied().flatten();
                self.arena[new_idx].forward[l] = after_x;
                self.set_forward(Link::Node(xi), l, Some(new_idx));
            } else {
                let after_prev = self.forward_of(prev[l], l);
                self.arena[new_idx].forward[l] = after_prev;
                self.set_forward(prev[l], l, Some(new_idx));
            }
        }
        self.arena[xi].check_invariants();
        self.arena[new_idx].check_invariants();
    }

    /// Insert `pos` at `id`, OR-ing into an existing record for `id` if one
    /// exists. See the module doc comment for the full balance-before-split policy.
    pub(crate) fn insert(&mut self, id: u64, pos: u32) {
        let prev = self.locate_predecessors(id);
        let y = prev[0];
        let x_idx = self.forward_of(y, 0);

        if let Some(xi) = x_idx {
            if id == self.arena[xi].max() {
                let last = self.arena[xi].positions.len() - 1;
                self.arena[xi].positions[last].posmask |= pos;
                self.arena[xi].check_invariants();
                return;
            }

            if id < self.arena[xi].min() {
                if let Link::Node(yi) = y {
                    if self.arena[yi].len() < POS_PER_NODE {
                        self.arena[yi].positions.push(Position { id, posmask: pos });
                        self.arena[yi].check_invariants();
                        return;
                    }
                }
                if self.arena[xi].len() < POS_PER_NODE {
                    self.arena[xi].positions.insert(0, Position { id, posmask: pos });
                    self.arena[xi].check_invariants();
                    return;
                }
                // Both neighbors are full: fall through to the brand-new-node
                // path below, same as when no candidate node existed at all.
            } else {
                match self.arena[xi].find(id) {
                    Ok(i) => {
                        self.arena[xi].positions[i].posmask |= pos;
                        return;
                    }
                    Err(index) => {
                        if self.arena[xi].len() < POS_PER_NODE {
                            self.arena[xi].positions.insert(index, Position { id, posmask: pos });
                            self.arena[xi].check_invariants();
                            return;
                        }

                        let half = POS_PER_NODE / 2;
                        if index < half {
                            if let Link::Node(yi) = y {
                                if self.arena[yi].len() < POS_PER_NODE {
                                    let evicted = self.arena[xi].positions.remove(0);
                                    self.arena[yi].positions.push(evicted);
                                    self.arena[xi].positions.insert(index - 1, Position { id, posmask: pos });
                                    self.arena[xi].check_invariants();
                                    self.arena[yi].check_invariants();
                                    return;
                                }
                            }
                        } else if let Some(ni) = self.arena[xi].forward[0] {
                            if self.arena[ni].len() < half {
                                let tail = self.arena[xi].positions.split_off(index);
                                self.arena[xi].positions.push(Position { id, posmask: pos });
                                let mut merged = tail;
                                merged.append(&mut self.arena[ni].positions);
                                self.arena[ni].positions = merged;
                                self.arena[xi].check_invariants();
                                self.arena[ni].check_invariants();
                                return;
                            }
                        }

                        self.split_and_insert(xi, index, id, pos, &prev);
                        return;
                    }
                }
            }
        } else if let Link::Node(yi) = y {
            if self.arena[yi].len() < POS_PER_NODE {
                self.arena[yi].positions.push(Position { id, posmask: pos });
                self.arena[yi].check_invariants();
                return;
            }
        }

        self.splice_new_node(&prev, vec![Position { id, posmask: pos }]);
    }

    /// Fast path for static construction: `positions` is already sorted and
    /// its minimum id exceeds every id currently in the list, so it can be
    /// spliced in as a single new node without touching existing nodes.
    pub(crate) fn insert_sorted_batch(&mut self, positions: Vec<Position>) {
        debug_assert!(!positions.is_empty());
        let id = positions[0].id;
        let prev = self.locate_predecessors(id);
        self.splice_new_node(&prev, positions);
    }

    /// Clear `pos` bits from `id`'s record, removing the record if it goes
    /// to zero and recycling the node if it becomes empty. Returns whether
    /// a record for `id` was found at all.
    pub(crate) fn delete(&mut self, id: u64, pos: u32) -> bool {
        let prev = self.locate_predecessors(id);
        let y = prev[0];
        let Some(xi) = self.forward_of(y, 0) else {
            return false;
        };

        let found = match self.arena[xi].find(id) {
            Ok(i) => {
                self.arena[xi].positions[i].posmask &= !pos;
                if self.arena[xi].positions[i].posmask == 0 {
                    self.arena[xi].positions.remove(i);
                }
                true
            }
            Err(_) => false,
        };

        if found && !self.arena[xi].positions.is_empty() {
            self.arena[xi].check_invariants();
        }

        if self.arena[xi].positions.is_empty() {
            for l in 0..self.level {
                if self.forward_of(prev[l], l) != Some(xi) {
                    break;
                }
                let after = self.arena[xi].forward.get(l).copied().flatten();
                self.set_forward(prev[l], l, after);
            }
            while self.level > 1 && self.header_forward[self.level - 1].is_none() {
                self.level -= 1;
            }
            self.free_node(xi);
        }
        found
    }

    #[cfg(test)]
    pub(crate) fn node_count(&self) -> usize {
        let mut count = 0;
        let mut cur = self.header_forward[0];
        while let Some(idx) = cur {
            count += 1;
            cur = self.arena[idx].forward[0];
        }
        count
    }
}
