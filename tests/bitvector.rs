//! Integration-level coverage of `BitVector` spanning its documented
//! testable properties.

use warden::BitVector;

#[test]
fn size_and_length_track_the_highest_set_bit() {
    let mut bv = BitVector::new();
    assert_eq!(bv.size(), 0);
    assert_eq!(bv.length(), 0);

    bv.set(63);
    assert_eq!(bv.size(), 64);
    assert_eq!(bv.length(), 64);

    bv.clear(63);
    assert_eq!(bv.size(), 0);
    assert_eq!(bv.length(), 0);
}

#[test]
fn growth_across_many_words_preserves_every_bit() {
    let mut bv = BitVector::new();
    let indices: Vec<usize> = (0..2000).step_by(7).collect();
    for &i in &indices {
        bv.set(i);
    }
    for i in 0..2000 {
        assert_eq!(bv.get(i), indices.contains(&i));
    }
    assert_eq!(bv.cardinality(), indices.len());
}

#[test]
fn reset_drops_every_bit_and_word() {
    let mut bv = BitVector::new();
    for i in [1usize, 64, 999] {
        bv.set(i);
    }
    bv.reset();
    assert_eq!(bv.cardinality(), 0);
    assert_eq!(bv.size(), 0);
    for i in [1usize, 64, 999] {
        assert!(!bv.get(i));
    }
}

#[test]
fn for_each_set_bit_matches_repeated_next_set_bit() {
    let mut bv = BitVector::new();
    for i in [0usize, 3, 5, 64, 65, 127, 500] {
        bv.set(i);
    }

    let mut via_visitor = Vec::new();
    bv.for_each_set_bit(0, |i| {
        via_visitor.push(i);
        false
    });

    let mut via_next = Vec::new();
    let mut cursor = 0;
    while let Some(i) = bv.next_set_bit(cursor) {
        via_next.push(i);
        cursor = i + 1;
    }

    assert_eq!(via_visitor, via_next);
}

#[test]
fn new_size_reserves_capacity_without_setting_any_bit() {
    // `new_size` is a capacity hint, not a pre-grown word vector: no bit is
    // set and no word exists until `set` actually grows the vector, so
    // `size()`/`length()` read exactly as they would for a fresh `new()`.
    let bv = BitVector::new_size(500);
    assert_eq!(bv.size(), 0);
    assert_eq!(bv.cardinality(), 0);
    assert_eq!(bv.length(), 0);
}
