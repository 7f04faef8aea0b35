//! `proptest`-driven coverage of the monotonicity and round-trip
//! properties documented for each type.

use proptest::prelude::*;
use warden::name_index::{Name, NameIndex};
use warden::BitVector;

proptest! {
    #[test]
    fn next_clear_and_next_set_bit_are_monotone(
        bits in prop::collection::vec(0usize..2000, 0..200),
        from1 in 0usize..2100,
        from2 in 0usize..2100,
    ) {
        let mut bv = BitVector::new();
        for b in bits {
            bv.set(b);
        }
        let (lo, hi) = if from1 <= from2 { (from1, from2) } else { (from2, from1) };
        prop_assert!(bv.next_clear_bit(lo) <= bv.next_clear_bit(hi));
        if let (Some(a), Some(b)) = (bv.next_set_bit(lo), bv.next_set_bit(hi)) {
            prop_assert!(a <= b);
        }
    }

    #[test]
    fn cardinality_matches_the_number_of_distinct_set_indices(
        bits in prop::collection::vec(0usize..1000, 0..300),
    ) {
        let mut bv = BitVector::new();
        let mut expected = std::collections::HashSet::new();
        for b in bits {
            bv.set(b);
            expected.insert(b);
        }
        prop_assert_eq!(bv.cardinality(), expected.len());
    }

    #[test]
    fn length_is_zero_iff_no_bit_is_set(bits in prop::collection::vec(0usize..500, 0..50)) {
        let mut bv = BitVector::new();
        for &b in &bits {
            bv.set(b);
        }
        if bits.is_empty() {
            prop_assert_eq!(bv.length(), 0);
        } else {
            let max = bits.iter().copied().max().unwrap();
            prop_assert_eq!(bv.length(), max + 1);
        }
    }

    #[test]
    fn add_then_remove_restores_prior_search_behavior(
        ids in prop::collection::vec(0u64..200, 1..40),
        suffix in "[a-c]{1,4}",
    ) {
        let names: Vec<Name> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| Name { id: *id, text: format!("n{id}{i}") })
            .collect();
        let mut idx = NameIndex::new_with_names(names.clone());

        let baseline: Vec<Vec<u64>> = ["n", "1", &suffix]
            .iter()
            .map(|q| idx.search(q).to_vec())
            .collect();

        let extra_id = 10_000u64;
        idx.add(extra_id, &suffix);
        prop_assert!(idx.remove(extra_id, &suffix));

        let after: Vec<Vec<u64>> = ["n", "1", &suffix]
            .iter()
            .map(|q| idx.search(q).to_vec())
            .collect();
        prop_assert_eq!(baseline, after);
    }
}
