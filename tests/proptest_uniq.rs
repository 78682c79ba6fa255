//! Property tests for the uniq codec.

use healpix_uniq::healpix::{MAX_DEPTH, npix};
use healpix_uniq::{Cell, decode, encode};
use proptest::prelude::*;

/// Strategy for a valid (depth, hash) pair.
fn arb_cell() -> impl Strategy<Value = (u8, u64)> {
    (0..=MAX_DEPTH).prop_flat_map(|depth| (Just(depth), 0..npix(depth)))
}

proptest! {
    /// decode(encode(d, h)) == (d, h)
    #[test]
    fn roundtrip((depth, hash) in arb_cell()) {
        let uniq = encode(depth, hash).unwrap();
        let cell = decode(uniq).unwrap();
        prop_assert_eq!(cell.depth(), depth);
        prop_assert_eq!(cell.hash(), hash);
        prop_assert_eq!(cell.uniq(), uniq);
    }

    /// encode is strictly increasing in the pixel index at fixed depth
    #[test]
    fn monotonic_in_hash((depth, hash) in arb_cell()) {
        prop_assume!(hash + 1 < npix(depth));
        prop_assert!(encode(depth, hash).unwrap() < encode(depth, hash + 1).unwrap());
    }

    /// Distinct cells never share a uniq value
    #[test]
    fn injective(a in arb_cell(), b in arb_cell()) {
        prop_assume!(a != b);
        prop_assert_ne!(encode(a.0, a.1).unwrap(), encode(b.0, b.1).unwrap());
    }

    /// Cell ordering agrees with integer ordering of uniq values
    #[test]
    fn ordering_matches_uniq(a in arb_cell(), b in arb_cell()) {
        let ca = Cell::new(a.0, a.1).unwrap();
        let cb = Cell::new(b.0, b.1).unwrap();
        prop_assert_eq!(ca.cmp(&cb), ca.uniq().cmp(&cb.uniq()));
    }

    /// Every uniq value below the end of the last depth decodes and re-encodes to itself
    #[test]
    fn decode_is_total_below_limit(uniq in 0u64..(1u64 << 62) - 4) {
        let cell = decode(uniq).unwrap();
        prop_assert_eq!(encode(cell.depth(), cell.hash()).unwrap(), uniq);
    }

    /// Out-of-range pixel indices are rejected
    #[test]
    fn rejects_hash_past_npix(depth in 0..=MAX_DEPTH, extra in 0u64..1000) {
        prop_assert!(encode(depth, npix(depth) + extra).is_err());
    }

    /// A cell contains its children and is contained by its parent
    #[test]
    fn hierarchy_consistent((depth, hash) in arb_cell()) {
        let cell = Cell::new(depth, hash).unwrap();
        prop_assert!(cell.parent().contains(&cell));
        if depth < MAX_DEPTH {
            for child in cell.children().unwrap() {
                prop_assert_eq!(child.parent(), cell);
                prop_assert!(cell.contains(&child));
            }
        }
    }
}

#[test]
fn depth_boundary_scenario() {
    for depth in 0..MAX_DEPTH {
        assert_eq!(
            encode(depth + 1, 0).unwrap(),
            encode(depth, npix(depth) - 1).unwrap() + 1
        );
    }
    assert_eq!(encode(3, 100).unwrap(), 352);
    assert_eq!(decode(352).unwrap(), Cell::new(3, 100).unwrap());
}
