//! Property tests for chronological version ordering.
//!
//! Both the replay path and the gallery sort depend on this order being a
//! strict total order, so these properties are checked over generated
//! identifiers rather than a handful of literals.

use gallery_version::{compare, VersionId};
use proptest::prelude::*;
use std::cmp::Ordering;

fn version_strategy() -> impl Strategy<Value = VersionId> {
    prop::collection::vec(0u64..30, 1..5).prop_map(|parts| {
        let raw = parts
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".");
        VersionId::parse(&raw).unwrap()
    })
}

proptest! {
    #[test]
    fn compare_is_antisymmetric(a in version_strategy(), b in version_strategy()) {
        prop_assert_eq!(compare(&a, &b), compare(&b, &a).reverse());
    }

    #[test]
    fn equal_iff_normalized_components_match(a in version_strategy(), b in version_strategy()) {
        let equal = compare(&a, &b) == Ordering::Equal;
        prop_assert_eq!(equal, a.normalized() == b.normalized());
    }

    #[test]
    fn compare_is_transitive(
        a in version_strategy(),
        b in version_strategy(),
        c in version_strategy(),
    ) {
        let mut sorted = vec![a, b, c];
        sorted.sort();
        prop_assert!(sorted[0] <= sorted[1]);
        prop_assert!(sorted[1] <= sorted[2]);
        prop_assert!(sorted[0] <= sorted[2]);
    }

    #[test]
    fn trailing_zero_padding_is_equal(a in version_strategy(), zeros in 1usize..3) {
        let padded = format!("{}{}", a, ".0".repeat(zeros));
        let padded = VersionId::parse(&padded).unwrap();
        prop_assert_eq!(compare(&a, &padded), Ordering::Equal);
        prop_assert_eq!(a, padded);
    }
}

#[test]
fn reflexive_on_literals() {
    for raw in ["0", "1.21", "1.21.0", "1.21.4", "10.0.1"] {
        let v = VersionId::parse(raw).unwrap();
        assert_eq!(compare(&v, &v), Ordering::Equal);
    }
}

#[test]
fn short_versus_padded_literal() {
    let short = VersionId::parse("1.21").unwrap();
    let long = VersionId::parse("1.21.0").unwrap();
    assert_eq!(compare(&short, &long), Ordering::Equal);
    assert_eq!(compare(&long, &short), Ordering::Equal);

    let newer = VersionId::parse("1.21.1").unwrap();
    assert_eq!(compare(&short, &newer), Ordering::Less);
    assert_eq!(compare(&newer, &short), Ordering::Greater);
}
