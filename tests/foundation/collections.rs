//! Integration tests for persistent collections

use sluice_foundation::{LtMap, LtVec};

#[test]
fn vec_collects_and_indexes() {
    let empty: LtVec<i32> = LtVec::new();
    let two: LtVec<i32> = [1, 2].into_iter().collect();
    assert!(empty.is_empty());
    assert_eq!(two.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(two.get(1), Some(&2));
    assert_eq!(two.get(2), None);
}

#[test]
fn vec_range_clamps() {
    let v: LtVec<i32> = (0..10).collect();
    assert_eq!(v.range(2, 5).iter().copied().collect::<Vec<_>>(), vec![2, 3, 4]);
    assert_eq!(v.range(8, 50).len(), 2);
    assert!(v.range(6, 3).is_empty());
    assert!(v.range(20, 30).is_empty());
}

#[test]
fn map_keys_are_ordered() {
    let m: LtMap<i32> = [("zeta", 1), ("alpha", 2), ("mid", 3)].into_iter().collect();
    let keys: Vec<&str> = m.keys().map(|k| &**k).collect();
    assert_eq!(keys, vec!["alpha", "mid", "zeta"]);
    assert_eq!(m.values().copied().collect::<Vec<_>>(), vec![2, 3, 1]);
}

#[test]
fn map_insert_is_persistent() {
    let base: LtMap<i32> = LtMap::new().insert("a", 1);
    let updated = base.insert("a", 2).insert("b", 3);
    assert_eq!(base.get("a"), Some(&1));
    assert_eq!(updated.get("a"), Some(&2));
    assert!(updated.contains_key("b"));
    assert!(!base.contains_key("b"));
    assert_eq!(updated.len(), 2);
}
