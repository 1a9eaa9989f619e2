//! Tests for the identifier newtypes in tally-common.
//!
//! This test suite covers:
//! - Newtype wrappers implementing expected traits (Display, Debug, Serialize, Deserialize)
//! - Conversions from raw platform identifiers

use std::collections::HashMap;
use tally_common::types::*;

#[test]
fn test_group_id_implements_expected_traits() {
    let group_id = GroupId(123456789);

    assert_eq!(format!("{:?}", group_id), "GroupId(123456789)");
    assert_eq!(format!("{}", group_id), "123456789");

    let copied = group_id;
    assert_eq!(group_id, copied);
    assert_ne!(group_id, GroupId(987654321));

    let mut map = HashMap::new();
    map.insert(group_id, "test_group");
    assert_eq!(map.get(&group_id), Some(&"test_group"));
}

#[test]
fn test_ids_serialize_transparently() {
    let serialized = serde_json::to_string(&UserId(42)).unwrap();
    assert_eq!(serialized, "42");

    let deserialized: GroupId = serde_json::from_str("7").unwrap();
    assert_eq!(deserialized, GroupId(7));
}

#[test]
fn test_ids_from_raw() {
    assert_eq!(UserId::from(5), UserId(5));
    assert_eq!(GroupId::from(u64::MAX), GroupId(u64::MAX));
}

#[test]
fn test_ids_order_numerically() {
    let mut ids = vec![UserId(30), UserId(10), UserId(20)];
    ids.sort();
    assert_eq!(ids, vec![UserId(10), UserId(20), UserId(30)]);
}
