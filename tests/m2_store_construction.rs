//! Tests for M2: Store Construction and Retrieval
//! Covers TC-2.1, TC-2.2, TC-2.3, TC-2.4
//!
//! Run individual tests with:
//! cargo test tc_2_1 -- --nocapture
//! cargo test m2_store_construction -- --nocapture

use memorystore::{impl_record, DuplicatePolicy, Identity, IdentitySpec, MemoryStore, StoreOptions};
use rand::seq::SliceRandom;
use serde_json::json;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq)]
struct Row {
    id: i64,
    value: i64,
}
impl_record!(Row { id, value });

fn row(id: i64, value: i64) -> Row {
    Row { id, value }
}

fn with_duplicate() -> Vec<Row> {
    vec![row(1, 10), row(2, 20), row(4, 40), row(4, 50)]
}

mod tc_2_1_order_preservation {
    use super::*;

    #[test]
    fn test_records_follow_input_order() {
        let data = vec![row(1, 100), row(2, 200), row(3, 300), row(4, 400)];
        let store = MemoryStore::new(data.clone(), "id").unwrap();

        let mut ids: Vec<i64> = data.iter().map(|r| r.id).collect();
        ids.shuffle(&mut rand::thread_rng());
        for id in &ids {
            assert_eq!(store.get(*id).map(|r| r.id), Some(*id));
        }

        let snapshot: Vec<Row> = store.records().into_iter().cloned().collect();
        assert_eq!(snapshot, data, "retrieval order must not affect the snapshot");
    }

    #[test]
    fn test_non_sorted_input_keeps_input_order() {
        let data = vec![row(3, 0), row(1, 0), row(2, 0)];
        let store = MemoryStore::new(data, "id").unwrap();
        let keys: Vec<&Identity> = store.keys().collect();
        assert_eq!(keys, vec![&Identity::from(3), &Identity::from(1), &Identity::from(2)]);
    }

    #[test]
    fn test_duplicates_do_not_move_first_occurrence() {
        let data = vec![row(1, 0), row(2, 0), row(1, 9), row(3, 0)];
        let store = MemoryStore::new(data, "id").unwrap();
        assert_eq!(store.position_of(1), Some(0));
        assert_eq!(store.position_of(3), Some(2));
    }
}

mod tc_2_2_duplicate_policy {
    use super::*;

    #[test]
    fn test_first_wins() {
        let store = MemoryStore::new(with_duplicate(), 0).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.get(4), Some(&row(4, 40)));
        assert_eq!(store.policy(), DuplicatePolicy::FirstWins);
    }

    #[test]
    fn test_strict_aborts_with_key() {
        let result = MemoryStore::strict(with_duplicate(), 0);
        let err = result.unwrap_err();
        println!("[TC-2.2] {err}");
        assert_eq!(err.duplicate_key(), Some(&Identity::from(4)));
        assert_eq!(err.to_string(), "duplicate key: 4");
    }

    #[test]
    fn test_strict_composite_key_reported() {
        let data = vec![json!({"a": 1, "b": "x"}), json!({"a": 1, "b": "y"}), json!({"a": 1, "b": "x"})];
        let err = MemoryStore::with_policy(data, ["a", "b"], DuplicatePolicy::Strict).unwrap_err();
        assert_eq!(err.duplicate_key(), Some(&Identity::from((1, "x"))));
    }

    #[test]
    fn test_strict_stops_at_first_repeat() {
        // A record after the repeat would fail extraction; strict must stop before it.
        let data = vec![json!({"id": 1}), json!({"id": 1}), json!({"nope": 0})];
        let err = MemoryStore::strict(data, "id").unwrap_err();
        assert!(err.duplicate_key().is_some());
    }

    #[test]
    fn test_policy_from_options() {
        let opts = StoreOptions::from_json(r#"{"identity": "id", "duplicates": "strict"}"#).unwrap();
        assert!(MemoryStore::from_options(with_duplicate(), &opts).is_err());

        let store = MemoryStore::from_options(with_duplicate(), &StoreOptions::new("id")).unwrap();
        assert_eq!(store.identity_spec(), &IdentitySpec::field("id"));
        assert!(!store.is_strict());
    }
}

mod tc_2_3_retrieval {
    use super::*;

    #[test]
    fn test_absent_is_none() {
        let store = MemoryStore::new(with_duplicate(), "id").unwrap();
        assert_eq!(store.get(99), None);
        assert_eq!(store.get("1"), None, "string and integer identities differ");
        assert!(!store.contains_key(3));
    }

    #[test]
    fn test_composite_lookup() {
        let data = vec![(1i64, "a", 10i64), (1, "b", 20), (2, "a", 30)];
        let store = MemoryStore::new(data, [0, 1]).unwrap();
        assert_eq!(store.get((1, "b")), Some(&(1, "b", 20)));
        assert_eq!(store.get((2, "b")), None);
        assert_eq!(store.get(1), None, "scalar never matches a composite identity");
    }

    #[test]
    fn test_float_identities() {
        let data = vec![json!({"id": 1.5, "v": "a"}), json!({"id": 2.0, "v": "b"}), json!({"id": 1.5, "v": "c"})];
        let store = MemoryStore::new(data, "id").unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(1.5).map(|r| &r["v"]), Some(&json!("a")));
        assert_eq!(store.get(2).map(|r| &r["v"]), Some(&json!("b")), "integral floats key as integers");
        assert_eq!(store.get(2.5), None);

        let err = MemoryStore::strict(vec![json!({"id": 0.5}), json!({"id": 0.5})], "id").unwrap_err();
        assert_eq!(err.to_string(), "duplicate key: 0.5");
    }

    #[test]
    fn test_identity_of_non_member() {
        let store = MemoryStore::new(with_duplicate(), 0).unwrap();
        assert_eq!(store.identity_of(&row(5, 50)).unwrap(), Identity::from(5));
        assert!(store.identity_of(&json!({"id": 5})).unwrap_err().is_record_access());
    }

    #[test]
    fn test_shared_records() {
        let data: Vec<Arc<Row>> = vec![Arc::new(row(1, 10)), Arc::new(row(2, 20))];
        let store = MemoryStore::new(data.iter().cloned(), "value").unwrap();
        assert!(Arc::ptr_eq(store.get(20).unwrap(), &data[1]));
    }

    #[test]
    fn test_iteration_pairs() {
        let store = MemoryStore::new(with_duplicate(), "id").unwrap();
        let pairs: Vec<(Identity, i64)> = (&store).into_iter().map(|(k, r)| (k.clone(), r.value)).collect();
        assert_eq!(pairs, vec![(Identity::from(1), 10), (Identity::from(2), 20), (Identity::from(4), 40)]);
    }
}

mod tc_2_4_empty_input {
    use super::*;

    #[test]
    fn test_empty_store() {
        let store = MemoryStore::<Row>::new(Vec::new(), "id").unwrap();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert!(store.records().is_empty());
        assert_eq!(store.get(1), None);
        assert_eq!(store.get((1, 2)), None);
        assert!(store.query().collect().unwrap().is_empty());
    }

    #[test]
    fn test_empty_strict_store() {
        let store = MemoryStore::<Row>::strict(std::iter::empty(), 0).unwrap();
        assert!(store.is_empty());
        assert!(store.is_strict());
    }
}
