//! Property-based tests using proptest
//!
//! These tests check the cache bound, eviction order and credential
//! validation against randomized inputs.

use cloudscope::resource::{required_fields, validate};
use cloudscope::{CredentialRecord, Credentials, FetchError, Provider, TtlCache};
use proptest::prelude::*;
use std::collections::{HashSet, VecDeque};
use std::time::Duration;

/// Keys drawn from a small alphabet so overwrites are common
fn arb_keys() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-h]{1,2}", 0..200)
}

fn arb_provider() -> impl Strategy<Value = Provider> {
    prop::sample::select(Provider::ALL.to_vec())
}

/// Insertion-ordered model of the cache: overwrites refresh position
fn model_insert(model: &mut VecDeque<String>, key: &str, max_size: usize) {
    if let Some(pos) = model.iter().position(|k| k == key) {
        model.remove(pos);
    } else if model.len() >= max_size {
        model.pop_front();
    }
    model.push_back(key.to_string());
}

proptest! {
    /// The cache never grows past its bound
    #[test]
    fn cache_never_exceeds_max_size(keys in arb_keys(), max_size in 1usize..16) {
        let cache = TtlCache::new(max_size, Duration::from_secs(3600));
        for (i, key) in keys.iter().enumerate() {
            cache.set(key.clone(), i);
            prop_assert!(cache.len() <= max_size);
        }
    }

    /// Eviction always removes the entry inserted longest ago
    #[test]
    fn cache_evicts_oldest_insertion(keys in arb_keys(), max_size in 1usize..16) {
        let cache = TtlCache::new(max_size, Duration::from_secs(3600));
        let mut model = VecDeque::new();

        for (i, key) in keys.iter().enumerate() {
            cache.set(key.clone(), i);
            model_insert(&mut model, key, max_size);
        }

        prop_assert_eq!(cache.len(), model.len());
        for key in &model {
            prop_assert!(cache.get(key).is_some(), "{} should be cached", key);
        }

        let live: HashSet<&String> = model.iter().collect();
        for key in &keys {
            if !live.contains(key) {
                prop_assert!(cache.get(key).is_none(), "{} should be evicted", key);
            }
        }
    }

    /// The last value written for a key is the one returned
    #[test]
    fn cache_returns_latest_value(keys in arb_keys()) {
        let cache = TtlCache::new(1000, Duration::from_secs(3600));
        for (i, key) in keys.iter().enumerate() {
            cache.set(key.clone(), i);
        }
        for key in &keys {
            let last = keys.iter().rposition(|k| k == key);
            prop_assert_eq!(cache.get(key), last);
        }
    }

    /// Validation reports exactly the required fields that were not supplied
    #[test]
    fn validation_reports_set_difference(
        provider in arb_provider(),
        mask in prop::collection::vec(any::<bool>(), 4),
        extra in "[a-z_]{1,12}",
        value in ".{0,8}",
    ) {
        let required = required_fields(provider).unwrap();
        let mut record = CredentialRecord::new().with(&format!("x_{}", extra), "ignored");
        let mut expected_missing = Vec::new();

        for (field, supplied) in required.iter().zip(mask.iter()) {
            if *supplied {
                record = record.with(field, &value);
            } else {
                expected_missing.push(field.to_string());
            }
        }
        // Fields beyond the mask length are never supplied
        for field in required.iter().skip(mask.len()) {
            expected_missing.push(field.to_string());
        }

        let creds = Credentials::from([(provider, record)]);
        match validate(provider, &creds) {
            Ok(checked) => {
                prop_assert!(expected_missing.is_empty());
                let extra_field = format!("x_{}", extra);
                prop_assert!(checked.contains(&extra_field));
            }
            Err(FetchError::MissingFields { provider: p, fields }) => {
                prop_assert_eq!(p, provider);
                prop_assert_eq!(fields, expected_missing);
            }
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }
}
