//! Canonical payload derivation.
//!
//! The canonical payload is what a maintainer signs: the profile with the
//! `device.signature` key removed, every mapping sorted by key, serialized
//! as block-style YAML. Because the form depends only on content, two
//! parses of the same profile in different key orders produce identical
//! bytes.

use std::cmp::Ordering;

use serde_yaml::value::TaggedValue;
use serde_yaml::{Number, Value};

use crate::document::Profile;
use crate::error::ProfileError;

/// Identifier of the canonicalization rule implemented here.
///
/// Signers must sign the output of this exact rule.
pub const CANONICAL_FORM: &str = "tessera-canonical-v1";

/// Produce the canonical payload bytes for `profile`.
pub fn canonicalize(profile: &Profile) -> Result<Vec<u8>, ProfileError> {
    let mut value = profile.as_value().clone();
    if let Some(device) = value.get_mut("device").and_then(Value::as_mapping_mut) {
        device.remove("signature");
    }

    let text = serde_yaml::to_string(&sorted(&value)).map_err(ProfileError::CanonicalError)?;
    Ok(text.into_bytes())
}

fn sorted(value: &Value) -> Value {
    match value {
        Value::Mapping(map) => {
            let mut entries: Vec<(&Value, &Value)> = map.iter().collect();
            entries.sort_by(|(a, _), (b, _)| key_order(a, b));
            Value::Mapping(
                entries
                    .into_iter()
                    .map(|(k, v)| (sorted(k), sorted(v)))
                    .collect(),
            )
        }
        Value::Sequence(seq) => Value::Sequence(seq.iter().map(sorted).collect()),
        Value::Tagged(tagged) => Value::Tagged(Box::new(TaggedValue {
            tag: tagged.tag.clone(),
            value: sorted(&tagged.value),
        })),
        scalar => scalar.clone(),
    }
}

/// Total order over mapping keys: null < bool < number < string < other.
fn key_order(a: &Value, b: &Value) -> Ordering {
    rank(a).cmp(&rank(b)).then_with(|| match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => number_order(x, y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => render(a).cmp(&render(b)),
    })
}

const fn rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Sequence(_) | Value::Mapping(_) | Value::Tagged(_) => 4,
    }
}

fn number_order(x: &Number, y: &Number) -> Ordering {
    if let (Some(a), Some(b)) = (x.as_i64(), y.as_i64()) {
        return a.cmp(&b);
    }
    if let (Some(a), Some(b)) = (x.as_u64(), y.as_u64()) {
        return a.cmp(&b);
    }
    let (a, b) = (x.as_f64().unwrap_or(f64::NAN), y.as_f64().unwrap_or(f64::NAN));
    a.partial_cmp(&b)
        .unwrap_or(Ordering::Equal)
        .then_with(|| x.to_string().cmp(&y.to_string()))
}

fn render(value: &Value) -> String {
    serde_yaml::to_string(value).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILE: &str = r"
device:
  model: Meter 3000
  id: acme-meter-3000
  manufacturer: Acme
  signature:
    pgp: c2lnbmF0dXJl
    signed_by: alice@example.com
registers:
  10:
    name: voltage
    type: float32
  2:
    type: uint16
    name: status
";

    fn parse(yaml: &str) -> Profile {
        Profile::from_yaml_str(yaml, "test.yaml").expect("parse")
    }

    fn canonical_text(yaml: &str) -> String {
        String::from_utf8(canonicalize(&parse(yaml)).expect("canonicalize")).expect("utf-8")
    }

    #[test]
    fn signature_key_is_removed_entirely() {
        let text = canonical_text(PROFILE);
        assert!(!text.contains("signature"), "got:\n{text}");
        assert!(!text.contains("signed_by"), "got:\n{text}");
        assert!(text.contains("manufacturer: Acme"));
    }

    #[test]
    fn keys_are_sorted_numerically_and_lexically() {
        let text = canonical_text(PROFILE);
        let device = text.find("device:").expect("device");
        let registers = text.find("registers:").expect("registers");
        assert!(device < registers);

        let id = text.find("id:").expect("id");
        let model = text.find("model:").expect("model");
        assert!(id < model);

        let two = text.find("2:").expect("2");
        let ten = text.find("10:").expect("10");
        assert!(two < ten, "numeric keys should sort numerically:\n{text}");
    }

    #[test]
    fn reordered_input_yields_identical_bytes() {
        let reordered = r"
registers:
  2:
    name: status
    type: uint16
  10:
    type: float32
    name: voltage
device:
  manufacturer: Acme
  id: acme-meter-3000
  model: Meter 3000
";
        assert_eq!(canonical_text(PROFILE), canonical_text(reordered));
    }

    #[test]
    fn canonicalization_is_idempotent_under_reparse() {
        let first = canonical_text(PROFILE);
        let second = canonical_text(&first);
        assert_eq!(first, second);
    }

    #[test]
    fn source_profile_is_untouched() {
        let profile = parse(PROFILE);
        let before = profile.clone();
        canonicalize(&profile).expect("canonicalize");
        assert_eq!(profile, before);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;
        use serde_yaml::Mapping;

        fn mapping_from(entries: &[(String, i64)]) -> Value {
            let mut map = Mapping::new();
            for (k, v) in entries {
                map.insert(Value::String(k.clone()), Value::Number((*v).into()));
            }
            let mut root = Mapping::new();
            root.insert(Value::String("device".to_owned()), Value::Mapping(map));
            Value::Mapping(root)
        }

        proptest! {
            /// Key insertion order never affects the canonical bytes.
            #[test]
            fn insertion_order_is_irrelevant(
                entries in prop::collection::btree_map("[a-z_]{1,12}", any::<i64>(), 0..16),
            ) {
                let forward: Vec<(String, i64)> = entries.clone().into_iter().collect();
                let mut backward = forward.clone();
                backward.reverse();

                let a = Profile::from_value(mapping_from(&forward), "a").unwrap();
                let b = Profile::from_value(mapping_from(&backward), "b").unwrap();
                prop_assert_eq!(canonicalize(&a).unwrap(), canonicalize(&b).unwrap());
            }
        }
    }
}
