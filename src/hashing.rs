//! Hashing - SHA-256 for generated outputs and stable identifiers
//!
//! Everything here is deterministic: the same plates always hash the same.

use sha2::{Sha256, Digest};
use serde::Serialize;
use serde_json::{Value, to_string};

/// Compute SHA-256 hash of bytes, return hex string
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    hex::encode(result)
}

/// Convert to canonical JSON (sorted keys, no whitespace)
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let v: Value = serde_json::to_value(value)?;
    let sorted = sort_value(&v);
    to_string(&sorted)
}

fn sort_value(v: &Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut sorted: Vec<_> = map.iter().collect();
            sorted.sort_by(|a, b| a.0.cmp(b.0));
            let sorted_map: serde_json::Map<String, Value> = sorted
                .into_iter()
                .map(|(k, v)| (k.clone(), sort_value(v)))
                .collect();
            Value::Object(sorted_map)
        }
        Value::Array(arr) => {
            Value::Array(arr.iter().map(sort_value).collect())
        }
        _ => v.clone()
    }
}

/// Hash of a generation manifest, independent of key order
pub fn compute_manifest_hash<T: Serialize>(manifest: &T) -> Result<String, serde_json::Error> {
    let canonical = canonical_json(manifest)?;
    Ok(sha256_hex(canonical.as_bytes()))
}

/// Small numeric suffix derived from `parts`, used for rule ids.
///
/// stable_u16 = first two bytes of sha256(parts joined by ':')
pub fn stable_u16(parts: &[&str]) -> u16 {
    let mut hasher = Sha256::new();
    hasher.update(parts.join(":").as_bytes());
    let digest = hasher.finalize();
    u16::from_be_bytes([digest[0], digest[1]])
}

mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{:02x}", b)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_json_sorted() {
        let obj = json!({"z": 1, "a": 2, "m": 3});
        let canonical = canonical_json(&obj).unwrap();
        assert_eq!(canonical, r#"{"a":2,"m":3,"z":1}"#);
    }

    #[test]
    fn test_sha256_known_value() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_manifest_hash_ignores_key_order() {
        let a = json!({"filename": "openhasp.yaml", "bytes": 10});
        let b = json!({"bytes": 10, "filename": "openhasp.yaml"});
        assert_eq!(
            compute_manifest_hash(&a).unwrap(),
            compute_manifest_hash(&b).unwrap()
        );
    }

    #[test]
    fn test_stable_u16() {
        // e3b0... is sha256("")
        assert_eq!(stable_u16(&[]), 0xe3b0);
        assert_eq!(stable_u16(&["a", "b"]), stable_u16(&["a", "b"]));
        assert_ne!(stable_u16(&["a", "b"]), stable_u16(&["b", "a"]));
    }
}
