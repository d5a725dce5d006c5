//! Stable pattern-signature keys: `(category, title, canonical pattern
//! details)` hashed the same way every time, independent of process or
//! platform, so the same mistake always upserts the same row.

use crate::model::MistakeCategory;
use serde_json::Value;

/// FNV-1a: simple, deterministic, and doesn't depend on a per-process
/// random seed the way `std::collections::hash_map::DefaultHasher` does.
fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;
    bytes.iter().fold(OFFSET_BASIS, |hash, &byte| {
        (hash ^ byte as u64).wrapping_mul(PRIME)
    })
}

fn category_tag(category: MistakeCategory) -> &'static str {
    match category {
        MistakeCategory::Tactical => "tactical",
        MistakeCategory::Positional => "positional",
        MistakeCategory::Opening => "opening",
        MistakeCategory::Endgame => "endgame",
        MistakeCategory::Psychological => "psychological",
    }
}

/// A signature key is stable across runs for the same inputs: serde_json's
/// `Value` preserves object key order as inserted, so canonicalizing the
/// pattern details before hashing is the caller's responsibility (see
/// `canonicalize`).
pub fn signature_key(category: MistakeCategory, title: &str, pattern_details: &Value) -> String {
    let canonical = canonicalize(pattern_details);
    let input = format!("{}\u{1}{}\u{1}{}", category_tag(category), title, canonical);
    format!("{:016x}", fnv1a(input.as_bytes()))
}

/// Render a `Value` with object keys sorted, so semantically identical
/// pattern details hash identically regardless of insertion order.
pub fn canonicalize(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let rendered: Vec<String> = entries
                .into_iter()
                .map(|(k, v)| format!("{k}:{}", canonicalize(v)))
                .collect();
            format!("{{{}}}", rendered.join(","))
        }
        Value::Array(items) => {
            let rendered: Vec<String> = items.iter().map(canonicalize).collect();
            format!("[{}]", rendered.join(","))
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn same_inputs_hash_identically() {
        let details = json!({"square": "e4", "piece": "queen"});
        let a = signature_key(MistakeCategory::Tactical, "hanging queen", &details);
        let b = signature_key(MistakeCategory::Tactical, "hanging queen", &details);
        assert_eq!(a, b);
    }

    #[test]
    fn key_order_does_not_change_the_hash() {
        let a = json!({"square": "e4", "piece": "queen"});
        let b = json!({"piece": "queen", "square": "e4"});
        assert_eq!(canonicalize(&a), canonicalize(&b));
    }

    #[test]
    fn different_titles_hash_differently() {
        let details = json!({"square": "e4"});
        let a = signature_key(MistakeCategory::Tactical, "hanging queen", &details);
        let b = signature_key(MistakeCategory::Tactical, "hanging rook", &details);
        assert_ne!(a, b);
    }
}
