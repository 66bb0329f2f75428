use std::collections::HashMap;

use num_bigint::{BigInt, BigUint};
use num_traits::ToPrimitive;

/// Generic tree produced by the lite-client text decoders. Purely
/// structural: values have no identity and live only for the duration of a
/// decode call before being interpreted into typed records.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeValue {
    Int(BigInt),
    Str(String),
    List(Vec<TreeValue>),
    Map(HashMap<String, TreeValue>),
}

impl TreeValue {
    pub fn get(&self, key: &str) -> Option<&TreeValue> {
        match self {
            TreeValue::Map(map) => map.get(key),
            _ => None,
        }
    }

    pub fn at(&self, index: usize) -> Option<&TreeValue> {
        match self {
            TreeValue::List(items) => items.get(index),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<&BigInt> {
        match self {
            TreeValue::Int(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        self.as_int().and_then(|n| n.to_u64())
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_int().and_then(|n| n.to_f64())
    }

    pub fn as_biguint(&self) -> Option<BigUint> {
        self.as_int().and_then(|n| n.to_biguint())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TreeValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[TreeValue]> {
        match self {
            TreeValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Renders the tree as JSON for persistence. Integers wider than 64
    /// bits become decimal strings so the document survives a round trip
    /// through serde_json.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            TreeValue::Int(n) => {
                if let Some(v) = n.to_i64() {
                    serde_json::Value::from(v)
                } else if let Some(v) = n.to_u64() {
                    serde_json::Value::from(v)
                } else {
                    serde_json::Value::String(n.to_string())
                }
            }
            TreeValue::Str(s) => serde_json::Value::String(s.clone()),
            TreeValue::List(items) => {
                serde_json::Value::Array(items.iter().map(TreeValue::to_json).collect())
            }
            TreeValue::Map(map) => {
                let mut obj = serde_json::Map::new();
                for (key, value) in map {
                    obj.insert(key.clone(), value.to_json());
                }
                serde_json::Value::Object(obj)
            }
        }
    }
}

impl From<u64> for TreeValue {
    fn from(value: u64) -> Self {
        TreeValue::Int(BigInt::from(value))
    }
}

impl From<i64> for TreeValue {
    fn from(value: i64) -> Self {
        TreeValue::Int(BigInt::from(value))
    }
}

impl From<&str> for TreeValue {
    fn from(value: &str) -> Self {
        TreeValue::Str(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;
    use num_traits::Num;

    #[test]
    fn test_accessors() {
        let tree = TreeValue::List(vec![
            TreeValue::from(5u64),
            TreeValue::from("x123"),
        ]);
        assert_eq!(tree.at(0).and_then(TreeValue::as_u64), Some(5));
        assert_eq!(tree.at(1).and_then(TreeValue::as_str), Some("x123"));
        assert_eq!(tree.at(2), None);
        assert_eq!(tree.get("missing"), None);
    }

    #[test]
    fn test_to_json_wide_integer_becomes_string() {
        let wide = BigInt::from_str_radix(
            "115792089237316195423570985008687907853269984665640564039457584007913129639935",
            10,
        )
        .unwrap();
        let json = TreeValue::Int(wide.clone()).to_json();
        assert_eq!(json, serde_json::Value::String(wide.to_string()));

        let narrow = TreeValue::from(42u64).to_json();
        assert_eq!(narrow, serde_json::json!(42));
    }
}
