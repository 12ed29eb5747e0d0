//! Canonical serialization for content hashing
//!
//! Blocks and transactions are lowered to a JSON value with a fixed schema,
//! then written with object keys in sorted order and no insignificant
//! whitespace. The same logical block always produces the same bytes.

use super::chain::Block;
use crate::clock::Timestamp;
use crate::transaction::Transaction;
use chrono::SecondsFormat;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

/// RFC 3339, UTC, full nanosecond precision.
pub fn timestamp_string(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn transaction_value(tx: &Transaction) -> Value {
    json!({
        "sender": tx.sender,
        "recipient": tx.recipient,
        "subject_id": tx.subject_id,
        "status": tx.status,
        "created_at": timestamp_string(&tx.created_at),
    })
}

pub fn block_value(block: &Block) -> Value {
    let transactions: Vec<Value> = block.transactions.iter().map(transaction_value).collect();
    json!({
        "index": block.index,
        "timestamp": timestamp_string(&block.timestamp),
        "transactions": transactions,
        "proof": block.proof,
        "previous_hash": block.previous_hash,
    })
}

/// Sorted-key, whitespace-free encoding of `value`.
pub fn encode(value: &Value) -> String {
    let mut out = String::new();
    write_value(value, &mut out);
    out
}

fn write_value(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, val)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_value(val, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

pub fn digest(value: &Value) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(encode(value).as_bytes());
    hasher.finalize().into()
}

pub fn digest_hex(value: &Value) -> String {
    hex::encode(digest(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_keys_are_sorted_regardless_of_insertion_order() {
        let mut a = serde_json::Map::new();
        a.insert("zeta".into(), json!(1));
        a.insert("alpha".into(), json!({"b": 2, "a": [1, "x"]}));
        let mut b = serde_json::Map::new();
        b.insert("alpha".into(), json!({"a": [1, "x"], "b": 2}));
        b.insert("zeta".into(), json!(1));

        let (a, b) = (Value::Object(a), Value::Object(b));
        assert_eq!(encode(&a), r#"{"alpha":{"a":[1,"x"],"b":2},"zeta":1}"#);
        assert_eq!(encode(&a), encode(&b));
        assert_eq!(digest_hex(&a), digest_hex(&b));
    }

    #[test]
    fn test_strings_are_escaped() {
        let v = json!({"status": "say \"hi\"\n"});
        assert_eq!(encode(&v), r#"{"status":"say \"hi\"\n"}"#);
    }

    #[test]
    fn test_timestamp_format_is_fixed() {
        let ts = Utc.timestamp_opt(1_672_531_200, 5_000).unwrap();
        assert_eq!(timestamp_string(&ts), "2023-01-01T00:00:00.000005000Z");

        let next = Utc.timestamp_opt(1_672_531_200, 5_001).unwrap();
        assert_ne!(timestamp_string(&ts), timestamp_string(&next));
    }
}
