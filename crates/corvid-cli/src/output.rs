//! Output formatting utilities.

use corvid_codec::RlpItem;
use corvid_types::RawTransaction;
use serde_json::{json, Value};

/// Format bytes as `0x` prefixed hex.
pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parse `0x` prefixed or bare hex.
pub fn from_hex(input: &str) -> anyhow::Result<Vec<u8>> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    hex::decode(digits).map_err(|e| anyhow::anyhow!("invalid hex '{}': {}", input, e))
}

/// Render an RLP item as nested JSON arrays of hex strings.
pub fn rlp_json(item: &RlpItem) -> Value {
    match item {
        RlpItem::String(bytes) => Value::String(to_hex(bytes)),
        RlpItem::List(items) => Value::Array(items.iter().map(rlp_json).collect()),
    }
}

/// Transaction fields as JSON; integers as decimal strings.
pub fn transaction_json(tx: &RawTransaction) -> Value {
    json!({
        "randomId": tx.random_id.to_string(),
        "gasPrice": tx.gas_price.to_string(),
        "gasLimit": tx.gas_limit.to_string(),
        "blockLimit": tx.block_limit,
        "to": tx.to.map(|a| a.to_string()),
        "value": tx.value.to_string(),
        "data": to_hex(&tx.data),
        "chainId": tx.chain_id,
        "groupId": tx.group_id,
        "extraData": to_hex(&tx.extra_data),
    })
}

/// Render a value for stdout.
pub fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_helpers() {
        assert_eq!(to_hex(&[0xab, 0x01]), "0xab01");
        assert_eq!(from_hex("0xab01").unwrap(), vec![0xab, 0x01]);
        assert_eq!(from_hex(" AB01 ").unwrap(), vec![0xab, 0x01]);
        assert!(from_hex("0xabc").is_err());
    }

    #[test]
    fn test_rlp_json() {
        let item = RlpItem::list(vec![RlpItem::bytes(b"dog".to_vec()), RlpItem::list(vec![])]);
        assert_eq!(rlp_json(&item), json!(["0x646f67", []]));
    }

    #[test]
    fn test_render() {
        assert_eq!(render(&json!("0x00")), "0x00");
        assert!(render(&json!({"a": 1})).contains("\"a\": 1"));
    }
}
