//! Monetary amount normalization.
//!
//! The source system sends amounts as integer minor units (cents); the CRM
//! expects major-unit decimals. Malformed or missing amounts normalize to
//! zero rather than failing the call.

use serde::{Deserialize, Deserializer};

/// Convert integer minor units to a major-unit decimal value.
pub fn minor_to_major(minor: Option<i64>) -> f64 {
    minor.unwrap_or(0) as f64 / 100.0
}

/// Tolerant deserializer for minor-unit amounts: accepts integers, floats
/// and numeric strings; anything else degrades to `None`.
pub fn lenient_minor_units<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_minor_units))
}

fn parse_minor_units(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64)),
        serde_json::Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Amount {
        #[serde(default, deserialize_with = "lenient_minor_units")]
        total_amount: Option<i64>,
    }

    fn parse(json: serde_json::Value) -> Option<i64> {
        serde_json::from_value::<Amount>(json).unwrap().total_amount
    }

    #[test]
    fn converts_minor_to_major() {
        assert_eq!(minor_to_major(Some(10000)), 100.0);
        assert_eq!(minor_to_major(Some(1)), 0.01);
        assert_eq!(minor_to_major(Some(0)), 0.0);
    }

    #[test]
    fn missing_amount_defaults_to_zero() {
        assert_eq!(minor_to_major(None), 0.0);
    }

    #[test]
    fn accepts_integer_float_and_string_amounts() {
        assert_eq!(parse(serde_json::json!({"total_amount": 10000})), Some(10000));
        assert_eq!(parse(serde_json::json!({"total_amount": 10000.0})), Some(10000));
        assert_eq!(parse(serde_json::json!({"total_amount": "10000"})), Some(10000));
    }

    #[test]
    fn malformed_amounts_degrade_to_none() {
        assert_eq!(parse(serde_json::json!({"total_amount": "ten"})), None);
        assert_eq!(parse(serde_json::json!({"total_amount": [1, 2]})), None);
        assert_eq!(parse(serde_json::json!({"total_amount": null})), None);
        assert_eq!(parse(serde_json::json!({})), None);
    }
}
