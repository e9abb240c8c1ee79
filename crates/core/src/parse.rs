//! Conversion of loosely-typed count payloads into typed updates.
//!
//! Callers hand us whatever JSON object arrived on the wire. Only the four
//! lower-case direction keys are looked at; anything else is ignored.

use serde_json::{Map, Value};

use crate::error::UpdateError;
use crate::model::Direction;

/// Converts one JSON value into a vehicle count.
///
/// Accepted: non-negative integers, floats without a fractional part and
/// strings holding a decimal integer (surrounding whitespace allowed).
pub fn parse_count(direction: Direction, value: &Value) -> Result<u32, UpdateError> {
    let invalid = |reason: &str| UpdateError::InvalidValue {
        direction,
        value: value.to_string(),
        reason: reason.to_string(),
    };

    match value {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                return u32::try_from(u).map_err(|_| invalid("count too large"));
            }
            if n.as_i64().is_some() {
                return Err(invalid("count must not be negative"));
            }
            let f = n.as_f64().ok_or_else(|| invalid("not a number"))?;
            if !f.is_finite() || f.fract() != 0.0 {
                return Err(invalid("count must be a whole number"));
            }
            if f < 0.0 {
                return Err(invalid("count must not be negative"));
            }
            if f > f64::from(u32::MAX) {
                return Err(invalid("count too large"));
            }
            Ok(f as u32)
        }
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.starts_with('-') && trimmed[1..].chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid("count must not be negative"));
            }
            trimmed
                .parse::<u32>()
                .map_err(|e| invalid(&format!("not an integer: {e}")))
        }
        Value::Bool(_) => Err(invalid("expected an integer, found a boolean")),
        Value::Null => Err(invalid("expected an integer, found null")),
        Value::Array(_) | Value::Object(_) => Err(invalid("expected an integer")),
    }
}

/// Extracts every known direction present in `update`, in declaration order.
///
/// Stops at the first value that fails to convert.
pub fn parse_update(update: &Map<String, Value>) -> Result<Vec<(Direction, u32)>, UpdateError> {
    Direction::ALL
        .into_iter()
        .filter_map(|d| update.get(d.as_str()).map(|v| (d, v)))
        .map(|(d, v)| parse_count(d, v).map(|c| (d, c)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_integers_and_numeric_strings() {
        assert_eq!(parse_count(Direction::North, &json!(12)).unwrap(), 12);
        assert_eq!(parse_count(Direction::North, &json!("7")).unwrap(), 7);
        assert_eq!(parse_count(Direction::North, &json!(" 3 ")).unwrap(), 3);
        assert_eq!(parse_count(Direction::North, &json!(4.0)).unwrap(), 4);
    }

    #[test]
    fn rejects_non_counts() {
        for v in [
            json!("abc"),
            json!(-1),
            json!("-5"),
            json!(2.5),
            json!(true),
            json!(null),
            json!([1]),
            json!({"n": 1}),
            json!(5_000_000_000u64),
        ] {
            let err = parse_count(Direction::East, &v).unwrap_err();
            let UpdateError::InvalidValue { direction, .. } = err;
            assert_eq!(direction, Direction::East, "value {v}");
        }
    }

    #[test]
    fn ignores_unknown_and_miscased_keys() {
        let update = json!({"north": 1, "North": 9, "up": "x", "west": "2"});
        let parsed = parse_update(update.as_object().unwrap()).unwrap();
        assert_eq!(parsed, vec![(Direction::North, 1), (Direction::West, 2)]);
    }
}
