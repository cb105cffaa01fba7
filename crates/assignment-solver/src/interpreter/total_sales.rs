//! Sum of the `sales` field over a JSON array of records

use serde_json::Value;

use super::{InterpretError, RuleResult};

/// A single `sales` value, kept exact when it is an integer
enum Amount {
    Int(i64),
    Float(f64),
}

/// Sum `sales` across all records; a missing field counts as zero.
///
/// Integer-only input yields an integer string. Any float makes the total a
/// float, which always shows a fractional part ("15.0", not "15").
pub fn sum_sales(data: &[u8]) -> RuleResult {
    let records: Vec<Value> = serde_json::from_slice(data)?;

    let mut int_total: i64 = 0;
    let mut float_total = 0.0_f64;
    let mut saw_float = false;

    for (index, record) in records.iter().enumerate() {
        let object = record
            .as_object()
            .ok_or_else(|| InterpretError::malformed(format!("record {} is not an object", index)))?;

        let amount = match object.get("sales") {
            None | Some(Value::Null) => continue,
            Some(Value::Number(n)) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => Amount::Int(i),
                (None, Some(f)) => Amount::Float(f),
                (None, None) => {
                    return Err(InterpretError::malformed(format!(
                        "record {}: sales {} is out of range",
                        index, n
                    )))
                }
            },
            Some(Value::String(s)) => parse_amount(s.trim()).ok_or_else(|| {
                InterpretError::malformed(format!("record {}: sales '{}' is not a number", index, s))
            })?,
            Some(other) => {
                return Err(InterpretError::malformed(format!(
                    "record {}: sales has unexpected value {}",
                    index, other
                )))
            }
        };

        match amount {
            Amount::Int(i) => {
                int_total = int_total.checked_add(i).ok_or_else(|| {
                    InterpretError::malformed(format!("record {}: sales total overflows", index))
                })?;
            }
            Amount::Float(f) => {
                float_total += f;
                saw_float = true;
            }
        }
    }

    if saw_float {
        Ok(format_float(int_total as f64 + float_total))
    } else {
        Ok(int_total.to_string())
    }
}

fn parse_amount(raw: &str) -> Option<Amount> {
    if let Ok(i) = raw.parse::<i64>() {
        return Some(Amount::Int(i));
    }
    raw.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(Amount::Float)
}

/// Render a float total, keeping ".0" on whole numbers
fn format_float(total: f64) -> String {
    if total.fract() == 0.0 && total.abs() < 1e16 {
        format!("{:.1}", total)
    } else {
        total.to_string()
    }
}
