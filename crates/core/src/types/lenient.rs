//! Forgiving field decoders for backend records.
//!
//! One malformed field should not fail a whole list fetch. These helpers
//! are used with `#[serde(default, deserialize_with = "...")]`.

use serde::{Deserialize, Deserializer};
use serde_json::Number;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(Number),
    Text(String),
}

/// Treat an explicit `null` the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A stock count sent as a number, a numeric string, `null` or `""`.
///
/// Negative counts clamp to zero and oversized ones to `u32::MAX`. Text that
/// is not a number reads as zero.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<NumberOrText> = Option::deserialize(deserializer)?;
    let count = match value {
        None => return Ok(0),
        Some(NumberOrText::Number(n)) => n
            .as_i64()
            .map(i128::from)
            .or_else(|| n.as_u64().map(i128::from))
            .or_else(|| n.as_f64().map(|f| f.trunc() as i128)),
        Some(NumberOrText::Text(s)) => s.trim().parse::<i128>().ok(),
    };
    Ok(count.map_or(0, |n| u32::try_from(n.max(0)).unwrap_or(u32::MAX)))
}

/// Free text that may arrive as a string, a number or `null`.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<NumberOrText> = Option::deserialize(deserializer)?;
    Ok(match value {
        None => String::new(),
        Some(NumberOrText::Number(n)) => n.to_string(),
        Some(NumberOrText::Text(s)) => s,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Counted {
        #[serde(default, deserialize_with = "lenient_count")]
        stock: u32,
    }

    fn stock(value: serde_json::Value) -> u32 {
        serde_json::from_value::<Counted>(json!({ "stock": value }))
            .unwrap()
            .stock
    }

    #[test]
    fn test_lenient_count_accepts_common_shapes() {
        assert_eq!(stock(json!(12)), 12);
        assert_eq!(stock(json!("7")), 7);
        assert_eq!(stock(json!(null)), 0);
        assert_eq!(stock(json!("")), 0);
        assert_eq!(stock(json!(-3)), 0);
        assert_eq!(stock(json!(4.9)), 4);
    }

    #[test]
    fn test_lenient_count_missing_field_is_zero() {
        let counted: Counted = serde_json::from_value(json!({})).unwrap();
        assert_eq!(counted.stock, 0);
    }

    #[test]
    fn test_lenient_count_reads_words_as_zero() {
        assert_eq!(stock(json!("lots")), 0);
    }
}
