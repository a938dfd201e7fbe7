//! Tolerant readers for legacy field shapes. Older app builds wrote
//! booleans as strings and numbers as strings; anything unreadable
//! counts as absent rather than failing the whole record.

use mongodb::bson::Bson;
use serde::{Deserialize, Deserializer};

/// Accepts only a real boolean; everything else reads as absent.
pub fn bool_or_none<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Bson>::deserialize(deserializer)?;
    Ok(match value {
        Some(Bson::Boolean(b)) => Some(b),
        _ => None,
    })
}

/// Accepts a number or a numeric string.
pub fn f64_or_string<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Bson>::deserialize(deserializer)?;
    Ok(match value {
        Some(Bson::Double(n)) => Some(n),
        Some(Bson::Int32(n)) => Some(n as f64),
        Some(Bson::Int64(n)) => Some(n as f64),
        Some(Bson::String(s)) => s.parse().ok(),
        _ => None,
    })
}
