use serde::{Deserialize, Deserializer};

// query strings like `?page=abc` fall back to the default instead of rejecting the request
pub fn deserialize_lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(|value| value.trim().parse().ok()))
}
