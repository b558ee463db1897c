pub mod chat;
pub mod profile;
pub mod relationship;
pub mod tracking;

use serde::de::{value::StringDeserializer, Deserialize, Deserializer, IntoDeserializer};

/// Older records store unset choices as `""`. Treat blank and null alike.
pub(crate) fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        Some(s) if !s.trim().is_empty() => {
            let de: StringDeserializer<D::Error> = s.into_deserializer();
            T::deserialize(de).map(Some)
        }
        _ => Ok(None),
    }
}

/// Generates a fresh entity id.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
