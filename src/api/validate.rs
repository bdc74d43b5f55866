//! Presence checks shared by the mutation handlers.
//! Required strings are trimmed; blank counts as missing.

use serde::{Deserialize, Deserializer};

use crate::error::ApiError;

/// Trimmed, non-empty value or a field error carrying `message`
pub fn required_text(value: Option<String>, field: &str, message: &str) -> Result<String, ApiError> {
    match value.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(ApiError::field(field, message)),
    }
}

/// Trimmed value, with blank collapsed to `None`
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Required absolute http(s) URL
pub fn link_url(value: Option<String>) -> Result<String, ApiError> {
    let raw = required_text(value, "url", "La URL es requerida")?;
    match url::Url::parse(&raw) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(raw),
        _ => Err(ApiError::field("url", "La URL no es válida")),
    }
}

/// `deserialize_with` target telling an explicit `null` (`Some(None)`) from an absent field (`None`).
/// Pair it with `#[serde(default)]`.
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
