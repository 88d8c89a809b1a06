use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::{OprError, Result};

/// Payload format the API should answer with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadFormat {
    /// JSON envelope
    #[default]
    Json,
    /// Comma-separated values, passed through untouched
    Csv,
}

impl PayloadFormat {
    /// Value of the `format` query parameter
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

impl std::fmt::Display for PayloadFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata block attached to listing responses
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiMeta {
    /// Total number of matching records
    #[serde(default)]
    pub total: Option<i64>,

    /// Server-side error, when the request was rejected
    #[serde(default)]
    pub error: Option<String>,
}

/// `{results: [...], meta: {...}}` envelope used by the private endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    /// Records returned
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<T>,

    /// Totals and errors
    #[serde(default)]
    pub meta: ApiMeta,
}

impl<T> Envelope<T> {
    /// Surface `meta.error` as an [`OprError::Api`].
    pub fn into_result(self) -> Result<Self> {
        match self.meta.error {
            Some(message) => Err(OprError::Api {
                code: None,
                message,
            }),
            None => Ok(self),
        }
    }

    /// Total reported by the server, zero when absent
    #[must_use]
    pub fn total(&self) -> i64 {
        self.meta.total.unwrap_or(0)
    }
}

/// Treat an explicit JSON `null` like a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// RFC 3339 timestamp that decodes to `None` when empty, null or malformed.
pub(crate) fn lenient_timestamp<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    let Some(text) = raw.as_ref().and_then(serde_json::Value::as_str) else {
        if raw.as_ref().is_some_and(|v| !v.is_null()) {
            debug!(value = ?raw, "ignoring non-string timestamp");
        }
        return Ok(None);
    };
    if text.trim().is_empty() {
        return Ok(None);
    }
    match DateTime::parse_from_rfc3339(text.trim()) {
        Ok(t) => Ok(Some(t.with_timezone(&Utc))),
        Err(e) => {
            debug!(value = text, error = %e, "ignoring malformed timestamp");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_error_becomes_api_error() {
        let env: Envelope<u32> =
            serde_json::from_str(r#"{"results":null,"meta":{"error":"invalid nonce"}}"#).unwrap();
        let err = env.into_result().unwrap_err();
        assert_eq!(err.to_string(), "API error: invalid nonce");
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn missing_meta_is_empty() {
        let env: Envelope<u32> = serde_json::from_str(r#"{"results":[1,2]}"#).unwrap();
        assert_eq!(env.total(), 0);
        assert_eq!(env.into_result().unwrap().results, vec![1, 2]);
    }

    #[derive(Deserialize)]
    struct Stamped {
        #[serde(default, deserialize_with = "lenient_timestamp")]
        at: Option<DateTime<Utc>>,
    }

    #[test]
    fn bad_timestamps_decode_as_none() {
        for json in [
            r#"{"at": ""}"#,
            r#"{"at": null}"#,
            r#"{"at": "2024-13-45"}"#,
            r#"{"at": 1700000000}"#,
            r"{}",
        ] {
            let s: Stamped = serde_json::from_str(json).unwrap();
            assert!(s.at.is_none(), "{json}");
        }
        let s: Stamped = serde_json::from_str(r#"{"at": "2024-05-01T10:00:00Z"}"#).unwrap();
        assert_eq!(s.at.unwrap().to_rfc3339(), "2024-05-01T10:00:00+00:00");
    }

    #[test]
    fn format_query_values() {
        assert_eq!(PayloadFormat::Json.as_str(), "json");
        assert_eq!(PayloadFormat::Csv.to_string(), "csv");
    }
}
