//! Serialization glue for deferred values
//!
//! Thin wrappers over `serde_json` and `serde_yaml`. Values need no custom
//! hooks; anything `Serialize`/`Deserialize` goes through unchanged.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Codec errors
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// JSON encode/decode failure
    #[error("json codec error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML encode/decode failure
    #[error("yaml codec error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Unknown format name
    #[error("unknown format: '{0}' (expected json or yaml)")]
    UnknownFormat(String),
}

/// Text payload format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Format {
    /// Compact JSON
    #[default]
    Json,
    /// YAML document
    Yaml,
}

impl Format {
    /// Lowercase format name
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

impl Display for Format {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(CodecError::UnknownFormat(other.to_string())),
        }
    }
}

/// Encode `value` as text
///
/// # Errors
/// Returns the underlying serializer error.
pub fn encode<V: Serialize + ?Sized>(value: &V, format: Format) -> Result<String, CodecError> {
    let text = match format {
        Format::Json => serde_json::to_string(value)?,
        Format::Yaml => serde_yaml::to_string(value)?,
    };
    Ok(text)
}

/// Decode a value from text
///
/// # Errors
/// Returns the underlying deserializer error.
pub fn decode<V: DeserializeOwned>(text: &str, format: Format) -> Result<V, CodecError> {
    let value = match format {
        Format::Json => serde_json::from_str(text)?,
        Format::Yaml => serde_yaml::from_str(text)?,
    };
    Ok(value)
}
