//! JSON (de)serialization for parse-table artifacts.

use super::types::Tables;

/// Error while decoding an artifact.
#[derive(Debug)]
pub enum TablesError {
    Json(serde_json::Error),
    Binary(postcard::Error),
}

impl std::fmt::Display for TablesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Binary(e) => write!(f, "binary decode error: {e}"),
        }
    }
}

impl std::error::Error for TablesError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            Self::Binary(e) => Some(e),
        }
    }
}

impl Tables {
    /// Parse an artifact from its JSON encoding.
    pub fn from_json(json: &str) -> Result<Self, TablesError> {
        serde_json::from_str(json).map_err(TablesError::Json)
    }

    /// Serialize to the JSON interchange encoding.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).expect("serialization should not fail")
    }
}
