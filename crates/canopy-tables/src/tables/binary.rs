//! Binary serialization for parse-table artifacts using postcard.

use super::json::TablesError;
use super::types::Tables;

impl Tables {
    /// Deserialize an artifact from binary format.
    pub fn from_binary(bytes: &[u8]) -> Result<Self, TablesError> {
        postcard::from_bytes(bytes).map_err(TablesError::Binary)
    }

    /// Serialize to binary format.
    pub fn to_binary(&self) -> Vec<u8> {
        postcard::to_allocvec(self).expect("serialization should not fail")
    }
}
