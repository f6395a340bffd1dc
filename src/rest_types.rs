use serde::Deserialize;
use serde_json::Value;

use crate::serde_utils;

/// Body of a non-2xx response. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorBody {
    pub message: Option<String>,
    pub code: Option<u16>,
    pub error_type: Option<String>,
    pub response: Option<String>,
}

impl ErrorBody {
    /// Decodes a JSON object field by field; a mistyped field reads as missing.
    /// Returns `None` when the body is not a JSON object.
    pub fn from_slice(body: &[u8]) -> Option<Self> {
        let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(body) else {
            return None;
        };
        let text = |key: &str| map.get(key).and_then(Value::as_str).map(str::to_string);

        Some(Self {
            message: text("message"),
            code: map
                .get("code")
                .and_then(|code| serde_utils::deserialize_lenient_code(code).ok().flatten()),
            error_type: text("type"),
            response: text("response"),
        })
    }
}

/// The subset of a chunk response the upload loop cares about.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChunkResponse {
    #[serde(rename = "$id")]
    pub id: Option<String>,
    #[serde(rename = "chunksUploaded")]
    pub chunks_uploaded: Option<u64>,
}
