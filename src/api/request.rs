//! API request types
//!
//! One JSON object per request, discriminated by `op`:
//!
//! ```json
//! {"op":"query","query":"In courses dataset abc, find all entries; show Title."}
//! {"op":"explain","query":"..."}
//! {"op":"add","id":"abc","kind":"courses","content":"<base64 zip or tar>"}
//! {"op":"remove","id":"abc"}
//! {"op":"list"}
//! ```

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::errors::{ApiError, ApiResult};

fn default_kind() -> String {
    "courses".to_string()
}

/// Unified request envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Request {
    Query {
        query: String,
    },
    Explain {
        query: String,
    },
    Add {
        id: String,
        #[serde(default = "default_kind")]
        kind: String,
        /// Base64-encoded zip or tar archive
        content: String,
    },
    Remove {
        id: String,
    },
    List,
}

impl Request {
    /// Parse a request from JSON string
    pub fn parse(json: &str) -> ApiResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| ApiError::invalid_request(format!("Invalid request: {}", e)))
    }
}

/// Decodes base64 archive content
pub fn decode_content(content: &str) -> ApiResult<Vec<u8>> {
    STANDARD
        .decode(content.trim())
        .map_err(|e| ApiError::import_error(format!("Content is not valid base64: {}", e)))
}

/// Encodes archive bytes for an `add` request
pub fn encode_content(archive: &[u8]) -> String {
    STANDARD.encode(archive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiErrorCode;
    use serde_json::json;

    #[test]
    fn test_parse_query() {
        let req = Request::parse(r#"{"op":"query","query":"In courses dataset a, find all entries; show Title."}"#)
            .unwrap();
        assert!(matches!(req, Request::Query { .. }));
    }

    #[test]
    fn test_parse_add_defaults_kind() {
        let json = json!({"op": "add", "id": "abc", "content": "aGVsbG8="}).to_string();
        let req = Request::parse(&json).unwrap();
        assert_eq!(
            req,
            Request::Add {
                id: "abc".into(),
                kind: "courses".into(),
                content: "aGVsbG8=".into()
            }
        );
    }

    #[test]
    fn test_parse_list_and_remove() {
        assert_eq!(Request::parse(r#"{"op":"list"}"#).unwrap(), Request::List);
        assert_eq!(
            Request::parse(r#"{"op":"remove","id":"abc"}"#).unwrap(),
            Request::Remove { id: "abc".into() }
        );
    }

    #[test]
    fn test_invalid_requests() {
        for raw in [
            "not json",
            r#"{"op":"drop"}"#,
            r#"{"query":"x"}"#,
            r#"{"op":"query"}"#,
        ] {
            let err = Request::parse(raw).unwrap_err();
            assert_eq!(err.code(), ApiErrorCode::InvalidRequest, "{}", raw);
        }
    }

    #[test]
    fn test_content_round_trip() {
        let encoded = encode_content(b"archive bytes");
        assert_eq!(decode_content(&encoded).unwrap(), b"archive bytes");
        assert_eq!(
            decode_content("!!!").unwrap_err().code(),
            ApiErrorCode::ImportError
        );
    }
}
