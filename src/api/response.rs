//! API response types
//!
//! Every operation answers with a status code and a body:
//!
//! ```json
//! {"code":200,"body":{"result":[...]}}
//! {"code":204,"body":null}
//! {"code":400,"body":{"error":"MALFORMED_QUERY: ..."}}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::errors::ApiError;

/// Response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub code: u16,
    pub body: Value,
}

impl Response {
    /// 200 with `{"result": data}`
    pub fn success(data: Value) -> Self {
        Self {
            code: 200,
            body: json!({ "result": data }),
        }
    }

    /// 200 with any serializable result
    pub fn result<T: Serialize>(data: &T) -> Self {
        match serde_json::to_value(data) {
            Ok(value) => Self::success(value),
            Err(e) => Self::error(&ApiError::internal(format!(
                "Failed to serialize result: {}",
                e
            ))),
        }
    }

    /// 204 with a null body
    pub fn no_content() -> Self {
        Self {
            code: 204,
            body: Value::Null,
        }
    }

    /// Error status with `{"error": "CODE: message"}`
    pub fn error(err: &ApiError) -> Self {
        Self {
            code: err.status_code(),
            body: json!({ "error": format!("{}: {}", err.code(), err.message()) }),
        }
    }

    /// Convert to a single-line JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(
                r#"{{"code":500,"body":{{"error":"INTERNAL_ERROR: {}"}}}}"#,
                e.to_string().replace('"', "'")
            )
        })
    }
}
