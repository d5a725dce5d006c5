use crate::{ErrorCode, RequestId};
use serde::{Deserialize, Serialize};

/// The structured failure envelope every outward-facing handler returns
/// instead of a raw exception.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: String,
    pub error_code: ErrorCode,
    pub request_id: RequestId,
}

impl ErrorEnvelope {
    pub fn new(error_code: ErrorCode, message: impl Into<String>, request_id: RequestId) -> Self {
        Self {
            success: false,
            error: message.into(),
            error_code,
            request_id,
        }
    }
}
