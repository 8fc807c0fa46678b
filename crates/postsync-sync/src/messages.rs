//! Wire messages of the remote batch procedure.
//!
//! The request is a [`SyncRequest`] encoded as JSON. The reply is one of:
//!
//! ```text
//! {"data": {"success": true, "conflicts": [], "errors": []}}
//! {"error": {"message": "domain not found: example", "code": "scope_not_found"}}
//! ```

use serde::{Deserialize, Serialize};

use postsync_core::{SyncRequest, SyncResult};

use crate::error::Result;

/// Reply of the backing store to a batch request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteReply {
    /// The batch was processed; the result may still report conflicts.
    Data(SyncResult),
    /// The store refused or failed to process the batch.
    Error(RemoteError),
}

impl RemoteReply {
    /// Shorthand for an error reply.
    pub fn error(code: RemoteErrorCode, message: impl Into<String>) -> Self {
        RemoteReply::Error(RemoteError {
            message: message.into(),
            code: Some(code),
        })
    }
}

/// Error object carried by an error reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteError {
    /// Human-readable description.
    pub message: String,
    /// Error code for programmatic handling, if the store provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<RemoteErrorCode>,
}

/// Error codes a backing store may attach to an error reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteErrorCode {
    /// The batch scope names no domain.
    ScopeNotFound,
    /// The request could not be decoded.
    InvalidRequest,
    /// Internal error in the store.
    InternalError,
    /// A code this client does not know.
    #[serde(other)]
    Unknown,
}

/// Encode a batch request for the wire.
pub fn encode_request(request: &SyncRequest) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(request)?)
}

/// Decode a batch request from the wire.
pub fn decode_request(bytes: &[u8]) -> Result<SyncRequest> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Encode a reply for the wire.
pub fn encode_reply(reply: &RemoteReply) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(reply)?)
}

/// Decode a reply from the wire.
pub fn decode_reply(bytes: &[u8]) -> Result<RemoteReply> {
    Ok(serde_json::from_slice(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_data_reply_shape() {
        let reply = RemoteReply::Data(SyncResult {
            success: false,
            conflicts: vec!["slug taken".into()],
            errors: vec![],
        });

        let value = serde_json::to_value(&reply).unwrap();
        assert_eq!(
            value,
            json!({ "data": { "success": false, "conflicts": ["slug taken"], "errors": [] } })
        );
    }

    #[test]
    fn test_error_reply_without_code() {
        let reply = decode_reply(br#"{"error":{"message":"permission denied"}}"#).unwrap();
        assert_eq!(
            reply,
            RemoteReply::Error(RemoteError {
                message: "permission denied".into(),
                code: None,
            })
        );
    }

    #[test]
    fn test_error_reply_with_code() {
        let reply = RemoteReply::error(RemoteErrorCode::ScopeNotFound, "domain not found: x");
        let bytes = encode_reply(&reply).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(value["error"]["code"], "scope_not_found");
        assert_eq!(decode_reply(&bytes).unwrap(), reply);
    }

    #[test]
    fn test_unrecognized_code_decodes_as_unknown() {
        let reply =
            decode_reply(br#"{"error":{"message":"rate limited","code":"too_many_requests"}}"#)
                .unwrap();
        assert_eq!(
            reply,
            RemoteReply::Error(RemoteError {
                message: "rate limited".into(),
                code: Some(RemoteErrorCode::Unknown),
            })
        );
    }

    #[test]
    fn test_garbage_is_encoding_error() {
        assert!(decode_reply(b"<html>502</html>").is_err());
        assert!(decode_request(b"{}").is_err());
    }

    #[test]
    fn test_request_defaults_missing_lists() {
        let request = decode_request(br#"{"scope":"site","deletes":["1"]}"#).unwrap();
        assert!(request.updates.is_empty());
        assert!(request.creates.is_empty());
        assert_eq!(request.deletes.len(), 1);
    }
}
