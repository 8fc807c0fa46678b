//! Turning a remote reply into a caller-facing result.

use postsync_core::SyncResult;

use crate::error::Result;
use crate::messages::RemoteReply;

/// Normalize the outcome of a remote call into a [`SyncResult`].
///
/// Never fails. Store-reported errors and call failures both become a
/// failed result carrying one error message; a data reply passes through
/// unchanged, conflicts included.
pub fn interpret(outcome: Result<RemoteReply>) -> SyncResult {
    match outcome {
        Ok(RemoteReply::Data(result)) => {
            if result.has_conflicts() {
                tracing::warn!(conflicts = result.conflicts.len(), "remote reported conflicts");
            }
            result
        }
        Ok(RemoteReply::Error(error)) => {
            tracing::warn!(code = ?error.code, message = %error.message, "remote returned an error");
            SyncResult::failure(error.message)
        }
        Err(e) => {
            tracing::warn!(error = %e, "remote call failed");
            SyncResult::failure(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;
    use crate::messages::{RemoteError, RemoteErrorCode};

    #[test]
    fn test_remote_error_becomes_failure() {
        let result = interpret(Ok(RemoteReply::Error(RemoteError {
            message: "permission denied".into(),
            code: None,
        })));

        assert_eq!(
            result,
            SyncResult {
                success: false,
                conflicts: vec![],
                errors: vec!["permission denied".into()],
            }
        );
    }

    #[test]
    fn test_coded_error_keeps_only_message() {
        let result = interpret(Ok(RemoteReply::error(
            RemoteErrorCode::ScopeNotFound,
            "domain not found: x",
        )));
        assert_eq!(result.errors, vec!["domain not found: x".to_string()]);
    }

    #[test]
    fn test_transport_failure_becomes_failure() {
        let result = interpret(Err(SyncError::TransportError("network down".into())));

        assert!(!result.success);
        assert!(result.conflicts.is_empty());
        assert_eq!(result.errors, vec!["transport error: network down".to_string()]);
    }

    #[test]
    fn test_decode_failure_becomes_failure() {
        let err = serde_json::from_str::<RemoteReply>("nope").unwrap_err();
        let result = interpret(Err(SyncError::from(err)));

        assert!(!result.success);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].starts_with("encoding error:"));
    }

    #[test]
    fn test_data_passes_through() {
        let ok = interpret(Ok(RemoteReply::Data(SyncResult::ok())));
        assert_eq!(ok, SyncResult::ok());

        let conflicted = SyncResult::conflicted(vec!["slug a is used by 2 posts".into()]);
        let result = interpret(Ok(RemoteReply::Data(conflicted.clone())));
        assert_eq!(result, conflicted);
    }

    #[test]
    fn test_data_with_errors_passes_through() {
        let odd = SyncResult {
            success: true,
            conflicts: vec![],
            errors: vec!["warning".into()],
        };
        assert_eq!(interpret(Ok(RemoteReply::Data(odd.clone()))), odd);
    }
}
