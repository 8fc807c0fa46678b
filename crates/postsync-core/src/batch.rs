//! The batch request sent to the backing store.

use serde::{Deserialize, Serialize};

use crate::classify::{PostCreate, PostUpdate};
use crate::diff::PostDifferences;
use crate::types::PostId;

/// Input of the remote batch procedure: a whole change set plus the scope
/// (domain name) it applies to. The backing store applies it as a single
/// transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRequest {
    pub scope: String,
    #[serde(default)]
    pub updates: Vec<PostUpdate>,
    #[serde(default)]
    pub creates: Vec<PostCreate>,
    #[serde(default)]
    pub deletes: Vec<PostId>,
}

impl SyncRequest {
    /// Wrap a change set for `scope`.
    pub fn new(scope: impl Into<String>, changes: PostDifferences) -> Self {
        let PostDifferences {
            updates,
            creates,
            deletes,
        } = changes;
        Self {
            scope: scope.into(),
            updates,
            creates,
            deletes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.creates.is_empty() && self.deletes.is_empty()
    }

    pub fn operation_count(&self) -> usize {
        self.updates.len() + self.creates.len() + self.deletes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape() {
        let mut changes = PostDifferences::default();
        changes.creates.push(PostCreate::new("New"));
        changes.deletes.push(PostId::new("3"));

        let request = SyncRequest::new("example", changes);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "scope": "example",
                "updates": [],
                "creates": [{
                    "title": "New",
                    "slug": null,
                    "meta_description": null,
                    "theme_id": null
                }],
                "deletes": ["3"]
            })
        );
        assert_eq!(request.operation_count(), 2);
    }
}
