//! Documents attached to posts.
//!
//! Document content is a rich tree produced by the editor. Postsync never
//! interprets it; it is carried as an opaque JSON value.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::types::{DocumentId, PostId};

/// A document belonging to a post. A post may carry one document per tag
/// (for example a `mobile` variant next to the default one).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub post_id: PostId,
    #[serde(default)]
    pub tag: Option<String>,
    pub content: Value,
    #[serde(default)]
    pub width: Option<u32>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Content for a freshly created document: one container holding one cell
/// with an empty, left-aligned paragraph.
pub fn empty_document_content() -> Value {
    json!({
        "type": "doc",
        "content": [{
            "type": "container",
            "content": [{
                "type": "cell",
                "attrs": {
                    "color": "foreground",
                    "width": "thicker",
                    "background": "background",
                    "padding": "normal",
                    "height": null
                },
                "content": [{
                    "type": "textblock",
                    "content": [{
                        "type": "paragraph",
                        "attrs": { "align": "left", "size": "medium" }
                    }]
                }]
            }]
        }]
    })
}
