//! Facade configuration.

use serde::{Deserialize, Serialize};

use postsync_core::ClassifierOptions;

/// Title given to posts created without one.
pub const DEFAULT_POST_TITLE: &str = "Untitled";

/// Configuration for the Postsync facade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostsyncConfig {
    /// Change classifier behavior.
    pub classifier: ClassifierOptions,
    /// Title used by `create_post` when none is given.
    pub default_post_title: String,
}

impl Default for PostsyncConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierOptions::default(),
            default_post_title: DEFAULT_POST_TITLE.to_string(),
        }
    }
}

impl PostsyncConfig {
    pub fn with_classifier(mut self, classifier: ClassifierOptions) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_default_post_title(mut self, title: impl Into<String>) -> Self {
        self.default_post_title = title.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PostsyncConfig::default();
        assert_eq!(config.default_post_title, "Untitled");
        assert!(!config.classifier.normalize_empty_slug);
    }

    #[test]
    fn test_partial_json() {
        let config: PostsyncConfig =
            serde_json::from_str(r#"{"classifier":{"normalize_empty_slug":true}}"#).unwrap();
        assert!(config.classifier.normalize_empty_slug);
        assert_eq!(config.default_post_title, DEFAULT_POST_TITLE);
    }
}
