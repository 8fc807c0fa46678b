//! Golden reconciliation scenarios.
//!
//! Each scenario fixes a baseline, a local copy and the exact change set
//! the diff engine must produce for them. Any implementation of the
//! reconciliation rules must reproduce these results.

use postsync_core::{diff, Post, PostCreate, PostDifferences, PostId, PostUpdate};

use crate::fixtures::full_post;

/// A golden reconciliation scenario.
#[derive(Debug, Clone)]
pub struct GoldenScenario {
    /// Human-readable name for the scenario.
    pub name: &'static str,
    /// Last-synchronized state.
    pub baseline: Vec<Post>,
    /// Locally edited state.
    pub local: Vec<Post>,
    /// Expected change set.
    pub expected: PostDifferences,
}

impl GoldenScenario {
    /// Whether dispatching this scenario must reach the remote.
    pub fn expects_remote_call(&self) -> bool {
        !self.expected.is_empty()
    }
}

/// Get all golden scenarios.
pub fn all_scenarios() -> Vec<GoldenScenario> {
    let mut retitled = PostUpdate::new(PostId::new("1"));
    retitled.title = Some("B".into());

    vec![
        GoldenScenario {
            name: "title change becomes a one-field update",
            baseline: vec![full_post("1", "A", Some("a"), None, None)],
            local: vec![full_post("1", "B", Some("a"), None, None)],
            expected: PostDifferences {
                updates: vec![retitled],
                creates: vec![],
                deletes: vec![],
            },
        },
        GoldenScenario {
            name: "unknown local id becomes a create without id",
            baseline: vec![],
            local: vec![full_post("tmp-1", "New", None, None, None)],
            expected: PostDifferences {
                updates: vec![],
                creates: vec![PostCreate::new("New")],
                deletes: vec![],
            },
        },
        GoldenScenario {
            name: "missing baseline id becomes a delete",
            baseline: vec![full_post("3", "Gone", Some("gone"), Some("bye"), Some("dark"))],
            local: vec![],
            expected: PostDifferences {
                updates: vec![],
                creates: vec![],
                deletes: vec![PostId::new("3")],
            },
        },
        GoldenScenario {
            name: "empty collections produce nothing",
            baseline: vec![],
            local: vec![],
            expected: PostDifferences::default(),
        },
        GoldenScenario {
            name: "identical single post produces nothing",
            baseline: vec![full_post("1", "Same", Some("same"), Some("desc"), None)],
            local: vec![full_post("1", "Same", Some("same"), Some("desc"), None)],
            expected: PostDifferences::default(),
        },
    ]
}

/// Run every scenario through the diff engine.
///
/// Returns `(name, matches, actual change set as JSON)` per scenario.
pub fn verify_all_scenarios() -> Vec<(String, bool, String)> {
    all_scenarios()
        .iter()
        .map(|s| match diff(&s.local, &s.baseline) {
            Ok(actual) => {
                let json = serde_json::to_string(&actual).unwrap_or_default();
                (s.name.to_string(), actual == s.expected, json)
            }
            Err(e) => (s.name.to_string(), false, e.to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::ScriptedRemote;
    use postsync_core::SyncResult;
    use postsync_sync::SyncDispatcher;
    use serde_json::json;

    #[test]
    fn test_all_scenarios_match() {
        for (name, matches, actual) in verify_all_scenarios() {
            assert!(matches, "scenario '{}' produced {}", name, actual);
        }
    }

    #[tokio::test]
    async fn test_remote_called_only_when_needed() {
        for scenario in all_scenarios() {
            let dispatcher = SyncDispatcher::new(ScriptedRemote::new());
            let changes = diff(&scenario.local, &scenario.baseline).unwrap();

            let result = dispatcher.dispatch(changes, "scenario.example").await;

            assert_eq!(result, SyncResult::ok(), "scenario '{}'", scenario.name);
            assert_eq!(
                dispatcher.remote().calls(),
                usize::from(scenario.expects_remote_call()),
                "scenario '{}'",
                scenario.name
            );
        }
    }

    #[test]
    fn test_wire_shapes() {
        let scenarios = all_scenarios();

        let update = serde_json::to_value(&scenarios[0].expected).unwrap();
        assert_eq!(
            update,
            json!({ "updates": [{ "id": "1", "title": "B" }], "creates": [], "deletes": [] })
        );

        let create = serde_json::to_value(&scenarios[1].expected.creates[0]).unwrap();
        assert_eq!(
            create,
            json!({ "title": "New", "slug": null, "meta_description": null, "theme_id": null })
        );

        let delete = serde_json::to_value(&scenarios[2].expected.deletes).unwrap();
        assert_eq!(delete, json!(["3"]));
    }
}
