//! Diff engine: computes the change set between a local working copy and
//! its baseline snapshot.
//!
//! Algorithm:
//! 1. Index both collections by id (rejecting duplicate ids)
//! 2. Walk `local` in order: a baseline-absent id is a create, a present id
//!    with changed tracked fields is an update, anything else is silent
//! 3. Walk `baseline` in order: an id missing from `local` is a delete
//!
//! The three output lists are disjoint by construction: a create is
//! baseline-absent while updates and deletes are baseline-present, and an
//! update is local-present while a delete is local-absent.
//!
//! The engine is pure. It never mutates its inputs and keeps no state
//! between calls, so it can run speculatively on every save.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::classify::{ChangeClassifier, PostCreate, PostUpdate};
use crate::error::{Collection, CoreError, Result};
use crate::post::Post;
use crate::types::PostId;

/// The change set between a local collection and its baseline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDifferences {
    pub updates: Vec<PostUpdate>,
    pub creates: Vec<PostCreate>,
    pub deletes: Vec<PostId>,
}

impl PostDifferences {
    /// Whether there is nothing to send.
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.creates.is_empty() && self.deletes.is_empty()
    }

    /// Total number of operations across all three lists.
    pub fn operation_count(&self) -> usize {
        self.updates.len() + self.creates.len() + self.deletes.len()
    }
}

/// Diff `local` against `baseline` with the default classifier.
pub fn diff(local: &[Post], baseline: &[Post]) -> Result<PostDifferences> {
    ChangeClassifier::default().diff(local, baseline)
}

impl ChangeClassifier {
    /// Diff `local` against `baseline` using this classifier's options.
    ///
    /// Returns [`CoreError::DuplicateId`] if either collection repeats an id.
    pub fn diff(&self, local: &[Post], baseline: &[Post]) -> Result<PostDifferences> {
        let baseline_index = index_by_id(baseline, Collection::Baseline)?;
        let local_ids = unique_ids(local)?;

        let mut changes = PostDifferences::default();

        for post in local {
            match baseline_index.get(&post.id) {
                None => changes.creates.push(self.build_create(post)),
                Some(original) => {
                    if let Some(update) = self.build_update(original, post) {
                        changes.updates.push(update);
                    }
                }
            }
        }

        changes.deletes = baseline
            .iter()
            .filter(|post| !local_ids.contains(&post.id))
            .map(|post| post.id.clone())
            .collect();

        Ok(changes)
    }
}

fn index_by_id(posts: &[Post], collection: Collection) -> Result<HashMap<&PostId, &Post>> {
    let mut index = HashMap::with_capacity(posts.len());
    for post in posts {
        if index.insert(&post.id, post).is_some() {
            return Err(CoreError::DuplicateId {
                collection,
                id: post.id.clone(),
            });
        }
    }
    Ok(index)
}

fn unique_ids(posts: &[Post]) -> Result<HashSet<&PostId>> {
    let mut ids = HashSet::with_capacity(posts.len());
    for post in posts {
        if !ids.insert(&post.id) {
            return Err(CoreError::DuplicateId {
                collection: Collection::Local,
                id: post.id.clone(),
            });
        }
    }
    Ok(ids)
}
