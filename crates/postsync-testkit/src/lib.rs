//! # Postsync Testkit
//!
//! Testing utilities for Postsync.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden scenarios**: Fixed inputs with the exact change set they must produce
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: A seeded memory store and a scripted remote
//!
//! ## Golden Scenarios
//!
//! ```rust
//! use postsync_testkit::scenarios::verify_all_scenarios;
//!
//! for (name, matches, actual) in verify_all_scenarios() {
//!     assert!(matches, "{}: {}", name, actual);
//! }
//! ```
//!
//! ## Property Testing
//!
//! Use the generators with proptest:
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use postsync_core::diff;
//! use postsync_testkit::generators::EditSession;
//!
//! proptest! {
//!     #[test]
//!     fn diff_is_deterministic(session: EditSession) {
//!         let a = diff(&session.local, &session.baseline).unwrap();
//!         let b = diff(&session.local, &session.baseline).unwrap();
//!         prop_assert_eq!(a, b);
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,no_run
//! use postsync_testkit::fixtures::TestFixture;
//!
//! async fn example() {
//!     let fixture = TestFixture::new().await;
//!     fixture.insert_post("Hello", Some("/hello")).await;
//!     let baseline = fixture.baseline().await;
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod scenarios;

pub use fixtures::{full_post, post, ScriptedRemote, ScriptedReply, TestFixture};
pub use generators::{post_collection, EditSession};
pub use scenarios::{all_scenarios, verify_all_scenarios, GoldenScenario};
