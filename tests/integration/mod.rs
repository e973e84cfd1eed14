//! Integration tests for slotwatch
//!
//! These tests drive several slot monitors on one page through the public
//! API: shared readiness, independent fill detection, retries, unmounting
//! and scenario replay.

pub mod helpers;
pub mod page_level;
pub mod page_lifecycle;
pub mod retries;
pub mod scenarios;
