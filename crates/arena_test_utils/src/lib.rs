//! # Arena Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Fixture templates and caster builders
//! - A gateway that records every notification in order
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod recording;

/// Re-export proptest for convenience.
pub use proptest;
