//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors)
//! - `debate` - Conversations, stance extraction, history views and the reply policy

pub mod debate;
pub mod foundation;
