//! Zine Core - Foundational types for the zine particle engine
//!
//! This crate provides the core types that all other zine crates depend on:
//! - `ScopeId`, `NodeId` - Identifiers for animation scopes and overlay nodes
//! - `Color`, `BlendMode`, `ViewportSize` - Visual and spatial types
//! - Error types and Result alias

mod error;
mod id;
mod types;

pub use error::{Result, ZineError};
pub use id::{NodeId, ScopeId};
pub use types::{BlendMode, Color, ViewportSize};
