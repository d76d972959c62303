//! # nexus-common
//!
//! Shared snapshot model, permissions, configuration, error handling and
//! utilities used across the Nexus backup crates. This is the foundation
//! layer with no remote calls, just primitives and contracts.

pub mod config;
pub mod error;
pub mod ids;
pub mod models;
pub mod permissions;
pub mod validation;
