//! Integration tests for group membership resolution.

pub mod pipeline;
pub mod scope_properties;
