//! Datamosh - keyframe suppression for AVI video
//!
//! This library crate exposes the host-side pieces (configuration, edit
//! planning and the job runner) for integration testing.

pub mod config;
pub mod pipeline;
pub mod plan;
