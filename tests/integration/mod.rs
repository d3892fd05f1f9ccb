//! Integration tests for camweb
//!
//! These tests drive the full router against the mock camera.

#[path = "../common/mod.rs"]
pub mod common;

pub mod cli;
pub mod media_flow;
pub mod recording_flow;
