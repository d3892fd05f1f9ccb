//! Shared test utilities for camweb
//!
//! This module provides common helpers for integration tests:
//! - A camweb instance backed by the mock camera in a temporary directory
//! - Request helpers for driving the router in-process

pub mod harness;
