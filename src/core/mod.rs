//! Core module containing shared infrastructure for camweb.
//!
//! This module provides the foundational components the web layer is built on:
//! - Camera runner, capture service and recording session manager
//! - Media library for the recordings directory
//! - Configuration and tool availability

mod camweb_core;

pub use camweb_core::CamwebCore;
