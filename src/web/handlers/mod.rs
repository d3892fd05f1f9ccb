//! HTTP request handlers for the camweb API.

pub mod capture;
pub mod media;
pub mod preview;
pub mod recording;
pub mod system;
