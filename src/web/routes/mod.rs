//! Route tables for the camweb web server.

pub mod api;
pub mod media;
pub mod static_files;
