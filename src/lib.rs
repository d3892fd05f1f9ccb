pub mod camera;
pub mod config;
pub mod core;
pub mod media;
pub mod util;
pub mod web;

pub use camera::{
    CameraError, CameraRunner, CaptureService, CapturedMedia, RecordingSessionManager,
    RecordingStatus, RpicamRunner, StopOutcome,
};
pub use config::{Config, StartPolicy};
pub use core::CamwebCore;
pub use media::{MediaEntry, MediaError, MediaKind, MediaLibrary};
pub use util::{Tool, ToolAvailability};
pub use web::{build_router, run_server, ServerConfig, WebAppState};
