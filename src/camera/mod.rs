//! Camera control: external tool runners, one-shot capture, continuous
//! recording sessions, conversion and preview framing.

pub mod capture;
pub mod convert;
pub mod error;
pub mod mock;
pub mod naming;
pub mod preview;
pub mod runner;
pub mod session;

pub use capture::{CaptureService, CapturedMedia};
pub use convert::{ConversionReport, InFlightCaptures};
pub use error::CameraError;
pub use preview::MjpegSplitter;
pub use runner::{CameraRunner, RpicamRunner};
pub use session::{RecordingSessionManager, RecordingStarted, RecordingStatus, StopOutcome};
