//! Operator-driven checkerboard calibration session.
//!
//! The session loop is a small state machine:
//!
//! - **Capturing**: show live frames with the detected board, save samples
//!   on `s`, ask for calibration on `c`, quit on `q`.
//! - **Calibrating**: run the solver once, score it, write the result.
//! - **Previewing**: show undistorted frames until `q` or end of stream.
//! - **Terminated**: release camera and windows.
//!
//! Camera, keyboard, window, detector, solver and remap are traits in
//! [`capability`], so the state machine runs the same against a live
//! backend or a scripted one.

pub mod capability;
mod command;
mod config;
mod controller;

pub use capability::{
    CalibrateError, CalibrationProblem, Calibrator, CaptureError, CaptureOverlay, DetectError,
    Display, DisplayError, Frame, FrameSource, KeySource, TargetDetector, UndistortError,
    UndistortMap, Undistortion,
};
pub use command::Command;
pub use config::{CaptureSettings, ConfigError, SessionConfig, SubPixParams};
pub use controller::{
    quality_grade, Capabilities, Phase, SessionController, SessionError, SessionOutcome,
};
