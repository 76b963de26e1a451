//! Core types for checkerboard camera calibration sessions.
//!
//! This crate holds everything that is pure data or pure math: the board
//! template, accepted samples, the camera/distortion model used to score a
//! calibration, and the result document. With the `tracing` feature it also
//! provides the span-timing subscriber. It does *not* depend on any camera
//! or computer-vision backend.

mod board;
mod camera;
#[cfg(feature = "tracing")]
mod logger;
mod reprojection;
mod result;
mod sample;
pub mod synthetic;

pub use board::{BoardError, BoardGeometry};
pub use camera::{
    CameraMatrix, CameraMatrixError, CameraModel, Distortion, DistortionModel, ImageSize, Pose,
    ProjectionError,
};
pub use reprojection::{reprojection_error, ReprojectionStats};
pub use result::{
    CalibrationResult, CalibrationSolution, JsonResultWriter, ResultIoError, ResultWriter,
};
pub use sample::{Sample, SampleError, SampleStore};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;
