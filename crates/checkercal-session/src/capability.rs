//! Capabilities the session drives but does not implement.
//!
//! Live implementations sit in a backend crate; tests plug in scripted fakes.
//! Backend failures are carried as strings so this crate stays independent of
//! any particular computer-vision library.

use crate::SubPixParams;
use checkercal_core::{
    BoardGeometry, CalibrationResult, CalibrationSolution, DistortionModel, ImageSize, Sample,
};
use nalgebra::{Point2, Point3};
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum CaptureError {
    #[error("camera device {device} could not be opened")]
    DeviceUnavailable { device: i32 },
    #[error("capture backend: {0}")]
    Backend(String),
}

#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    #[error("detector backend: {0}")]
    Backend(String),
}

#[derive(thiserror::Error, Debug)]
pub enum CalibrateError {
    #[error("calibration needs at least {required} samples, got {samples}")]
    InsufficientData { samples: usize, required: usize },
    #[error("calibration did not converge: {0}")]
    NonConvergence(String),
    #[error("calibration backend: {0}")]
    Backend(String),
}

#[derive(thiserror::Error, Debug)]
pub enum DisplayError {
    #[error("display backend: {0}")]
    Backend(String),
}

#[derive(thiserror::Error, Debug)]
pub enum UndistortError {
    #[error("undistortion backend: {0}")]
    Backend(String),
}

/// A captured image.
pub trait Frame {
    fn size(&self) -> ImageSize;
}

/// Ordered stream of frames from a camera or a recording.
pub trait FrameSource {
    type Frame: Frame;

    /// Next frame, or `None` once the stream has ended or the device failed.
    fn next_frame(&mut self) -> Option<Self::Frame>;

    /// Give the device back. Called once when the session terminates.
    fn release(&mut self) {}
}

/// Operator keyboard.
pub trait KeySource {
    /// Wait up to `timeout` for a key press.
    fn poll_key(&mut self, timeout: Duration) -> Option<char>;
}

/// What the capture view draws on top of the live frame.
#[derive(Clone, Debug)]
pub struct CaptureOverlay<'a> {
    pub board: &'a BoardGeometry,
    /// Refined corners of the current frame, when the board was found.
    pub corners: Option<&'a [Point2<f32>]>,
    pub lines: &'a [String],
}

/// Window the operator looks at.
pub trait Display<F> {
    fn show_capture(
        &mut self,
        frame: &F,
        overlay: &CaptureOverlay<'_>,
    ) -> Result<(), DisplayError>;

    fn show_preview(&mut self, frame: &F) -> Result<(), DisplayError>;

    /// Tear down windows. Called once when the session terminates.
    fn close(&mut self) {}
}

/// Checkerboard finder working on the grayscale view of a frame.
pub trait TargetDetector<F> {
    /// Locate all inner corners of `board`, row-major, or `None` if the full
    /// grid is not visible.
    fn detect(
        &self,
        frame: &F,
        board: &BoardGeometry,
    ) -> Result<Option<Vec<Point2<f32>>>, DetectError>;

    fn refine_sub_pixel(
        &self,
        frame: &F,
        corners: Vec<Point2<f32>>,
        params: &SubPixParams,
    ) -> Result<Vec<Point2<f32>>, DetectError>;
}

/// Inputs of one calibration solve.
#[derive(Clone, Copy, Debug)]
pub struct CalibrationProblem<'a> {
    /// Board template shared by every sample.
    pub object_points: &'a [Point3<f64>],
    pub samples: &'a [Sample],
    pub image_size: ImageSize,
    pub model: DistortionModel,
}

pub trait Calibrator {
    /// Estimate intrinsics, distortion and one pose per sample.
    fn calibrate(
        &self,
        problem: &CalibrationProblem<'_>,
    ) -> Result<CalibrationSolution, CalibrateError>;
}

/// Precomputed remap for a finished calibration.
pub trait UndistortMap<F> {
    fn apply(&self, frame: &F) -> Result<F, UndistortError>;
}

pub trait Undistortion<F> {
    /// Build the remap for `result`. The session builds it once per preview.
    fn prepare(
        &self,
        result: &CalibrationResult,
    ) -> Result<Box<dyn UndistortMap<F>>, UndistortError>;
}
