//! OpenCV implementations of the session capabilities.
//!
//! | capability        | implementation          | OpenCV module |
//! |-------------------|-------------------------|---------------|
//! | `FrameSource`     | [`CvCamera`]            | `videoio`     |
//! | `TargetDetector`  | [`ChessboardDetector`]  | `calib3d`, `imgproc` |
//! | `Calibrator`      | [`CvCalibrator`]        | `calib3d`     |
//! | `Undistortion`    | [`CvUndistortion`]      | `calib3d`, `imgproc` |
//! | `Display`         | [`HighGuiWindow`]       | `highgui`     |
//! | `KeySource`       | [`HighGuiKeys`]         | `highgui`     |
//!
//! Everything here needs a system OpenCV and is compiled only with the
//! `opencv` feature.

#[cfg(feature = "opencv")]
mod calibrator;
#[cfg(feature = "opencv")]
mod camera;
#[cfg(feature = "opencv")]
mod convert;
#[cfg(feature = "opencv")]
mod detector;
#[cfg(feature = "opencv")]
mod frame;
#[cfg(feature = "opencv")]
mod highgui;
#[cfg(feature = "opencv")]
mod undistort;

#[cfg(feature = "opencv")]
pub use calibrator::CvCalibrator;
#[cfg(feature = "opencv")]
pub use camera::CvCamera;
#[cfg(feature = "opencv")]
pub use detector::ChessboardDetector;
#[cfg(feature = "opencv")]
pub use frame::CvFrame;
#[cfg(feature = "opencv")]
pub use highgui::{HighGuiKeys, HighGuiWindow};
#[cfg(feature = "opencv")]
pub use undistort::CvUndistortion;
