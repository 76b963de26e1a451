//! Interactive checkerboard camera calibration.
//!
//! An operator holds a printed checkerboard in front of a camera, saves
//! views where the whole grid is detected, and triggers calibration once
//! enough views are collected. The intrinsic matrix and distortion
//! coefficients are written as JSON, then the live feed is shown undistorted
//! for a visual check.
//!
//! ## API map
//! - `checkercal::core`: board template, samples, camera model, reprojection
//!   error, result document and (feature `tracing`) the span-timing subscriber.
//! - `checkercal::session`: capability traits, configuration and the
//!   session state machine.
//! - `checkercal::opencv` (feature `opencv`): live camera, detector, solver,
//!   remap and windows on top of OpenCV.
//! - `checkercal::cli` (feature `cli`): command-line arguments of the
//!   `checkercal` binary.
//! - `checkercal::logging`: console logger setup.
//!
//! ## Driving a session
//!
//! ```no_run
//! # #[cfg(feature = "opencv")]
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use checkercal::opencv::*;
//! use checkercal::session::{Capabilities, SessionConfig, SessionController};
//! use checkercal::{JsonResultWriter, SampleStore};
//!
//! let config = SessionConfig::default();
//! let mut camera = CvCamera::open(&config.capture)?;
//! let mut window = HighGuiWindow::new("calibration")?;
//! let mut keys = HighGuiKeys;
//! let writer = JsonResultWriter::new(&config.output_path);
//! let mut store = SampleStore::new(config.board);
//!
//! let caps = Capabilities {
//!     frames: &mut camera,
//!     keys: &mut keys,
//!     display: &mut window,
//!     detector: &ChessboardDetector::default(),
//!     calibrator: &CvCalibrator,
//!     undistortion: &CvUndistortion,
//!     writer: &writer,
//! };
//! let outcome = SessionController::new(&config, caps, &mut store).run()?;
//! println!("calibrated: {}", outcome.result.is_some());
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "opencv"))]
//! # fn main() {}
//! ```

pub use checkercal_core as core;
pub use checkercal_session as session;

#[cfg(feature = "opencv")]
pub use checkercal_opencv as opencv;

pub use checkercal_core::{
    BoardGeometry, CalibrationResult, CameraMatrix, Distortion, DistortionModel, JsonResultWriter,
    Sample, SampleStore,
};
pub use checkercal_session::{Phase, SessionConfig, SessionController, SessionError};

#[cfg(feature = "cli")]
pub mod cli;
pub mod logging;
