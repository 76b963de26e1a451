//! Calibration result document and its JSON writer.

use crate::{
    BoardGeometry, CameraMatrix, CameraModel, Distortion, DistortionModel, ImageSize, Pose,
    ReprojectionStats,
};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(thiserror::Error, Debug)]
pub enum ResultIoError {
    #[error("cannot write calibration result to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Outcome of one calibration, as written to disk.
///
/// The first six fields are the stable interface read by downstream tools;
/// the rest are session diagnostics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalibrationResult {
    pub camera_matrix: CameraMatrix,
    pub distortion_coefficients: Distortion,
    pub image_width: u32,
    pub image_height: u32,
    /// RMS reported by the solver.
    pub rms: f64,
    /// Reprojection RMSE recomputed from the estimated poses.
    pub mean_reprojection_error: f64,
    pub distortion_model: DistortionModel,
    pub board: BoardGeometry,
    pub sample_count: usize,
    pub per_sample_errors: Vec<f64>,
    pub poses: Vec<Pose>,
}

/// Solver output for one calibration, before diagnostics are attached.
#[derive(Clone, Debug, PartialEq)]
pub struct CalibrationSolution {
    pub camera_matrix: CameraMatrix,
    pub distortion: Distortion,
    pub poses: Vec<Pose>,
    pub rms: f64,
}

impl CalibrationSolution {
    pub fn camera(&self) -> CameraModel {
        CameraModel::new(self.camera_matrix, self.distortion.clone())
    }
}

impl CalibrationResult {
    pub fn new(
        solution: CalibrationSolution,
        stats: ReprojectionStats,
        image_size: ImageSize,
        board: BoardGeometry,
        distortion_model: DistortionModel,
    ) -> Self {
        Self {
            camera_matrix: solution.camera_matrix,
            distortion_coefficients: solution.distortion,
            image_width: image_size.width,
            image_height: image_size.height,
            rms: solution.rms,
            mean_reprojection_error: stats.mean,
            distortion_model,
            board,
            sample_count: solution.poses.len(),
            per_sample_errors: stats.per_sample,
            poses: solution.poses,
        }
    }

    #[inline]
    pub fn image_size(&self) -> ImageSize {
        ImageSize::new(self.image_width, self.image_height)
    }

    pub fn camera(&self) -> CameraModel {
        CameraModel::new(self.camera_matrix, self.distortion_coefficients.clone())
    }

    /// Load a result from JSON on disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ResultIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this result to disk as pretty JSON, replacing any existing file.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ResultIoError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| ResultIoError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Sink for the finished calibration.
pub trait ResultWriter {
    /// Persist `result` and return where it went.
    fn write(&self, result: &CalibrationResult) -> Result<PathBuf, ResultIoError>;
}

/// Writes the result as pretty JSON to a fixed path.
#[derive(Clone, Debug)]
pub struct JsonResultWriter {
    path: PathBuf,
}

impl JsonResultWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultWriter for JsonResultWriter {
    fn write(&self, result: &CalibrationResult) -> Result<PathBuf, ResultIoError> {
        result.write_json(&self.path)?;
        Ok(self.path.clone())
    }
}
