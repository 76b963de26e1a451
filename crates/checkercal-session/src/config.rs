//! JSON session configuration.

use checkercal_core::{BoardError, BoardGeometry, DistortionModel};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error("min_samples must be >= 1")]
    ZeroMinSamples,
    #[error("output_path must not be empty")]
    EmptyOutputPath,
}

/// Camera request. Every field is best effort; the device may pick something else.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    pub device: i32,
    pub width: u32,
    pub height: u32,
    pub fps: f64,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            device: 0,
            width: 640,
            height: 480,
            fps: 30.0,
        }
    }
}

/// Corner refinement settings handed to the detector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubPixParams {
    /// Half side of the search window, in pixels.
    pub half_window: u32,
    pub max_iterations: u32,
    pub epsilon: f64,
}

impl Default for SubPixParams {
    fn default() -> Self {
        Self {
            half_window: 11,
            max_iterations: 30,
            epsilon: 0.01,
        }
    }
}

/// Everything a session needs that is not a capability.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub board: BoardGeometry,
    /// Calibration is refused below this many samples.
    pub min_samples: usize,
    /// Collection goal shown to the operator.
    pub target_samples: usize,
    pub output_path: PathBuf,
    /// How long each loop iteration waits for a key.
    pub key_poll_ms: u64,
    pub sub_pixel: SubPixParams,
    pub capture: CaptureSettings,
    pub distortion_model: DistortionModel,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            board: BoardGeometry::default(),
            min_samples: 5,
            target_samples: 20,
            output_path: PathBuf::from("camera_calib.json"),
            key_poll_ms: 10,
            sub_pixel: SubPixParams::default(),
            capture: CaptureSettings::default(),
            distortion_model: DistortionModel::Rational,
        }
    }
}

impl SessionConfig {
    /// Load and validate a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        let cfg: Self = serde_json::from_str(&raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.board.validate()?;
        if self.min_samples == 0 {
            return Err(ConfigError::ZeroMinSamples);
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyOutputPath);
        }
        Ok(())
    }

    #[inline]
    pub fn key_poll_timeout(&self) -> Duration {
        Duration::from_millis(self.key_poll_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let cfg: SessionConfig = serde_json::from_str("{}").expect("parse");
        assert_eq!(cfg, SessionConfig::default());
        assert_eq!(cfg.min_samples, 5);
        assert_eq!(cfg.board.corner_count(), 48);
        assert_eq!(cfg.distortion_model, DistortionModel::Rational);
        assert_eq!(cfg.key_poll_timeout(), Duration::from_millis(10));
    }

    #[test]
    fn partial_overrides_keep_other_defaults() {
        let cfg: SessionConfig = serde_json::from_str(
            r#"{ "board": { "cols": 9, "rows": 7, "spacing": 20.0 },
                 "capture": { "device": 2 },
                 "distortion_model": "standard" }"#,
        )
        .expect("parse");
        assert_eq!(cfg.board.cols, 9);
        assert_eq!(cfg.capture.device, 2);
        assert_eq!(cfg.capture.width, 640);
        assert_eq!(cfg.distortion_model, DistortionModel::Standard);
        assert_eq!(cfg.sub_pixel.half_window, 11);
    }

    #[test]
    fn validation_catches_bad_values() {
        let mut cfg = SessionConfig::default();
        cfg.min_samples = 0;
        assert!(matches!(cfg.validate(), Err(ConfigError::ZeroMinSamples)));

        let mut cfg = SessionConfig::default();
        cfg.board.spacing = -1.0;
        assert!(matches!(cfg.validate(), Err(ConfigError::Board(_))));

        let mut cfg = SessionConfig::default();
        cfg.output_path = PathBuf::new();
        assert!(matches!(cfg.validate(), Err(ConfigError::EmptyOutputPath)));
    }

    #[test]
    fn json_round_trip_through_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.json");
        let mut cfg = SessionConfig::default();
        cfg.target_samples = 12;
        let json = serde_json::to_string_pretty(&cfg).expect("serialize");
        fs::write(&path, json).expect("write");
        assert_eq!(SessionConfig::load_json(&path).expect("load"), cfg);
    }
}
