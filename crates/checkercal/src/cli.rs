//! Command-line arguments of the `checkercal` binary.

use checkercal_session::{ConfigError, SessionConfig};
use clap::Parser;
use log::LevelFilter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "checkercal",
    version,
    about = "Calibrate a camera from live checkerboard views.",
    long_about = r#"Calibrate a camera from live checkerboard views.

Hold the printed board in front of the camera. When the detected grid is drawn
over the frame, press 's' to keep the view. Vary distance and tilt between
views. Press 'c' to calibrate once enough views are saved, 'q' to quit.

After calibration the result is written as JSON and the live feed is shown
undistorted until 'q' is pressed."#
)]
pub struct Args {
    /// JSON session configuration. Missing fields take their defaults.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Camera device index, overriding the configuration.
    #[arg(short, long)]
    pub device: Option<i32>,

    /// Calibration result path, overriding the configuration.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Console log level (off, error, warn, info, debug, trace). `RUST_LOG`,
    /// when set, refines it per module.
    #[arg(long, default_value = "info")]
    pub log_level: LevelFilter,
}

impl Args {
    /// Effective session configuration: file (or defaults), then flag overrides.
    pub fn session_config(&self) -> Result<SessionConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => SessionConfig::load_json(path)?,
            None => SessionConfig::default(),
        };
        if let Some(device) = self.device {
            config.capture.device = device;
        }
        if let Some(output) = &self.output {
            config.output_path = output.clone();
        }
        config.validate()?;
        Ok(config)
    }
}
