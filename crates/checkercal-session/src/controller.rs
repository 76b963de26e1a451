//! Capture → calibrate → preview state machine.

use crate::capability::{
    CalibrateError, CalibrationProblem, Calibrator, CaptureOverlay, Display, DisplayError, Frame,
    FrameSource, KeySource, TargetDetector, UndistortError, UndistortMap, Undistortion,
};
use crate::{Command, SessionConfig};
use checkercal_core::{
    reprojection_error, BoardGeometry, CalibrationResult, ImageSize, ProjectionError,
    ResultIoError, ResultWriter, Sample, SampleError, SampleStore,
};
use log::{debug, info, warn};
use nalgebra::{Point2, Point3};

#[cfg(feature = "tracing")]
use tracing::instrument;

const INSTRUCTIONS: &str = "s: save, c: calibrate, q: quit";

/// Session phases. `Calibrating` lasts exactly one step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Capturing,
    Calibrating,
    Previewing,
    Terminated,
}

#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Display(#[from] DisplayError),
    #[error(transparent)]
    Calibrate(#[from] CalibrateError),
    #[error(transparent)]
    Undistort(#[from] UndistortError),
    #[error(transparent)]
    Sample(#[from] SampleError),
    #[error(transparent)]
    Projection(#[from] ProjectionError),
    #[error(transparent)]
    ResultIo(#[from] ResultIoError),
    #[error("calibration requested before any frame was captured")]
    NoFrameSize,
    #[error("preview entered without a calibration result")]
    NoResult,
}

/// Borrowed capabilities the controller drives.
pub struct Capabilities<'a, F: Frame> {
    pub frames: &'a mut dyn FrameSource<Frame = F>,
    pub keys: &'a mut dyn KeySource,
    pub display: &'a mut dyn Display<F>,
    pub detector: &'a dyn TargetDetector<F>,
    pub calibrator: &'a dyn Calibrator,
    pub undistortion: &'a dyn Undistortion<F>,
    pub writer: &'a dyn ResultWriter,
}

/// Summary returned by [`SessionController::run`].
#[derive(Clone, Debug)]
pub struct SessionOutcome {
    pub samples: usize,
    pub result: Option<CalibrationResult>,
}

/// Interactive calibration session.
///
/// The board geometry comes from the sample store, so detected corners,
/// stored samples and the solver template always agree. Frame source and
/// display are released exactly once: on entering `Terminated`, after an
/// error, or when the controller is dropped.
pub struct SessionController<'a, F: Frame> {
    config: &'a SessionConfig,
    caps: Capabilities<'a, F>,
    store: &'a mut SampleStore,
    object_points: Vec<Point3<f64>>,
    phase: Phase,
    image_size: Option<ImageSize>,
    result: Option<CalibrationResult>,
    remap: Option<Box<dyn UndistortMap<F> + 'a>>,
    status: Vec<String>,
    released: bool,
}

impl<'a, F: Frame> SessionController<'a, F> {
    pub fn new(
        config: &'a SessionConfig,
        caps: Capabilities<'a, F>,
        store: &'a mut SampleStore,
    ) -> Self {
        let object_points = store.board().object_points();
        Self {
            config,
            caps,
            store,
            object_points,
            phase: Phase::Capturing,
            image_size: None,
            result: None,
            remap: None,
            status: Vec::new(),
            released: false,
        }
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn store(&self) -> &SampleStore {
        self.store
    }

    #[inline]
    pub fn result(&self) -> Option<&CalibrationResult> {
        self.result.as_ref()
    }

    /// Size of the most recent capture frame.
    #[inline]
    pub fn image_size(&self) -> Option<ImageSize> {
        self.image_size
    }

    /// Run until `Terminated`.
    pub fn run(&mut self) -> Result<SessionOutcome, SessionError> {
        info!("capture started: {INSTRUCTIONS}");
        while self.step()? != Phase::Terminated {}
        Ok(SessionOutcome {
            samples: self.store.count(),
            result: self.result.clone(),
        })
    }

    /// Advance the state machine by one loop iteration.
    pub fn step(&mut self) -> Result<Phase, SessionError> {
        let outcome = match self.phase {
            Phase::Capturing => self.capture_step(),
            Phase::Calibrating => self.calibrate_step(),
            Phase::Previewing => self.preview_step(),
            Phase::Terminated => Ok(Phase::Terminated),
        };

        let next = match outcome {
            Ok(next) => next,
            Err(err) => {
                self.phase = Phase::Terminated;
                self.release();
                return Err(err);
            }
        };

        if next != self.phase {
            debug!("session phase {:?} -> {:?}", self.phase, next);
        }
        if next == Phase::Terminated {
            self.release();
        }
        self.phase = next;
        Ok(next)
    }

    fn capture_step(&mut self) -> Result<Phase, SessionError> {
        let Some(frame) = self.caps.frames.next_frame() else {
            info!("frame source ended during capture");
            return Ok(Phase::Terminated);
        };
        self.image_size = Some(frame.size());

        let board = *self.store.board();
        let corners = self.find_board(&frame, &board);

        self.status = vec![
            INSTRUCTIONS.to_string(),
            format!(
                "collected: {}/{}",
                self.store.count(),
                self.config.target_samples
            ),
        ];
        let overlay = CaptureOverlay {
            board: &board,
            corners: corners.as_deref(),
            lines: &self.status,
        };
        self.caps.display.show_capture(&frame, &overlay)?;

        match self.poll_command() {
            Some(Command::Quit) => Ok(Phase::Terminated),
            Some(Command::Save) => {
                if let Some(corners) = corners {
                    self.save_sample(&board, corners)?;
                }
                Ok(Phase::Capturing)
            }
            Some(Command::Calibrate) => {
                let have = self.store.count();
                if have < self.config.min_samples {
                    info!(
                        "too few samples to calibrate: need at least {}, have {}",
                        self.config.min_samples, have
                    );
                    Ok(Phase::Capturing)
                } else {
                    Ok(Phase::Calibrating)
                }
            }
            None => Ok(Phase::Capturing),
        }
    }

    /// Detect and refine; any detector failure counts as "board not found".
    fn find_board(&self, frame: &F, board: &BoardGeometry) -> Option<Vec<Point2<f32>>> {
        let corners = match self.caps.detector.detect(frame, board) {
            Ok(found) => found?,
            Err(err) => {
                warn!("board detection failed: {err}");
                return None;
            }
        };
        match self
            .caps
            .detector
            .refine_sub_pixel(frame, corners, &self.config.sub_pixel)
        {
            Ok(refined) => Some(refined),
            Err(err) => {
                warn!("sub-pixel refinement failed: {err}");
                None
            }
        }
    }

    fn save_sample(
        &mut self,
        board: &BoardGeometry,
        corners: Vec<Point2<f32>>,
    ) -> Result<(), SessionError> {
        let count = self.store.append(Sample::new(board, corners)?)?;
        info!("saved sample #{count}");
        if count == self.config.target_samples {
            info!("collection goal of {count} samples reached; press 'c' to calibrate");
        }
        Ok(())
    }

    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self), fields(samples = self.store.count()))
    )]
    fn calibrate_step(&mut self) -> Result<Phase, SessionError> {
        let image_size = self.image_size.ok_or(SessionError::NoFrameSize)?;
        let samples = self.store.all();
        info!(
            "calibrating from {} samples at {}x{}",
            samples.len(),
            image_size.width,
            image_size.height
        );

        let problem = CalibrationProblem {
            object_points: &self.object_points,
            samples,
            image_size,
            model: self.config.distortion_model,
        };
        let solution = self.caps.calibrator.calibrate(&problem)?;
        info!("RMS error = {:.4} ({})", solution.rms, quality_grade(solution.rms));

        let stats = reprojection_error(
            &solution.camera(),
            &self.object_points,
            samples,
            &solution.poses,
        )?;
        info!("mean reprojection error (RMSE) = {:.4} px", stats.mean);
        if let Some((idx, err)) = stats.worst_sample() {
            debug!("worst sample is #{} at {:.4} px", idx + 1, err);
        }

        let result = CalibrationResult::new(
            solution,
            stats,
            image_size,
            *self.store.board(),
            self.config.distortion_model,
        );
        let path = self.caps.writer.write(&result)?;
        info!("calibration result written to {}", path.display());

        self.result = Some(result);
        Ok(Phase::Previewing)
    }

    fn preview_step(&mut self) -> Result<Phase, SessionError> {
        if self.remap.is_none() {
            self.remap = Some(self.prepare_remap()?);
            info!("undistortion preview started; press 'q' to leave");
        }

        let Some(frame) = self.caps.frames.next_frame() else {
            info!("frame source ended during preview");
            return Ok(Phase::Terminated);
        };
        let Some(remap) = self.remap.as_deref() else {
            return Err(SessionError::NoResult);
        };
        let corrected = remap.apply(&frame)?;
        self.caps.display.show_preview(&corrected)?;

        match self.poll_command() {
            Some(Command::Quit) => Ok(Phase::Terminated),
            _ => Ok(Phase::Previewing),
        }
    }

    #[cfg_attr(feature = "tracing", instrument(level = "info", skip(self)))]
    fn prepare_remap(&self) -> Result<Box<dyn UndistortMap<F>>, SessionError> {
        let result = self.result.as_ref().ok_or(SessionError::NoResult)?;
        Ok(self.caps.undistortion.prepare(result)?)
    }

    fn poll_command(&mut self) -> Option<Command> {
        self.caps
            .keys
            .poll_key(self.config.key_poll_timeout())
            .and_then(Command::from_key)
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.caps.frames.release();
        self.caps.display.close();
        debug!("frame source and display released");
    }
}

impl<F: Frame> Drop for SessionController<'_, F> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Rough verbal grade of a solver RMS, in pixels.
pub fn quality_grade(rms: f64) -> &'static str {
    if rms < 0.2 {
        "very good"
    } else if rms < 0.5 {
        "good"
    } else if rms < 1.0 {
        "fine"
    } else if rms < 2.0 {
        "bad"
    } else {
        "very bad"
    }
}
