//! Scripted capabilities for driving the session without hardware.

#![allow(dead_code)]

use checkercal_core::synthetic::{project_samples, tilted_poses};
use checkercal_core::{
    BoardGeometry, CalibrationResult, CalibrationSolution, CameraMatrix, CameraModel, Distortion,
    DistortionModel, ImageSize, JsonResultWriter, Pose, Sample, SampleStore,
};
use checkercal_session::{
    CalibrateError, CalibrationProblem, Calibrator, Capabilities, CaptureOverlay, DetectError,
    Display, DisplayError, Frame, FrameSource, KeySource, SessionConfig, SessionController,
    SubPixParams, TargetDetector, UndistortError, UndistortMap, Undistortion,
};
use nalgebra::{Point2, Point3};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::time::Duration;

pub const FRAME_SIZE: ImageSize = ImageSize {
    width: 640,
    height: 480,
};

#[derive(Clone, Debug, PartialEq)]
pub struct TestFrame {
    pub index: usize,
    pub size: ImageSize,
}

impl Frame for TestFrame {
    fn size(&self) -> ImageSize {
        self.size
    }
}

pub struct ScriptedFrames {
    frames: VecDeque<TestFrame>,
    pub served: usize,
    pub released: usize,
}

impl ScriptedFrames {
    pub fn new(count: usize) -> Self {
        Self {
            frames: (0..count)
                .map(|index| TestFrame {
                    index,
                    size: FRAME_SIZE,
                })
                .collect(),
            served: 0,
            released: 0,
        }
    }
}

impl FrameSource for ScriptedFrames {
    type Frame = TestFrame;

    fn next_frame(&mut self) -> Option<TestFrame> {
        let frame = self.frames.pop_front()?;
        self.served += 1;
        Some(frame)
    }

    fn release(&mut self) {
        self.released += 1;
    }
}

/// One key per poll; `-` stands for "no key pressed".
pub struct ScriptedKeys {
    keys: VecDeque<Option<char>>,
    pub polls: usize,
}

impl ScriptedKeys {
    pub fn new(script: &str) -> Self {
        Self {
            keys: script
                .chars()
                .map(|c| if c == '-' { None } else { Some(c) })
                .collect(),
            polls: 0,
        }
    }
}

impl KeySource for ScriptedKeys {
    fn poll_key(&mut self, _timeout: Duration) -> Option<char> {
        self.polls += 1;
        self.keys.pop_front().flatten()
    }
}

/// Offset `ScriptedDetector` removes in `detect` and adds back in refinement.
pub const REFINE_SHIFT: (f32, f32) = (0.25, -0.5);

/// Reports a fixed corner set on selected frames.
///
/// `detect` returns the view shifted by `-REFINE_SHIFT`; only the refined
/// corners match the view exactly.
#[derive(Default)]
pub struct ScriptedDetector {
    views: HashMap<usize, Vec<Point2<f32>>>,
    pub failing_frames: Vec<usize>,
    pub refine_failing_frames: Vec<usize>,
    pub refined: Cell<usize>,
}

impl ScriptedDetector {
    /// Frame `frames[k]` shows `samples[k % samples.len()]`.
    pub fn visible_on(frames: &[usize], samples: &[Sample]) -> Self {
        let views = frames
            .iter()
            .enumerate()
            .map(|(k, &frame)| (frame, samples[k % samples.len()].image_points().to_vec()))
            .collect();
        Self {
            views,
            ..Self::default()
        }
    }
}

impl TargetDetector<TestFrame> for ScriptedDetector {
    fn detect(
        &self,
        frame: &TestFrame,
        _board: &BoardGeometry,
    ) -> Result<Option<Vec<Point2<f32>>>, DetectError> {
        if self.failing_frames.contains(&frame.index) {
            return Err(DetectError::Backend("sensor glitch".into()));
        }
        Ok(self.views.get(&frame.index).map(|view| {
            view.iter()
                .map(|p| Point2::new(p.x - REFINE_SHIFT.0, p.y - REFINE_SHIFT.1))
                .collect()
        }))
    }

    fn refine_sub_pixel(
        &self,
        frame: &TestFrame,
        corners: Vec<Point2<f32>>,
        _params: &SubPixParams,
    ) -> Result<Vec<Point2<f32>>, DetectError> {
        self.refined.set(self.refined.get() + 1);
        if self.refine_failing_frames.contains(&frame.index) {
            return Err(DetectError::Backend("refinement diverged".into()));
        }
        Ok(corners
            .into_iter()
            .map(|p| Point2::new(p.x + REFINE_SHIFT.0, p.y + REFINE_SHIFT.1))
            .collect())
    }
}

#[derive(Clone, Debug)]
pub struct CaptureRecord {
    pub frame: usize,
    pub found: bool,
    pub lines: Vec<String>,
}

#[derive(Default)]
pub struct RecordingDisplay {
    pub captures: Vec<CaptureRecord>,
    pub previews: Vec<usize>,
    pub closed: usize,
}

impl Display<TestFrame> for RecordingDisplay {
    fn show_capture(
        &mut self,
        frame: &TestFrame,
        overlay: &CaptureOverlay<'_>,
    ) -> Result<(), DisplayError> {
        self.captures.push(CaptureRecord {
            frame: frame.index,
            found: overlay.corners.is_some(),
            lines: overlay.lines.to_vec(),
        });
        Ok(())
    }

    fn show_preview(&mut self, frame: &TestFrame) -> Result<(), DisplayError> {
        self.previews.push(frame.index);
        Ok(())
    }

    fn close(&mut self) {
        self.closed += 1;
    }
}

/// Hands back the intrinsics and poses the samples were generated from.
pub struct GroundTruthCalibrator {
    pub camera: CameraModel,
    pub poses: Vec<Pose>,
    pub rms: f64,
    pub fail: bool,
    pub calls: Cell<usize>,
    pub last_problem: RefCell<Option<(usize, ImageSize, DistortionModel)>>,
    pub last_object_points: RefCell<Vec<Point3<f64>>>,
    pub last_image_points: RefCell<Vec<Vec<Point2<f32>>>>,
}

impl Calibrator for GroundTruthCalibrator {
    fn calibrate(
        &self,
        problem: &CalibrationProblem<'_>,
    ) -> Result<CalibrationSolution, CalibrateError> {
        self.calls.set(self.calls.get() + 1);
        *self.last_problem.borrow_mut() =
            Some((problem.samples.len(), problem.image_size, problem.model));
        *self.last_object_points.borrow_mut() = problem.object_points.to_vec();
        *self.last_image_points.borrow_mut() = problem
            .samples
            .iter()
            .map(|s| s.image_points().to_vec())
            .collect();
        if self.fail {
            return Err(CalibrateError::NonConvergence("scripted failure".into()));
        }
        if problem.samples.len() > self.poses.len() {
            return Err(CalibrateError::Backend("more samples than scripted poses".into()));
        }
        Ok(CalibrationSolution {
            camera_matrix: self.camera.matrix,
            distortion: self.camera.distortion.clone(),
            poses: self.poses[..problem.samples.len()].to_vec(),
            rms: self.rms,
        })
    }
}

struct PassThrough;

impl UndistortMap<TestFrame> for PassThrough {
    fn apply(&self, frame: &TestFrame) -> Result<TestFrame, UndistortError> {
        Ok(frame.clone())
    }
}

#[derive(Default)]
pub struct PassThroughUndistortion {
    pub prepared: Cell<usize>,
}

impl Undistortion<TestFrame> for PassThroughUndistortion {
    fn prepare(
        &self,
        _result: &CalibrationResult,
    ) -> Result<Box<dyn UndistortMap<TestFrame>>, UndistortError> {
        self.prepared.set(self.prepared.get() + 1);
        Ok(Box::new(PassThrough))
    }
}

/// Ground-truth camera and exact board views seen through it.
pub fn synthetic_views(n: usize) -> (BoardGeometry, CameraModel, Vec<Pose>, Vec<Sample>) {
    let board = BoardGeometry::default();
    let coeffs = vec![-0.12, 0.03, 0.0005, -0.0004, 0.0, 0.01, 0.0, 0.0];
    let distortion = Distortion::new(coeffs).expect("coeffs");
    let camera = CameraModel::new(CameraMatrix::new(600.0, 598.0, 320.0, 240.0), distortion);
    let poses = tilted_poses(&board, n, 600.0);
    let samples = project_samples(&camera, &board, &poses).expect("views");
    (board, camera, poses, samples)
}

/// All fakes for one session, plus its output location.
pub struct Rig {
    pub frames: ScriptedFrames,
    pub keys: ScriptedKeys,
    pub display: RecordingDisplay,
    pub detector: ScriptedDetector,
    pub calibrator: GroundTruthCalibrator,
    pub undistortion: PassThroughUndistortion,
    pub writer: JsonResultWriter,
    pub config: SessionConfig,
    pub output: PathBuf,
    /// Exact views shown on the visible frames, in order.
    pub views: Vec<Sample>,
    _dir: tempfile::TempDir,
}

impl Rig {
    /// `visible` frames show consecutive synthetic views; `keys` is polled once per step.
    pub fn new(frame_count: usize, visible: &[usize], keys: &str) -> Self {
        let (board, camera, poses, samples) = synthetic_views(visible.len().max(1));
        let dir = tempfile::tempdir().expect("tempdir");
        let output = dir.path().join("camera_calib.json");
        let config = SessionConfig {
            board,
            output_path: output.clone(),
            ..SessionConfig::default()
        };
        Self {
            frames: ScriptedFrames::new(frame_count),
            keys: ScriptedKeys::new(keys),
            display: RecordingDisplay::default(),
            detector: ScriptedDetector::visible_on(visible, &samples),
            calibrator: GroundTruthCalibrator {
                camera,
                poses,
                rms: 0.08,
                fail: false,
                calls: Cell::new(0),
                last_problem: RefCell::new(None),
                last_object_points: RefCell::new(Vec::new()),
                last_image_points: RefCell::new(Vec::new()),
            },
            undistortion: PassThroughUndistortion::default(),
            writer: JsonResultWriter::new(&output),
            config,
            output,
            views: samples,
            _dir: dir,
        }
    }

    pub fn store(&self) -> SampleStore {
        SampleStore::new(self.config.board)
    }

    pub fn session<'a>(
        &'a mut self,
        store: &'a mut SampleStore,
    ) -> SessionController<'a, TestFrame> {
        SessionController::new(
            &self.config,
            Capabilities {
                frames: &mut self.frames,
                keys: &mut self.keys,
                display: &mut self.display,
                detector: &self.detector,
                calibrator: &self.calibrator,
                undistortion: &self.undistortion,
                writer: &self.writer,
            },
            store,
        )
    }
}
