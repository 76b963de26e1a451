use crate::convert::{
    camera_matrix_from_mat, cv_size, mat_to_vec, message, poses_from_mats, to_cv_object_points,
    to_cv_points,
};
use checkercal_core::{CalibrationSolution, Distortion, DistortionModel};
use checkercal_session::{CalibrateError, CalibrationProblem, Calibrator};
use log::debug;
use opencv::calib3d;
use opencv::core::{Mat, Point2f, Point3f, TermCriteria, Vector};

/// Zhang-style planar calibration through `calib3d::calibrate_camera`.
#[derive(Clone, Debug, Default)]
pub struct CvCalibrator;

fn model_flags(model: DistortionModel) -> i32 {
    match model {
        DistortionModel::Standard => 0,
        DistortionModel::Rational => calib3d::CALIB_RATIONAL_MODEL,
    }
}

fn backend(err: opencv::Error) -> CalibrateError {
    CalibrateError::Backend(message(err))
}

impl Calibrator for CvCalibrator {
    fn calibrate(
        &self,
        problem: &CalibrationProblem<'_>,
    ) -> Result<CalibrationSolution, CalibrateError> {
        if problem.samples.is_empty() {
            return Err(CalibrateError::InsufficientData {
                samples: 0,
                required: 1,
            });
        }

        let template = to_cv_object_points(problem.object_points);
        let object_points: Vector<Vector<Point3f>> =
            problem.samples.iter().map(|_| template.clone()).collect();
        let image_points: Vector<Vector<Point2f>> = problem
            .samples
            .iter()
            .map(|s| to_cv_points(s.image_points()))
            .collect();

        let mut camera_matrix = Mat::default();
        let mut dist_coeffs = Mat::default();
        let mut rvecs = Vector::<Mat>::new();
        let mut tvecs = Vector::<Mat>::new();
        let rms = calib3d::calibrate_camera(
            &object_points,
            &image_points,
            cv_size(problem.image_size),
            &mut camera_matrix,
            &mut dist_coeffs,
            &mut rvecs,
            &mut tvecs,
            model_flags(problem.model),
            TermCriteria::default().map_err(backend)?,
        )
        .map_err(backend)?;

        if !rms.is_finite() {
            return Err(CalibrateError::NonConvergence(format!("solver RMS is {rms}")));
        }

        let mut coeffs = mat_to_vec(&dist_coeffs).map_err(backend)?;
        debug!("solver returned {} distortion coefficients", coeffs.len());
        coeffs.resize(problem.model.coefficient_count(), 0.0);
        let distortion =
            Distortion::new(coeffs).map_err(|err| CalibrateError::Backend(err.to_string()))?;

        let poses = poses_from_mats(&rvecs, &tvecs).map_err(backend)?;
        if poses.len() != problem.samples.len() {
            return Err(CalibrateError::Backend(format!(
                "solver returned {} poses for {} samples",
                poses.len(),
                problem.samples.len()
            )));
        }

        Ok(CalibrationSolution {
            camera_matrix: camera_matrix_from_mat(&camera_matrix).map_err(backend)?,
            distortion,
            poses,
            rms,
        })
    }
}
