use crate::convert::{camera_matrix_to_mat, cv_size, message};
use crate::CvFrame;
use checkercal_core::CalibrationResult;
use checkercal_session::{UndistortError, UndistortMap, Undistortion};
use opencv::core::{Mat, Scalar, Vector, BORDER_CONSTANT, CV_16SC2};
use opencv::{calib3d, imgproc};

/// Builds `init_undistort_rectify_map` tables that keep the calibrated intrinsics.
#[derive(Clone, Debug, Default)]
pub struct CvUndistortion;

struct RemapTable {
    map1: Mat,
    map2: Mat,
}

fn backend(err: opencv::Error) -> UndistortError {
    UndistortError::Backend(message(err))
}

impl Undistortion<CvFrame> for CvUndistortion {
    fn prepare(
        &self,
        result: &CalibrationResult,
    ) -> Result<Box<dyn UndistortMap<CvFrame>>, UndistortError> {
        let k = camera_matrix_to_mat(&result.camera_matrix).map_err(backend)?;
        let dist = Vector::<f64>::from_slice(result.distortion_coefficients.coeffs());
        let mut map1 = Mat::default();
        let mut map2 = Mat::default();
        calib3d::init_undistort_rectify_map(
            &k,
            &dist,
            &Mat::default(),
            &k,
            cv_size(result.image_size()),
            CV_16SC2,
            &mut map1,
            &mut map2,
        )
        .map_err(backend)?;
        Ok(Box::new(RemapTable { map1, map2 }))
    }
}

impl UndistortMap<CvFrame> for RemapTable {
    fn apply(&self, frame: &CvFrame) -> Result<CvFrame, UndistortError> {
        let mut out = Mat::default();
        imgproc::remap(
            frame.bgr(),
            &mut out,
            &self.map1,
            &self.map2,
            imgproc::INTER_LINEAR,
            BORDER_CONSTANT,
            Scalar::default(),
        )
        .map_err(backend)?;
        Ok(CvFrame::display_only(out))
    }
}
