use crate::convert::{from_cv_points, message, pattern_size, to_cv_points};
use crate::CvFrame;
use checkercal_core::BoardGeometry;
use checkercal_session::{DetectError, SubPixParams, TargetDetector};
use nalgebra::Point2;
use opencv::core::{
    Mat, Point2f, Size, TermCriteria, TermCriteria_COUNT, TermCriteria_EPS, Vector,
};
use opencv::{calib3d, imgproc};

/// `find_chessboard_corners` followed by `corner_sub_pix`, both on the gray plane.
#[derive(Clone, Debug)]
pub struct ChessboardDetector {
    flags: i32,
}

impl Default for ChessboardDetector {
    fn default() -> Self {
        Self {
            flags: calib3d::CALIB_CB_ADAPTIVE_THRESH | calib3d::CALIB_CB_NORMALIZE_IMAGE,
        }
    }
}

fn gray(frame: &CvFrame) -> Result<&Mat, DetectError> {
    frame
        .gray()
        .ok_or_else(|| DetectError::Backend("frame has no grayscale plane".into()))
}

impl TargetDetector<CvFrame> for ChessboardDetector {
    fn detect(
        &self,
        frame: &CvFrame,
        board: &BoardGeometry,
    ) -> Result<Option<Vec<Point2<f32>>>, DetectError> {
        let mut corners = Vector::<Point2f>::new();
        let found = calib3d::find_chessboard_corners(
            gray(frame)?,
            pattern_size(board),
            &mut corners,
            self.flags,
        )
        .map_err(|err| DetectError::Backend(message(err)))?;

        if !found || corners.len() != board.corner_count() {
            return Ok(None);
        }
        Ok(Some(from_cv_points(&corners)))
    }

    fn refine_sub_pixel(
        &self,
        frame: &CvFrame,
        corners: Vec<Point2<f32>>,
        params: &SubPixParams,
    ) -> Result<Vec<Point2<f32>>, DetectError> {
        let mut points = to_cv_points(&corners);
        let half = params.half_window as i32;
        let criteria = TermCriteria::new(
            TermCriteria_EPS | TermCriteria_COUNT,
            params.max_iterations as i32,
            params.epsilon,
        )
        .map_err(|err| DetectError::Backend(message(err)))?;
        imgproc::corner_sub_pix(
            gray(frame)?,
            &mut points,
            Size::new(half, half),
            Size::new(-1, -1),
            criteria,
        )
        .map_err(|err| DetectError::Backend(message(err)))?;
        Ok(from_cv_points(&points))
    }
}
