//! Conversions between OpenCV containers and the nalgebra-based core types.

use checkercal_core::{BoardGeometry, CameraMatrix, ImageSize, Pose};
use nalgebra::{Point2, Point3, Vector3};
use opencv::core::{Mat, Point2f, Point3f, Size, Vector};
use opencv::prelude::*;

/// Flatten an OpenCV error into the string carried by capability errors.
pub(crate) fn message(err: opencv::Error) -> String {
    err.to_string()
}

pub(crate) fn cv_size(size: ImageSize) -> Size {
    Size::new(size.width as i32, size.height as i32)
}

pub(crate) fn pattern_size(board: &BoardGeometry) -> Size {
    Size::new(board.cols as i32, board.rows as i32)
}

pub(crate) fn to_cv_points(points: &[Point2<f32>]) -> Vector<Point2f> {
    points.iter().map(|p| Point2f::new(p.x, p.y)).collect()
}

pub(crate) fn from_cv_points(points: &Vector<Point2f>) -> Vec<Point2<f32>> {
    points.iter().map(|p| Point2::new(p.x, p.y)).collect()
}

pub(crate) fn to_cv_object_points(points: &[Point3<f64>]) -> Vector<Point3f> {
    points
        .iter()
        .map(|p| Point3f::new(p.x as f32, p.y as f32, p.z as f32))
        .collect()
}

pub(crate) fn camera_matrix_to_mat(k: &CameraMatrix) -> opencv::Result<Mat> {
    let rows = k.rows();
    Mat::from_slice_2d(rows.as_slice())
}

/// Read `fx, fy, cx, cy, skew` from a 3x3 `CV_64F` matrix.
pub(crate) fn camera_matrix_from_mat(mat: &Mat) -> opencv::Result<CameraMatrix> {
    let mut k = CameraMatrix::new(
        *mat.at_2d::<f64>(0, 0)?,
        *mat.at_2d::<f64>(1, 1)?,
        *mat.at_2d::<f64>(0, 2)?,
        *mat.at_2d::<f64>(1, 2)?,
    );
    k.skew = *mat.at_2d::<f64>(0, 1)?;
    Ok(k)
}

/// Elements of a single-row or single-column `CV_64F` matrix.
pub(crate) fn mat_to_vec(mat: &Mat) -> opencv::Result<Vec<f64>> {
    (0..mat.total() as i32)
        .map(|i| mat.at::<f64>(i).copied())
        .collect()
}

pub(crate) fn vector3_from_mat(mat: &Mat) -> opencv::Result<Vector3<f64>> {
    Ok(Vector3::new(
        *mat.at::<f64>(0)?,
        *mat.at::<f64>(1)?,
        *mat.at::<f64>(2)?,
    ))
}

pub(crate) fn poses_from_mats(
    rvecs: &Vector<Mat>,
    tvecs: &Vector<Mat>,
) -> opencv::Result<Vec<Pose>> {
    rvecs
        .iter()
        .zip(tvecs.iter())
        .map(|(r, t)| Ok(Pose::new(vector3_from_mat(&r)?, vector3_from_mat(&t)?)))
        .collect()
}
