//! Pinhole camera with OpenCV-compatible lens distortion.
//!
//! Distortion coefficients follow the OpenCV ordering
//! `k1, k2, p1, p2[, k3[, k4, k5, k6[, s1, s2, s3, s4]]]`. Missing trailing
//! coefficients are treated as zero. The tilted-sensor terms (`tau_x`,
//! `tau_y`) are not modelled and must be zero when present.

use nalgebra::{Point2, Point3, Rotation3, Vector3};
use serde::{Deserialize, Serialize};

const MAX_COEFFS: usize = 14;
const MODELLED_COEFFS: usize = 12;

/// Image dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ProjectionError {
    #[error("point {index} lies in the camera plane (z = {z:.3e})")]
    DegenerateDepth { index: usize, z: f64 },
    #[error("{0} distortion coefficients given, at most 14 are supported")]
    TooManyCoefficients(usize),
    #[error("tilted-sensor distortion terms are not supported")]
    TiltedSensor,
    #[error("{poses} poses for {samples} samples")]
    PoseCountMismatch { samples: usize, poses: usize },
    #[error("no image points to evaluate")]
    NoPoints,
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum CameraMatrixError {
    #[error("camera matrix bottom row must be [0, 0, 1]")]
    BadBottomRow,
    #[error("camera matrix must be upper triangular")]
    NotUpperTriangular,
}

/// Intrinsic matrix
///
/// ```text
/// | fx  skew cx |
/// | 0   fy   cy |
/// | 0   0    1  |
/// ```
///
/// Serialized as a row-major 3x3 array.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(into = "[[f64; 3]; 3]", try_from = "[[f64; 3]; 3]")]
pub struct CameraMatrix {
    pub fx: f64,
    pub fy: f64,
    pub cx: f64,
    pub cy: f64,
    pub skew: f64,
}

impl CameraMatrix {
    pub fn new(fx: f64, fy: f64, cx: f64, cy: f64) -> Self {
        Self {
            fx,
            fy,
            cx,
            cy,
            skew: 0.0,
        }
    }

    pub fn rows(&self) -> [[f64; 3]; 3] {
        (*self).into()
    }

    /// Map a distorted normalized point to pixels.
    #[inline]
    pub fn to_pixel(&self, x: f64, y: f64) -> Point2<f64> {
        Point2::new(self.fx * x + self.skew * y + self.cx, self.fy * y + self.cy)
    }
}

impl From<CameraMatrix> for [[f64; 3]; 3] {
    fn from(k: CameraMatrix) -> Self {
        [[k.fx, k.skew, k.cx], [0.0, k.fy, k.cy], [0.0, 0.0, 1.0]]
    }
}

impl TryFrom<[[f64; 3]; 3]> for CameraMatrix {
    type Error = CameraMatrixError;

    fn try_from(m: [[f64; 3]; 3]) -> Result<Self, Self::Error> {
        if m[2] != [0.0, 0.0, 1.0] {
            return Err(CameraMatrixError::BadBottomRow);
        }
        if m[1][0] != 0.0 {
            return Err(CameraMatrixError::NotUpperTriangular);
        }
        Ok(Self {
            fx: m[0][0],
            skew: m[0][1],
            cx: m[0][2],
            fy: m[1][1],
            cy: m[1][2],
        })
    }
}

/// Which distortion coefficients the solver is asked to estimate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistortionModel {
    /// `k1, k2, p1, p2, k3`.
    Standard,
    /// Rational radial model: `k1, k2, p1, p2, k3, k4, k5, k6`.
    #[default]
    Rational,
}

impl DistortionModel {
    #[inline]
    pub fn coefficient_count(self) -> usize {
        match self {
            DistortionModel::Standard => 5,
            DistortionModel::Rational => 8,
        }
    }
}

/// Distortion coefficient vector in OpenCV order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Distortion {
    coeffs: Vec<f64>,
}

impl From<Distortion> for Vec<f64> {
    fn from(d: Distortion) -> Self {
        d.coeffs
    }
}

impl TryFrom<Vec<f64>> for Distortion {
    type Error = ProjectionError;

    fn try_from(coeffs: Vec<f64>) -> Result<Self, Self::Error> {
        Distortion::new(coeffs)
    }
}

impl Distortion {
    pub fn new(coeffs: Vec<f64>) -> Result<Self, ProjectionError> {
        if coeffs.len() > MAX_COEFFS {
            return Err(ProjectionError::TooManyCoefficients(coeffs.len()));
        }
        if coeffs.iter().skip(MODELLED_COEFFS).any(|&c| c != 0.0) {
            return Err(ProjectionError::TiltedSensor);
        }
        Ok(Self { coeffs })
    }

    /// All-zero coefficients for `model`.
    pub fn zeros(model: DistortionModel) -> Self {
        Self {
            coeffs: vec![0.0; model.coefficient_count()],
        }
    }

    #[inline]
    pub fn coeffs(&self) -> &[f64] {
        &self.coeffs
    }

    #[inline]
    fn c(&self, i: usize) -> f64 {
        self.coeffs.get(i).copied().unwrap_or(0.0)
    }

    /// Apply lens distortion to an undistorted normalized point.
    pub fn distort(&self, x: f64, y: f64) -> (f64, f64) {
        let (k1, k2, p1, p2, k3) = (self.c(0), self.c(1), self.c(2), self.c(3), self.c(4));
        let (k4, k5, k6) = (self.c(5), self.c(6), self.c(7));
        let (s1, s2, s3, s4) = (self.c(8), self.c(9), self.c(10), self.c(11));

        let r2 = x * x + y * y;
        let r4 = r2 * r2;
        let r6 = r4 * r2;
        let radial = (1.0 + k1 * r2 + k2 * r4 + k3 * r6) / (1.0 + k4 * r2 + k5 * r4 + k6 * r6);

        let xy = x * y;
        let xd = x * radial + 2.0 * p1 * xy + p2 * (r2 + 2.0 * x * x) + s1 * r2 + s2 * r4;
        let yd = y * radial + p1 * (r2 + 2.0 * y * y) + 2.0 * p2 * xy + s3 * r2 + s4 * r4;
        (xd, yd)
    }
}

/// Board-to-camera transform of one sample: Rodrigues rotation + translation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub rvec: Vector3<f64>,
    pub tvec: Vector3<f64>,
}

impl Pose {
    pub fn new(rvec: Vector3<f64>, tvec: Vector3<f64>) -> Self {
        Self { rvec, tvec }
    }

    #[inline]
    pub fn rotation(&self) -> Rotation3<f64> {
        Rotation3::new(self.rvec)
    }

    /// Map a board-frame point into the camera frame.
    #[inline]
    pub fn transform_point(&self, p: &Point3<f64>) -> Point3<f64> {
        self.rotation().transform_point(p) + self.tvec
    }
}

/// Intrinsics plus distortion; everything needed to project board points into pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraModel {
    pub matrix: CameraMatrix,
    pub distortion: Distortion,
}

impl CameraModel {
    pub fn new(matrix: CameraMatrix, distortion: Distortion) -> Self {
        Self { matrix, distortion }
    }

    /// Project board-frame points through `pose` into pixel coordinates.
    pub fn project_points(
        &self,
        pose: &Pose,
        object_points: &[Point3<f64>],
    ) -> Result<Vec<Point2<f64>>, ProjectionError> {
        let rotation = pose.rotation();
        object_points
            .iter()
            .enumerate()
            .map(|(index, p)| {
                let pc = rotation.transform_point(p) + pose.tvec;
                if pc.z.abs() < f64::EPSILON {
                    return Err(ProjectionError::DegenerateDepth { index, z: pc.z });
                }
                let (xd, yd) = self.distortion.distort(pc.x / pc.z, pc.y / pc.z);
                Ok(self.matrix.to_pixel(xd, yd))
            })
            .collect()
    }
}
