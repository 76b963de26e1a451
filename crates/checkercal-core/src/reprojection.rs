//! Reprojection error of a calibration, computed independently of the solver.

use crate::{CameraModel, Pose, ProjectionError, Sample};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Aggregate and per-sample reprojection error, in pixels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReprojectionStats {
    /// `sqrt(sum of squared point errors / total point count)`.
    pub mean: f64,
    /// Per-sample RMS, in store order.
    pub per_sample: Vec<f64>,
    pub total_points: usize,
}

impl ReprojectionStats {
    /// Index and RMS of the sample that fits worst.
    pub fn worst_sample(&self) -> Option<(usize, f64)> {
        self.per_sample
            .iter()
            .copied()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(&b.1))
    }
}

/// Project every sample's board points through its pose and compare with
/// the observed corners.
///
/// For each sample the error is the L2 norm over all of its point residuals;
/// its square is accumulated across samples and divided by the total point
/// count before taking the square root.
pub fn reprojection_error(
    camera: &CameraModel,
    object_points: &[Point3<f64>],
    samples: &[Sample],
    poses: &[Pose],
) -> Result<ReprojectionStats, ProjectionError> {
    if poses.len() != samples.len() {
        return Err(ProjectionError::PoseCountMismatch {
            samples: samples.len(),
            poses: poses.len(),
        });
    }

    let mut total_sq = 0.0;
    let mut total_points = 0usize;
    let mut per_sample = Vec::with_capacity(samples.len());

    for (sample, pose) in samples.iter().zip(poses) {
        let projected = camera.project_points(pose, object_points)?;
        let sq: f64 = projected
            .iter()
            .zip(sample.image_points())
            .map(|(p, o)| {
                let dx = p.x - o.x as f64;
                let dy = p.y - o.y as f64;
                dx * dx + dy * dy
            })
            .sum();
        let n = sample.len();
        per_sample.push(if n == 0 { 0.0 } else { (sq / n as f64).sqrt() });
        total_sq += sq;
        total_points += n;
    }

    if total_points == 0 {
        return Err(ProjectionError::NoPoints);
    }

    Ok(ReprojectionStats {
        mean: (total_sq / total_points as f64).sqrt(),
        per_sample,
        total_points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoardGeometry, CameraMatrix, Distortion};
    use approx::assert_relative_eq;
    use nalgebra::{Point2, Vector3};

    // 2x2 board one unit apart, seen head-on from one unit away: corners
    // land on (0,0), (100,0), (0,100), (100,100).
    fn setup() -> (BoardGeometry, CameraModel, Pose) {
        let board = BoardGeometry::new(2, 2, 1.0).expect("board");
        let k = CameraMatrix::new(100.0, 100.0, 0.0, 0.0);
        let camera = CameraModel::new(k, Distortion::default());
        let pose = Pose::new(Vector3::zeros(), Vector3::new(0.0, 0.0, 1.0));
        (board, camera, pose)
    }

    fn sample(board: &BoardGeometry, pts: [(f32, f32); 4]) -> Sample {
        Sample::new(board, pts.iter().map(|&(x, y)| Point2::new(x, y)).collect()).expect("sample")
    }

    #[test]
    fn matches_hand_computed_rmse() {
        let (board, camera, pose) = setup();
        // first sample: one corner off by (3, 4) -> squared error 25
        let a = sample(&board, [(3.0, 4.0), (100.0, 0.0), (0.0, 100.0), (100.0, 100.0)]);
        // second sample: every corner off by 1 px in x -> squared error 4
        let b = sample(&board, [(1.0, 0.0), (101.0, 0.0), (1.0, 100.0), (101.0, 100.0)]);

        let stats = reprojection_error(&camera, &board.object_points(), &[a, b], &[pose, pose])
            .expect("stats");

        assert_eq!(stats.total_points, 8);
        assert_relative_eq!(stats.mean, (29.0f64 / 8.0).sqrt(), epsilon = 1e-9);
        assert_relative_eq!(stats.per_sample[0], 2.5, epsilon = 1e-9);
        assert_relative_eq!(stats.per_sample[1], 1.0, epsilon = 1e-9);
        assert_eq!(stats.worst_sample().map(|(i, _)| i), Some(0));
    }

    #[test]
    fn exact_observations_give_zero_error() {
        let (board, camera, pose) = setup();
        let a = sample(&board, [(0.0, 0.0), (100.0, 0.0), (0.0, 100.0), (100.0, 100.0)]);
        let stats =
            reprojection_error(&camera, &board.object_points(), &[a], &[pose]).expect("stats");
        assert_relative_eq!(stats.mean, 0.0);
    }

    #[test]
    fn pose_count_must_match_samples() {
        let (board, camera, pose) = setup();
        let a = sample(&board, [(0.0, 0.0), (100.0, 0.0), (0.0, 100.0), (100.0, 100.0)]);
        let err = reprojection_error(&camera, &board.object_points(), &[a.clone(), a], &[pose])
            .unwrap_err();
        assert_eq!(err, ProjectionError::PoseCountMismatch { samples: 2, poses: 1 });
    }

    #[test]
    fn empty_input_is_an_error() {
        let (board, camera, _) = setup();
        let err = reprojection_error(&camera, &board.object_points(), &[], &[]).unwrap_err();
        assert_eq!(err, ProjectionError::NoPoints);
    }
}
