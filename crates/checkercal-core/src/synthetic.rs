//! Synthetic board views for exercising the calibration workflow without a camera.
//!
//! Poses keep the board centred in front of the camera and tilt it a little
//! differently in every view, which is what a planar calibration needs.

use crate::{BoardGeometry, CameraModel, Pose, ProjectionError, Sample, SampleError};
use nalgebra::{Rotation3, Vector3};

#[derive(thiserror::Error, Debug)]
pub enum SyntheticError {
    #[error(transparent)]
    Projection(#[from] ProjectionError),
    #[error(transparent)]
    Sample(#[from] SampleError),
}

/// `n_views` poses at `distance`, each tilted about x and y by a few degrees.
pub fn tilted_poses(board: &BoardGeometry, n_views: usize, distance: f64) -> Vec<Pose> {
    let centre = Vector3::new(
        board.cols.saturating_sub(1) as f64 * board.spacing * 0.5,
        board.rows.saturating_sub(1) as f64 * board.spacing * 0.5,
        0.0,
    );
    (0..n_views)
        .map(|k| {
            let phase = k as f64 - (n_views as f64 - 1.0) * 0.5;
            let ax = 0.12 * phase;
            let ay = if k % 2 == 0 { 0.2 } else { -0.2 } + 0.03 * phase;
            let rvec = Vector3::new(ax, ay, 0.02 * phase);
            let rotation = Rotation3::new(rvec);
            let tvec = Vector3::new(0.0, 0.0, distance) - rotation * centre;
            Pose::new(rvec, tvec)
        })
        .collect()
}

/// Project the board through every pose and wrap the exact corners as samples.
pub fn project_samples(
    camera: &CameraModel,
    board: &BoardGeometry,
    poses: &[Pose],
) -> Result<Vec<Sample>, SyntheticError> {
    let object = board.object_points();
    poses
        .iter()
        .map(|pose| {
            let px = camera.project_points(pose, &object)?;
            let pts = px
                .iter()
                .map(|p| nalgebra::Point2::new(p.x as f32, p.y as f32))
                .collect();
            Ok(Sample::new(board, pts)?)
        })
        .collect()
}
