//! Accepted board observations and the append-only store that holds them.

use crate::BoardGeometry;
use nalgebra::Point2;

/// One accepted board observation.
///
/// Image points are ordered like [`BoardGeometry::object_points`], which
/// pairs them implicitly with the board template.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    image_points: Vec<Point2<f32>>,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SampleError {
    #[error("sample has {got} image points, board has {expected} corners")]
    CornerCountMismatch { expected: usize, got: usize },
}

impl Sample {
    /// Build a sample for `board` from detected corners.
    pub fn new(board: &BoardGeometry, image_points: Vec<Point2<f32>>) -> Result<Self, SampleError> {
        let expected = board.corner_count();
        if image_points.len() != expected {
            return Err(SampleError::CornerCountMismatch {
                expected,
                got: image_points.len(),
            });
        }
        Ok(Self { image_points })
    }

    #[inline]
    pub fn image_points(&self) -> &[Point2<f32>] {
        &self.image_points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.image_points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.image_points.is_empty()
    }
}

/// Samples collected during one session, in acceptance order.
///
/// There is no removal: the store only grows until the session ends.
#[derive(Clone, Debug)]
pub struct SampleStore {
    board: BoardGeometry,
    samples: Vec<Sample>,
}

impl SampleStore {
    pub fn new(board: BoardGeometry) -> Self {
        Self {
            board,
            samples: Vec::new(),
        }
    }

    #[inline]
    pub fn board(&self) -> &BoardGeometry {
        &self.board
    }

    /// Append a sample and return the new count.
    ///
    /// Samples built for this store's board are always accepted; a sample
    /// built for a board with a different corner count is refused.
    pub fn append(&mut self, sample: Sample) -> Result<usize, SampleError> {
        let expected = self.board.corner_count();
        if sample.len() != expected {
            return Err(SampleError::CornerCountMismatch {
                expected,
                got: sample.len(),
            });
        }
        self.samples.push(sample);
        Ok(self.samples.len())
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[inline]
    pub fn all(&self) -> &[Sample] {
        &self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> BoardGeometry {
        BoardGeometry::new(3, 2, 1.0).expect("board")
    }

    fn sample_with_offset(board: &BoardGeometry, offset: f32) -> Sample {
        let pts = (0..board.corner_count())
            .map(|k| Point2::new(k as f32 + offset, offset))
            .collect();
        Sample::new(board, pts).expect("well-formed")
    }

    #[test]
    fn count_tracks_appends_in_order() {
        let board = board();
        let mut store = SampleStore::new(board);
        assert!(store.is_empty());

        for n in 0..7 {
            let count = store
                .append(sample_with_offset(&board, n as f32))
                .expect("append");
            assert_eq!(count, n + 1);
        }
        assert_eq!(store.count(), 7);
        for (n, s) in store.all().iter().enumerate() {
            assert_eq!(s.image_points()[0], Point2::new(n as f32, n as f32));
        }
    }

    #[test]
    fn sample_rejects_wrong_point_count() {
        let err = Sample::new(&board(), vec![Point2::new(0.0, 0.0); 5]).unwrap_err();
        assert_eq!(
            err,
            SampleError::CornerCountMismatch {
                expected: 6,
                got: 5
            }
        );
    }

    #[test]
    fn store_refuses_sample_from_other_board() {
        let other = BoardGeometry::new(4, 4, 1.0).expect("board");
        let mut store = SampleStore::new(board());
        let err = store.append(sample_with_offset(&other, 0.0)).unwrap_err();
        assert!(matches!(err, SampleError::CornerCountMismatch { .. }));
        assert_eq!(store.count(), 0);
    }
}
