use checkercal_core::ImageSize;
use checkercal_session::Frame;
use opencv::core::Mat;
use opencv::imgproc;
use opencv::prelude::*;

/// A BGR camera frame, with its grayscale plane when it came from the camera.
///
/// Undistorted preview frames are display-only and carry no grayscale plane.
pub struct CvFrame {
    bgr: Mat,
    gray: Option<Mat>,
}

impl CvFrame {
    pub fn from_bgr(bgr: Mat) -> opencv::Result<Self> {
        let mut gray = Mat::default();
        imgproc::cvt_color_def(&bgr, &mut gray, imgproc::COLOR_BGR2GRAY)?;
        Ok(Self {
            bgr,
            gray: Some(gray),
        })
    }

    pub fn display_only(bgr: Mat) -> Self {
        Self { bgr, gray: None }
    }

    #[inline]
    pub fn bgr(&self) -> &Mat {
        &self.bgr
    }

    #[inline]
    pub fn gray(&self) -> Option<&Mat> {
        self.gray.as_ref()
    }
}

impl Frame for CvFrame {
    fn size(&self) -> ImageSize {
        ImageSize::new(self.bgr.cols().max(0) as u32, self.bgr.rows().max(0) as u32)
    }
}
