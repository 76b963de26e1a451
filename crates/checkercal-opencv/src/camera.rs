use crate::convert::message;
use crate::CvFrame;
use checkercal_session::{CaptureError, CaptureSettings, FrameSource};
use log::{debug, info, warn};
use opencv::core::Mat;
use opencv::prelude::*;
use opencv::videoio::{self, VideoCapture};

/// Live camera opened through `videoio`.
pub struct CvCamera {
    capture: VideoCapture,
    device: i32,
    released: bool,
}

impl CvCamera {
    /// Open `settings.device` and request resolution and frame rate.
    ///
    /// Requests the driver refuses are logged and skipped; frames report their
    /// actual size.
    pub fn open(settings: &CaptureSettings) -> Result<Self, CaptureError> {
        let device = settings.device;
        let mut capture = VideoCapture::new(device, videoio::CAP_ANY)
            .map_err(|err| CaptureError::Backend(message(err)))?;
        let opened = capture
            .is_opened()
            .map_err(|err| CaptureError::Backend(message(err)))?;
        if !opened {
            return Err(CaptureError::DeviceUnavailable { device });
        }

        let requests = [
            ("width", videoio::CAP_PROP_FRAME_WIDTH, settings.width as f64),
            ("height", videoio::CAP_PROP_FRAME_HEIGHT, settings.height as f64),
            ("fps", videoio::CAP_PROP_FPS, settings.fps),
        ];
        for (name, prop, value) in requests {
            match capture.set(prop, value) {
                Ok(true) => debug!("camera {device}: {name} = {value}"),
                Ok(false) => warn!("camera {device} ignored requested {name} = {value}"),
                Err(err) => warn!("camera {device}: setting {name} failed: {err}"),
            }
        }

        info!("camera {device} opened");
        Ok(Self {
            capture,
            device,
            released: false,
        })
    }
}

impl FrameSource for CvCamera {
    type Frame = CvFrame;

    fn next_frame(&mut self) -> Option<CvFrame> {
        if self.released {
            return None;
        }
        let mut bgr = Mat::default();
        match self.capture.read(&mut bgr) {
            Ok(true) if bgr.cols() > 0 => {}
            Ok(_) => {
                warn!("camera {} returned no frame", self.device);
                return None;
            }
            Err(err) => {
                warn!("camera {} read failed: {err}", self.device);
                return None;
            }
        }
        match CvFrame::from_bgr(bgr) {
            Ok(frame) => Some(frame),
            Err(err) => {
                warn!("grayscale conversion failed: {err}");
                None
            }
        }
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        match self.capture.release() {
            Ok(()) => debug!("camera {} released", self.device),
            Err(err) => warn!("camera {} release failed: {err}", self.device),
        }
    }
}

impl Drop for CvCamera {
    fn drop(&mut self) {
        FrameSource::release(self);
    }
}
