use crate::convert::{message, pattern_size, to_cv_points};
use crate::CvFrame;
use checkercal_session::{CaptureOverlay, Display, DisplayError, KeySource};
use log::{debug, warn};
use opencv::core::{Point, Scalar};
use opencv::prelude::*;
use opencv::{calib3d, highgui, imgproc};
use std::time::Duration;

const LINE_HEIGHT: i32 = 24;

fn backend(err: opencv::Error) -> DisplayError {
    DisplayError::Backend(message(err))
}

/// `highgui` windows: one for capture, one for the undistorted preview.
pub struct HighGuiWindow {
    capture_title: String,
    preview_title: String,
    previewing: bool,
    closed: bool,
}

impl HighGuiWindow {
    pub fn new(title: &str) -> Result<Self, DisplayError> {
        highgui::named_window(title, highgui::WINDOW_AUTOSIZE).map_err(backend)?;
        Ok(Self {
            capture_title: title.to_string(),
            preview_title: format!("{title} (undistorted)"),
            previewing: false,
            closed: false,
        })
    }
}

impl Display<CvFrame> for HighGuiWindow {
    fn show_capture(
        &mut self,
        frame: &CvFrame,
        overlay: &CaptureOverlay<'_>,
    ) -> Result<(), DisplayError> {
        let mut canvas = frame.bgr().try_clone().map_err(backend)?;
        if let Some(corners) = overlay.corners {
            calib3d::draw_chessboard_corners(
                &mut canvas,
                pattern_size(overlay.board),
                &to_cv_points(corners),
                true,
            )
            .map_err(backend)?;
        }
        for (i, line) in overlay.lines.iter().enumerate() {
            imgproc::put_text_def(
                &mut canvas,
                line,
                Point::new(10, LINE_HEIGHT * (i as i32 + 1)),
                imgproc::FONT_HERSHEY_SIMPLEX,
                0.6,
                Scalar::new(0.0, 255.0, 0.0, 0.0),
            )
            .map_err(backend)?;
        }
        highgui::imshow(&self.capture_title, &canvas).map_err(backend)
    }

    fn show_preview(&mut self, frame: &CvFrame) -> Result<(), DisplayError> {
        if !self.previewing {
            self.previewing = true;
            if let Err(err) = highgui::destroy_window(&self.capture_title) {
                debug!("capture window already gone: {err}");
            }
            highgui::named_window(&self.preview_title, highgui::WINDOW_AUTOSIZE)
                .map_err(backend)?;
        }
        highgui::imshow(&self.preview_title, frame.bgr()).map_err(backend)
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(err) = highgui::destroy_all_windows() {
            warn!("closing windows failed: {err}");
        }
    }
}

impl Drop for HighGuiWindow {
    fn drop(&mut self) {
        Display::<CvFrame>::close(self);
    }
}

/// Keyboard input through `highgui::wait_key`, which also pumps window events.
#[derive(Clone, Debug, Default)]
pub struct HighGuiKeys;

impl KeySource for HighGuiKeys {
    fn poll_key(&mut self, timeout: Duration) -> Option<char> {
        // 0 would block until a key arrives.
        let delay = timeout.as_millis().clamp(1, i32::MAX as u128) as i32;
        match highgui::wait_key(delay) {
            Ok(key) if key >= 0 => char::from_u32((key & 0xff) as u32),
            Ok(_) => None,
            Err(err) => {
                warn!("key poll failed: {err}");
                None
            }
        }
    }
}
