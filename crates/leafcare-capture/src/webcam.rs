//! Real camera backend built on `nokhwa`, enabled by the `webcam` feature.

use leafcare_core::RgbFrame;
use nokhwa::Camera;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};
use tracing::warn;

use crate::{CameraBackend, CaptureError};

/// Native camera device addressed by index.
pub struct NokhwaCamera {
    index: u32,
    camera: Option<Camera>,
}

impl NokhwaCamera {
    /// Creates a backend for the device at `index`. The device is not opened
    /// until the first start request.
    pub fn new(index: u32) -> Self {
        Self {
            index,
            camera: None,
        }
    }
}

impl CameraBackend for NokhwaCamera {
    fn open_stream(&mut self) -> Result<(), CaptureError> {
        let requested =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestResolution);
        let mut camera = Camera::new(CameraIndex::Index(self.index), requested)
            .map_err(|error| CaptureError::CameraUnavailable(error.to_string()))?;
        camera
            .open_stream()
            .map_err(|error| CaptureError::CameraUnavailable(error.to_string()))?;
        self.camera = Some(camera);
        Ok(())
    }

    fn read_frame(&mut self) -> Result<RgbFrame, CaptureError> {
        let camera = self.camera.as_mut().ok_or(CaptureError::CameraInactive)?;
        let buffer = camera
            .frame()
            .map_err(|error| CaptureError::Backend(format!("frame read failed: {error}")))?;
        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|error| CaptureError::Backend(format!("frame decode failed: {error}")))?;
        let (width, height) = (decoded.width(), decoded.height());
        RgbFrame::new(width, height, decoded.into_raw()).map_err(CaptureError::Frame)
    }

    fn close_stream(&mut self) {
        if let Some(mut camera) = self.camera.take()
            && let Err(error) = camera.stop_stream()
        {
            warn!(index = self.index, %error, "camera stream did not stop cleanly");
        }
    }

    fn describe(&self) -> String {
        format!("camera #{}", self.index)
    }
}
