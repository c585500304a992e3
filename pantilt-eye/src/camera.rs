//! Frame acquisition
//!
//! The control loop pulls frames through [`FrameSource`]. `Ok(None)` marks
//! the end of the stream; an `Err` is an acquisition failure.

use crate::error::VisionError;
use crate::frame::Frame;
use image::imageops::{self, FilterType};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Pull-style frame supplier
pub trait FrameSource {
    /// Next frame, or `None` at end of stream.
    fn next_frame(&mut self) -> Result<Option<Frame>, VisionError>;
}

enum Pending {
    Loaded(Frame),
    File(PathBuf),
}

/// Finite sequence of frames, in memory or replayed from image files
pub struct FrameSequence {
    pending: VecDeque<Pending>,
    resolution: Option<(u32, u32)>,
}

impl FrameSequence {
    pub fn from_frames(frames: impl IntoIterator<Item = Frame>) -> Self {
        Self {
            pending: frames.into_iter().map(Pending::Loaded).collect(),
            resolution: None,
        }
    }

    /// Replay every PNG/JPEG in `dir`, ordered by file name.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, VisionError> {
        let dir = dir.as_ref();
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let is_image = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| matches!(e.to_ascii_lowercase().as_str(), "png" | "jpg" | "jpeg"))
                .unwrap_or(false);
            if path.is_file() && is_image {
                files.push(path);
            }
        }
        files.sort();

        if files.is_empty() {
            return Err(VisionError::Camera(format!(
                "No PNG or JPEG frames in {}",
                dir.display()
            )));
        }
        info!("Replaying {} frames from {}", files.len(), dir.display());

        Ok(Self {
            pending: files.into_iter().map(Pending::File).collect(),
            resolution: None,
        })
    }

    /// Resize frames that do not already match `(width, height)`.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.resolution = Some((width, height));
        self
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl FrameSource for FrameSequence {
    fn next_frame(&mut self) -> Result<Option<Frame>, VisionError> {
        let frame = match self.pending.pop_front() {
            None => return Ok(None),
            Some(Pending::Loaded(frame)) => frame,
            Some(Pending::File(path)) => {
                debug!("Loading frame {}", path.display());
                image::open(&path)?.to_rgb8()
            }
        };

        match self.resolution {
            Some((w, h)) if frame.dimensions() != (w, h) => {
                Ok(Some(imageops::resize(&frame, w, h, FilterType::Triangle)))
            }
            _ => Ok(Some(frame)),
        }
    }
}

#[cfg(feature = "opencv")]
pub use self::opencv_camera::{frame_to_bgr_mat, OpenCvCamera};

#[cfg(feature = "opencv")]
mod opencv_camera {
    use super::FrameSource;
    use crate::config::VisionConfig;
    use crate::error::VisionError;
    use crate::frame::Frame;
    use opencv::{
        core::{Mat, Scalar, Size, CV_8UC3},
        imgproc,
        prelude::*,
        videoio::{VideoCapture, CAP_ANY, CAP_PROP_FPS, CAP_PROP_FRAME_HEIGHT, CAP_PROP_FRAME_WIDTH},
    };
    use tracing::info;

    /// USB webcam frame source
    pub struct OpenCvCamera {
        capture: Option<VideoCapture>,
        camera_id: u32,
        resolution: (u32, u32),
    }

    impl OpenCvCamera {
        /// Open the camera and request the configured resolution and rate.
        pub fn open(config: &VisionConfig) -> Result<Self, VisionError> {
            let mut capture = VideoCapture::new(config.camera_id as i32, CAP_ANY)
                .map_err(|e| VisionError::Camera(format!("Failed to open camera {}: {}", config.camera_id, e)))?;

            if !capture.is_opened()
                .map_err(|e| VisionError::Camera(format!("Camera {} not opened: {}", config.camera_id, e)))? {
                return Err(VisionError::Camera(format!("Camera {} failed to open", config.camera_id)));
            }

            capture.set(CAP_PROP_FRAME_WIDTH, config.resolution.0 as f64)
                .map_err(|e| VisionError::Camera(format!("Failed to set width: {}", e)))?;
            capture.set(CAP_PROP_FRAME_HEIGHT, config.resolution.1 as f64)
                .map_err(|e| VisionError::Camera(format!("Failed to set height: {}", e)))?;
            capture.set(CAP_PROP_FPS, config.frame_rate as f64)
                .map_err(|e| VisionError::Camera(format!("Failed to set FPS: {}", e)))?;

            info!("Camera {} initialized at {}x{} @ {}fps",
                config.camera_id,
                config.resolution.0,
                config.resolution.1,
                config.frame_rate);

            Ok(Self {
                capture: Some(capture),
                camera_id: config.camera_id,
                resolution: config.resolution,
            })
        }

        /// Release the device.
        pub fn stop(&mut self) {
            if self.capture.take().is_some() {
                info!("Camera {} stopped", self.camera_id);
            }
        }
    }

    impl FrameSource for OpenCvCamera {
        fn next_frame(&mut self) -> Result<Option<Frame>, VisionError> {
            let capture = self.capture.as_mut()
                .ok_or_else(|| VisionError::Camera("Camera not initialized".to_string()))?;

            let mut raw = Mat::default();
            let ok = capture.read(&mut raw)
                .map_err(|e| VisionError::Camera(format!("Failed to read frame: {}", e)))?;
            if !ok || raw.empty() {
                return Err(VisionError::Camera(format!("Camera {} returned no frame", self.camera_id)));
            }

            let (w, h) = self.resolution;
            let mut resized = Mat::default();
            imgproc::resize(&raw, &mut resized, Size::new(w as i32, h as i32), 0.0, 0.0, imgproc::INTER_LINEAR)?;
            let mut rgb = Mat::default();
            imgproc::cvt_color(&resized, &mut rgb, imgproc::COLOR_BGR2RGB, 0)?;

            let bytes = rgb.data_bytes()?.to_vec();
            Frame::from_raw(w, h, bytes)
                .map(Some)
                .ok_or_else(|| VisionError::Processing("Frame buffer size mismatch".to_string()))
        }
    }

    impl Drop for OpenCvCamera {
        fn drop(&mut self) {
            self.stop();
        }
    }

    /// Copy an RGB frame into a BGR `Mat` for display.
    pub fn frame_to_bgr_mat(frame: &Frame) -> Result<Mat, VisionError> {
        let mut rgb = Mat::new_rows_cols_with_default(
            frame.height() as i32,
            frame.width() as i32,
            CV_8UC3,
            Scalar::all(0.0),
        )?;
        rgb.data_bytes_mut()?.copy_from_slice(frame.as_raw());
        let mut bgr = Mat::default();
        imgproc::cvt_color(&rgb, &mut bgr, imgproc::COLOR_RGB2BGR, 0)?;
        Ok(bgr)
    }
}
