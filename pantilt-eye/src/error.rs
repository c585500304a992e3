//! Error types for pantilt-eye

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VisionError {
    #[error("Camera error: {0}")]
    Camera(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid colour range: {0}")]
    InvalidColorRange(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("OpenCV error: {0}")]
    OpenCv(String),
}

#[cfg(feature = "opencv")]
impl From<opencv::Error> for VisionError {
    fn from(err: opencv::Error) -> Self {
        VisionError::OpenCv(err.message)
    }
}
