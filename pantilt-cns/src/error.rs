//! Error types for pantilt-cns

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CnsError {
    #[error("Actuator link is not connected")]
    NotConnected,

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid angle: {0}")]
    InvalidAngle(f64),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<std::io::Error> for CnsError {
    fn from(err: std::io::Error) -> Self {
        CnsError::Transport(err.to_string())
    }
}

#[cfg(feature = "serial-transport")]
impl From<serialport::Error> for CnsError {
    fn from(err: serialport::Error) -> Self {
        CnsError::Connection(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(CnsError::NotConnected.to_string(), "Actuator link is not connected");
        assert!(CnsError::InvalidAngle(f64::NAN).to_string().contains("NaN"));
        assert!(CnsError::Connection("COM3".to_string()).to_string().contains("COM3"));
    }

    #[test]
    fn test_io_error_maps_to_transport() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe");
        assert!(matches!(CnsError::from(io_err), CnsError::Transport(_)));
    }
}
