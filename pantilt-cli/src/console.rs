// Operator console: keyboard mapping and the preview window

use pantilt_loop::OperatorEvent;

/// Arrow key codes reported by the preview window (low byte).
pub const KEY_UP: i32 = 82;
pub const KEY_DOWN: i32 = 84;
pub const KEY_LEFT: i32 = 81;
pub const KEY_RIGHT: i32 = 83;

/// Map a key code from the preview window to an operator command.
///
/// Only the low byte is significant. Upper-case `S` shares its code with
/// the right arrow, so it moves right rather than down.
pub fn event_for_key(key: i32) -> Option<OperatorEvent> {
    if key < 0 {
        return None;
    }
    let key = key & 0xFF;

    let event = match key {
        KEY_UP => OperatorEvent::MoveUp,
        KEY_DOWN => OperatorEvent::MoveDown,
        KEY_LEFT => OperatorEvent::MoveLeft,
        KEY_RIGHT => OperatorEvent::MoveRight,
        _ => match u8::try_from(key).map(char::from).ok()? {
            'q' => OperatorEvent::Quit,
            ' ' => OperatorEvent::TogglePause,
            'c' => OperatorEvent::Calibrate,
            'r' => OperatorEvent::Reset,
            'm' => OperatorEvent::ToggleMode,
            '+' | '=' => OperatorEvent::SpeedUp,
            '-' | '_' => OperatorEvent::SpeedDown,
            'w' | 'W' => OperatorEvent::MoveUp,
            's' => OperatorEvent::MoveDown,
            'a' | 'A' => OperatorEvent::MoveLeft,
            'd' | 'D' => OperatorEvent::MoveRight,
            _ => return None,
        },
    };
    Some(event)
}

pub const HELP: &str = "\
q quit | space pause | m tracking/manual | c calibrate | r reset
w/a/s/d or arrows move (manual) | +/- manual step";

#[cfg(feature = "camera")]
pub use self::window::WindowOperator;

#[cfg(feature = "camera")]
mod window {
    use super::event_for_key;
    use opencv::{
        core::{Point, Scalar},
        highgui, imgproc,
    };
    use pantilt_eye::camera::frame_to_bgr_mat;
    use pantilt_eye::Frame;
    use pantilt_loop::{LoopStatus, Operator, OperatorEvent};
    use tracing::warn;

    /// Preview window with a status line; keys become operator commands
    pub struct WindowOperator {
        title: String,
    }

    impl WindowOperator {
        pub fn new(title: &str) -> anyhow::Result<Self> {
            highgui::named_window(title, highgui::WINDOW_AUTOSIZE)?;
            Ok(Self {
                title: title.to_string(),
            })
        }
    }

    impl Operator for WindowOperator {
        fn present(&mut self, frame: &Frame, status: &LoopStatus) -> Option<OperatorEvent> {
            let mut mat = match frame_to_bgr_mat(frame) {
                Ok(mat) => mat,
                Err(e) => {
                    warn!("Cannot display frame: {}", e);
                    return None;
                }
            };

            let color = if status.object_found {
                Scalar::new(0.0, 255.0, 0.0, 0.0)
            } else {
                Scalar::new(0.0, 0.0, 255.0, 0.0)
            };
            if let Err(e) = imgproc::put_text(
                &mut mat,
                &status.to_string(),
                Point::new(10, 25),
                imgproc::FONT_HERSHEY_SIMPLEX,
                0.5,
                color,
                1,
                imgproc::LINE_8,
                false,
            ) {
                warn!("Failed to draw status: {}", e);
            }

            if let Err(e) = highgui::imshow(&self.title, &mat) {
                warn!("Failed to show frame: {}", e);
                return None;
            }
            event_for_key(highgui::wait_key(1).unwrap_or(-1))
        }
    }

    impl Drop for WindowOperator {
        fn drop(&mut self) {
            let _ = highgui::destroy_window(&self.title);
        }
    }
}
