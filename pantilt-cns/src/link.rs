//! Actuator link: the only path from an angle to the wire

use crate::config::ServoConfig;
use crate::error::CnsError;
use crate::protocol::{Axis, WireCommand};
use crate::safety::ActuatorLimiter;
use crate::transport::{Transport, TransportConfig};
use serde::{Deserialize, Serialize};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Neutral position for both axes.
pub const CENTER_ANGLE: f64 = 90.0;

/// Pause between interpolation steps of [`ActuatorLink::smooth_move`].
pub const MOVE_STEP_DELAY: Duration = Duration::from_millis(50);

/// Dwell at each position of [`ActuatorLink::self_test`].
pub const SELF_TEST_DWELL: Duration = Duration::from_millis(500);

/// Sweep visited by the self-test on each axis.
pub const SELF_TEST_SWEEP: [f64; 4] = [90.0, 120.0, 60.0, 90.0];

/// Last known rig position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActuatorState {
    pub pan: f64,
    pub tilt: f64,
    pub connected: bool,
}

impl Default for ActuatorState {
    fn default() -> Self {
        Self {
            pan: CENTER_ANGLE,
            tilt: CENTER_ANGLE,
            connected: false,
        }
    }
}

impl ActuatorState {
    pub fn angle(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Pan => self.pan,
            Axis::Tilt => self.tilt,
        }
    }

    fn set(&mut self, axis: Axis, angle: f64) {
        match axis {
            Axis::Pan => self.pan = angle,
            Axis::Tilt => self.tilt = angle,
        }
    }
}

/// Serial link to the two-axis servo controller
pub struct ActuatorLink<T: Transport> {
    transport: T,
    transport_config: TransportConfig,
    limiter: ActuatorLimiter,
    state: ActuatorState,
    settle_delay: Duration,
    move_step_delay: Duration,
    self_test_dwell: Duration,
}

impl<T: Transport> ActuatorLink<T> {
    pub fn new(transport: T, config: &ServoConfig) -> Self {
        let transport_config = config.transport(transport.transport_type());
        Self {
            transport,
            transport_config,
            limiter: ActuatorLimiter::new(config.limits),
            state: ActuatorState::default(),
            settle_delay: config.settle_delay(),
            move_step_delay: MOVE_STEP_DELAY,
            self_test_dwell: SELF_TEST_DWELL,
        }
    }

    /// Drop every timed pause (settle, interpolation, self-test dwell).
    pub fn without_delays(mut self) -> Self {
        self.settle_delay = Duration::ZERO;
        self.move_step_delay = Duration::ZERO;
        self.self_test_dwell = Duration::ZERO;
        self
    }

    /// Open the transport and wait for the controller to settle.
    pub fn connect(&mut self) -> Result<(), CnsError> {
        if self.state.connected {
            return Ok(());
        }

        self.transport.connect(&self.transport_config)?;
        info!(
            "Connected to servo controller on {} ({:?})",
            self.transport_config.port,
            self.transport.transport_type()
        );

        self.settle();
        self.state.connected = true;
        Ok(())
    }

    fn settle(&self) {
        if !self.settle_delay.is_zero() {
            debug!("Settling for {:?}", self.settle_delay);
            thread::sleep(self.settle_delay);
        }
    }

    /// Close the transport. Closing a closed link is a no-op.
    pub fn disconnect(&mut self) -> Result<(), CnsError> {
        if !self.state.connected {
            return Ok(());
        }
        self.state.connected = false;
        self.transport.disconnect()?;
        info!("Disconnected from servo controller");
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.state.connected
    }

    /// Clamp, encode and send; returns the angle actually commanded.
    ///
    /// State is only updated once the command has been written.
    pub fn set_angle(&mut self, axis: Axis, angle: f64) -> Result<f64, CnsError> {
        if !self.state.connected {
            return Err(CnsError::NotConnected);
        }
        if !angle.is_finite() {
            warn!("Rejected non-finite {} angle", axis);
            return Err(CnsError::InvalidAngle(angle));
        }

        let clamped = self.limiter.limit(axis, angle);
        let command = WireCommand::from_angle(axis, clamped);
        self.transport.send(&command.encode())?;
        self.state.set(axis, clamped);

        debug!("{} -> {:.1} (requested {:.1})", axis, clamped, angle);
        Ok(clamped)
    }

    pub fn pan(&mut self, angle: f64) -> Result<f64, CnsError> {
        self.set_angle(Axis::Pan, angle)
    }

    pub fn tilt(&mut self, angle: f64) -> Result<f64, CnsError> {
        self.set_angle(Axis::Tilt, angle)
    }

    /// Both axes to 90 degrees, pan first.
    pub fn center(&mut self) -> Result<(), CnsError> {
        self.pan(CENTER_ANGLE)?;
        self.tilt(CENTER_ANGLE)?;
        Ok(())
    }

    /// Move linearly from the current position in `steps` increments.
    pub fn smooth_move(&mut self, pan: f64, tilt: f64, steps: u32) -> Result<(), CnsError> {
        if !self.state.connected {
            return Err(CnsError::NotConnected);
        }
        let steps = steps.max(1);
        let (pan_start, tilt_start) = (self.state.pan, self.state.tilt);

        for i in 0..=steps {
            let ratio = f64::from(i) / f64::from(steps);
            self.pan(pan_start + (pan - pan_start) * ratio)?;
            self.tilt(tilt_start + (tilt - tilt_start) * ratio)?;
            self.pause(self.move_step_delay);
        }
        Ok(())
    }

    /// Sweep each axis through [`SELF_TEST_SWEEP`].
    pub fn self_test(&mut self) -> Result<(), CnsError> {
        if !self.state.connected {
            return Err(CnsError::NotConnected);
        }
        info!("Running servo self-test");
        for axis in Axis::ALL {
            for angle in SELF_TEST_SWEEP {
                self.set_angle(axis, angle)?;
                self.pause(self.self_test_dwell);
            }
        }
        info!("Servo self-test complete");
        Ok(())
    }

    fn pause(&self, duration: Duration) {
        if !duration.is_zero() {
            thread::sleep(duration);
        }
    }

    pub fn state(&self) -> ActuatorState {
        self.state
    }

    /// Current (pan, tilt).
    pub fn angles(&self) -> (f64, f64) {
        (self.state.pan, self.state.tilt)
    }

    pub fn limiter(&self) -> &ActuatorLimiter {
        &self.limiter
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}
