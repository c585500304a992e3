//! Closed-loop tracking controller
//!
//! One thread, one frame per cycle: segment, estimate the pixel error,
//! convert to angles, smooth, clamp and send. Operator commands are applied
//! between cycles. The loop owns the actuator link and always re-centres and
//! disconnects on the way out, including when it is dropped while running.

use crate::config::{TrackerConfig, MANUAL_STEP_MIN};
use crate::converter::AngleConverter;
use crate::error::ControlError;
use crate::operator::Operator;
use crate::smoother::{MotionSmoother, SmoothingState};
use crate::state::{LoopState, OperatorEvent};
use crate::status::LoopStatus;
use pantilt_cns::{ActuatorLink, Axis, CnsError, Transport};
use pantilt_eye::{
    ColorRange, DetectionResult, ErrorEstimator, Frame, FrameSegmenter, FrameSize, FrameSource,
};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, info, warn};

/// Why [`ControlLoop::run`] returned normally
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// The stop flag was raised
    Stopped,
    /// The operator asked to quit
    Quit,
    /// The frame source ran dry
    EndOfStream,
}

pub struct ControlLoop<T: Transport> {
    link: ActuatorLink<T>,
    segmenter: FrameSegmenter,
    estimator: ErrorEstimator,
    color_range: ColorRange,
    converter: AngleConverter,
    smoother: MotionSmoother,
    smoothing: SmoothingState,
    state: LoopState,
    manual_step: u32,
    default_manual_step: u32,
    manual_step_max: u32,
    cycles: u64,
    quit_requested: bool,
}

impl<T: Transport> ControlLoop<T> {
    /// Validate `config` and build a loop driving `transport`.
    pub fn new(transport: T, config: &TrackerConfig) -> Result<Self, ControlError> {
        let link = ActuatorLink::new(transport, &config.servo);
        Self::from_link(link, config)
    }

    /// Build around an existing link; the link's own limits are kept.
    pub fn from_link(link: ActuatorLink<T>, config: &TrackerConfig) -> Result<Self, ControlError> {
        config.validate()?;
        let smoother = MotionSmoother::new(config.control.smoothing_factor).map_err(ControlError::Config)?;

        Ok(Self {
            link,
            segmenter: FrameSegmenter::from_config(&config.vision),
            estimator: ErrorEstimator::new(config.vision.frame_size()),
            color_range: config.vision.color_range,
            converter: AngleConverter::new(config.control.gain),
            smoother,
            smoothing: SmoothingState::centered(),
            state: LoopState::Idle,
            manual_step: config.control.manual_step,
            default_manual_step: config.control.manual_step,
            manual_step_max: config.control.manual_step_max,
            cycles: 0,
            quit_requested: false,
        })
    }

    /// Connect, centre and enter Tracking.
    ///
    /// A link that cannot be opened is not fatal: the loop keeps detecting
    /// and reporting but sends nothing.
    pub fn start(&mut self) -> Result<(), ControlError> {
        if self.state.is_active() {
            debug!("Control loop already running");
            return Ok(());
        }

        match self.link.connect() {
            Ok(()) => {
                if let Err(e) = self.link.center() {
                    warn!("Failed to centre servos: {}", e);
                }
            }
            Err(e) => warn!("Servo link unavailable, running without actuation: {}", e),
        }

        self.smoothing = SmoothingState::centered();
        self.state = LoopState::Tracking;
        self.cycles = 0;
        self.quit_requested = false;
        info!(
            "Control loop started (servo {})",
            if self.link.is_connected() { "online" } else { "offline" }
        );
        Ok(())
    }

    /// Process one frame.
    ///
    /// A frame whose size differs from the configured resolution is an
    /// acquisition failure.
    pub fn step(&mut self, frame: &mut Frame) -> Result<DetectionResult, ControlError> {
        let expected = self.estimator.frame_size();
        let actual = FrameSize::of(frame);
        if actual != expected {
            return Err(ControlError::Acquisition(format!(
                "frame is {}x{}, expected {}x{}",
                actual.width, actual.height, expected.width, expected.height
            )));
        }

        self.cycles += 1;
        match self.state {
            LoopState::Tracking => Ok(self.track(frame)),
            _ => {
                self.estimator.lose();
                Ok(DetectionResult::NotFound)
            }
        }
    }

    fn track(&mut self, frame: &mut Frame) -> DetectionResult {
        let detection = self.segmenter.segment(frame, &self.color_range);
        let Some(error) = self.estimator.observe(&detection) else {
            return detection;
        };
        if !self.link.is_connected() {
            return detection;
        }

        let (pan, tilt) = self.link.angles();
        let target = self
            .converter
            .to_angle(error, self.estimator.frame_size(), pan, tilt);
        let (pan, tilt) = self.smoother.smooth(target, &self.smoothing);
        debug!(
            "error ({:.0}, {:.0}) -> target ({:.2}, {:.2}) -> smoothed ({:.2}, {:.2})",
            error.x, error.y, target.0, target.1, pan, tilt
        );

        self.command(Axis::Pan, pan);
        self.command(Axis::Tilt, tilt);
        detection
    }

    /// Send one axis and record the clamped angle as the smoothing baseline.
    fn command(&mut self, axis: Axis, angle: f64) {
        match self.link.set_angle(axis, angle) {
            Ok(sent) => match axis {
                Axis::Pan => self.smoothing.pan = sent,
                Axis::Tilt => self.smoothing.tilt = sent,
            },
            Err(CnsError::NotConnected) => debug!("Dropped {} command: link offline", axis),
            Err(e) => warn!("Dropped {} command: {}", axis, e),
        }
    }

    fn recenter(&mut self) {
        if self.link.is_connected() {
            if let Err(e) = self.link.center() {
                warn!("Failed to centre servos: {}", e);
            }
        }
        self.smoothing = SmoothingState::centered();
    }

    /// Apply one operator command.
    pub fn handle_event(&mut self, event: OperatorEvent) {
        if event == OperatorEvent::Quit {
            info!("Quit requested");
            self.quit_requested = true;
            return;
        }
        if !self.state.is_active() {
            debug!("Ignoring {:?} in state {:?}", event, self.state);
            return;
        }

        match event {
            OperatorEvent::TogglePause => {
                self.state = self.state.toggle_pause();
                self.forget_target_unless_tracking();
                info!("State: {}", self.state);
            }
            OperatorEvent::ToggleMode => {
                self.state = self.state.toggle_mode();
                self.forget_target_unless_tracking();
                let (pan, tilt) = self.link.angles();
                self.smoothing = SmoothingState::new(pan, tilt);
                info!("State: {}", self.state);
            }
            OperatorEvent::Calibrate => {
                info!("Calibrating");
                self.recenter();
            }
            OperatorEvent::Reset => {
                info!("Resetting");
                self.recenter();
                self.manual_step = self.default_manual_step;
            }
            OperatorEvent::SpeedUp => {
                self.manual_step = (self.manual_step + 1).min(self.manual_step_max);
                debug!("Manual step: {}", self.manual_step);
            }
            OperatorEvent::SpeedDown => {
                self.manual_step = self.manual_step.saturating_sub(1).max(MANUAL_STEP_MIN);
                debug!("Manual step: {}", self.manual_step);
            }
            OperatorEvent::MoveUp
            | OperatorEvent::MoveDown
            | OperatorEvent::MoveLeft
            | OperatorEvent::MoveRight => self.manual_move(event),
            OperatorEvent::Quit => {}
        }
    }

    /// Only Tracking looks at frames, so a detection is stale anywhere else.
    fn forget_target_unless_tracking(&mut self) {
        if self.state != LoopState::Tracking {
            self.estimator.lose();
        }
    }

    fn manual_move(&mut self, event: OperatorEvent) {
        if self.state != LoopState::Manual {
            return;
        }
        let Some((dx, dy)) = event.direction() else {
            return;
        };

        let step = f64::from(self.manual_step);
        let (pan, tilt) = self.link.angles();
        if dx != 0.0 {
            self.command(Axis::Pan, pan + dx * step);
        }
        if dy != 0.0 {
            self.command(Axis::Tilt, tilt + dy * step);
        }
    }

    /// Cycle until stopped, then clean up.
    ///
    /// Cleanup runs on every exit path. End of stream, quit and the stop flag
    /// are normal exits; a failing frame source is returned as
    /// [`ControlError::Acquisition`] after cleanup.
    pub fn run<S, O>(
        &mut self,
        source: &mut S,
        operator: &mut O,
        stop: &AtomicBool,
    ) -> Result<ExitReason, ControlError>
    where
        S: FrameSource + ?Sized,
        O: Operator + ?Sized,
    {
        if !self.state.is_active() {
            self.start()?;
        }

        let result = self.cycle_until_exit(source, operator, stop);
        let cleanup = self.shutdown();

        match result {
            Ok(reason) => {
                info!("Control loop exited: {:?} after {} cycles", reason, self.cycles);
                cleanup.map(|()| reason)
            }
            Err(e) => {
                if let Err(cleanup_err) = cleanup {
                    warn!("Cleanup after failure also failed: {}", cleanup_err);
                }
                Err(e)
            }
        }
    }

    fn cycle_until_exit<S, O>(
        &mut self,
        source: &mut S,
        operator: &mut O,
        stop: &AtomicBool,
    ) -> Result<ExitReason, ControlError>
    where
        S: FrameSource + ?Sized,
        O: Operator + ?Sized,
    {
        loop {
            if stop.load(Ordering::SeqCst) {
                return Ok(ExitReason::Stopped);
            }

            let mut frame = match source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => return Ok(ExitReason::EndOfStream),
                Err(e) => {
                    error!("Frame acquisition failed: {}", e);
                    return Err(ControlError::Acquisition(e.to_string()));
                }
            };

            if let Err(e) = self.step(&mut frame) {
                error!("{}", e);
                return Err(e);
            }

            let status = self.status();
            if let Some(event) = operator.present(&frame, &status) {
                self.handle_event(event);
            }
            if self.quit_requested {
                return Ok(ExitReason::Quit);
            }
        }
    }

    /// Centre, disconnect and return to Idle. No-op when not running.
    pub fn shutdown(&mut self) -> Result<(), ControlError> {
        if !self.state.is_active() {
            return Ok(());
        }

        self.state = LoopState::ShuttingDown;
        info!("Shutting down control loop");
        if self.link.is_connected() {
            if let Err(e) = self.link.center() {
                warn!("Failed to centre servos during shutdown: {}", e);
            }
        }
        let disconnected = self.link.disconnect();
        self.state = LoopState::Idle;
        disconnected?;
        Ok(())
    }

    pub fn status(&self) -> LoopStatus {
        let target = self.estimator.status();
        let (pan, tilt) = self.link.angles();
        LoopStatus {
            state: self.state,
            object_found: target.found,
            object_location: target.last_location,
            pan,
            tilt,
            connected: self.link.is_connected(),
            manual_step: self.manual_step,
            cycles: self.cycles,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn smoothing(&self) -> SmoothingState {
        self.smoothing
    }

    pub fn manual_step(&self) -> u32 {
        self.manual_step
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn link(&self) -> &ActuatorLink<T> {
        &self.link
    }
}

impl<T: Transport> Drop for ControlLoop<T> {
    fn drop(&mut self) {
        if self.state.is_active() {
            if let Err(e) = self.shutdown() {
                warn!("Shutdown on drop failed: {}", e);
            }
        }
    }
}
