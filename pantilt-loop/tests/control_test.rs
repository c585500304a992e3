//! End-to-end tests for the control loop

use image::Rgb;
use pantilt_cns::{MemoryTransport, Transport};
use pantilt_eye::{Frame, FrameSequence, FrameSource, VisionError};
use pantilt_loop::{
    ControlError, ControlLoop, ExitReason, HeadlessOperator, LoopState, OperatorEvent,
    ScriptedOperator, SmoothingState, TrackerConfig,
};
use std::sync::atomic::AtomicBool;

const W: u32 = 80;
const H: u32 = 60;

fn config() -> TrackerConfig {
    let mut config = TrackerConfig::default();
    config.vision.resolution = (W, H);
    config.vision.min_area = 30;
    config.servo.settle_delay_ms = 0;
    config
}

fn frame_with_target(cx: u32, cy: u32) -> Frame {
    let mut frame = Frame::from_pixel(W, H, Rgb([20, 20, 20]));
    for y in cy - 5..=cy + 5 {
        for x in cx - 5..=cx + 5 {
            frame.put_pixel(x, y, Rgb([230, 10, 10]));
        }
    }
    frame
}

fn frames(frame: Frame, count: usize) -> FrameSequence {
    FrameSequence::from_frames(std::iter::repeat(frame).take(count))
}

struct FailingSource {
    good_frames: usize,
}

impl FrameSource for FailingSource {
    fn next_frame(&mut self) -> Result<Option<Frame>, VisionError> {
        if self.good_frames == 0 {
            return Err(VisionError::Camera("device unplugged".to_string()));
        }
        self.good_frames -= 1;
        Ok(Some(frame_with_target(60, 30)))
    }
}

#[test]
fn test_degraded_mode_without_servo() {
    let transport = MemoryTransport::refusing();
    let probe = transport.clone();
    let mut control = ControlLoop::new(transport, &config()).unwrap();
    let mut operator = ScriptedOperator::new();
    let stop = AtomicBool::new(false);

    let reason = control
        .run(&mut frames(frame_with_target(60, 20), 3), &mut operator, &stop)
        .unwrap();

    assert_eq!(reason, ExitReason::EndOfStream);
    assert_eq!(operator.seen().len(), 3);
    assert!(operator.seen().iter().all(|s| s.object_found && !s.connected));
    assert_eq!(operator.seen()[0].object_location, Some((60, 20)));
    assert!(probe.written().is_empty());
    assert_eq!(control.state(), LoopState::Idle);
}

#[test]
fn test_centred_target_does_not_move() {
    let transport = MemoryTransport::new();
    let probe = transport.clone();
    let mut control = ControlLoop::new(transport, &config()).unwrap();
    control.start().unwrap();
    probe.clear();

    let detection = control.step(&mut frame_with_target(W / 2, H / 2)).unwrap();
    assert_eq!(detection.centroid(), Some((W / 2, H / 2)));
    assert_eq!(control.link().angles(), (90.0, 90.0));
    assert_eq!(control.smoothing(), SmoothingState::centered());
    assert_eq!(probe.lines(), vec!["#190\n", "#290\n"]);
}

#[test]
fn test_mode_round_trip_keeps_position() {
    let transport = MemoryTransport::new();
    let mut control = ControlLoop::new(transport, &config()).unwrap();
    control.start().unwrap();

    for _ in 0..3 {
        control.step(&mut frame_with_target(65, 15)).unwrap();
    }
    let before = control.link().angles();
    assert!(before.0 > 90.0);
    assert!(before.1 > 90.0);

    control.handle_event(OperatorEvent::ToggleMode);
    assert_eq!(control.state(), LoopState::Manual);
    control.handle_event(OperatorEvent::ToggleMode);
    assert_eq!(control.state(), LoopState::Tracking);

    assert_eq!(control.link().angles(), before);
    assert_eq!(control.smoothing(), SmoothingState::new(before.0, before.1));
}

#[test]
fn test_persistent_offset_saturates_at_axis_limit() {
    let transport = MemoryTransport::new();
    let mut control = ControlLoop::new(transport, &config()).unwrap();
    control.start().unwrap();

    for _ in 0..200 {
        control.step(&mut frame_with_target(74, 54)).unwrap();
        let (pan, tilt) = control.link().angles();
        assert!((30.0..=150.0).contains(&pan));
        assert!((60.0..=150.0).contains(&tilt));
    }
    assert_eq!(control.link().angles(), (150.0, 60.0));
}

#[test]
fn test_acquisition_failure_cleans_up() {
    let transport = MemoryTransport::new();
    let probe = transport.clone();
    let mut control = ControlLoop::new(transport, &config()).unwrap();
    let stop = AtomicBool::new(false);

    let result = control.run(
        &mut FailingSource { good_frames: 2 },
        &mut HeadlessOperator::new(),
        &stop,
    );

    assert!(matches!(result, Err(ControlError::Acquisition(msg)) if msg.contains("unplugged")));
    assert_eq!(control.state(), LoopState::Idle);
    assert!(!probe.is_connected());
    let lines = probe.lines();
    assert_eq!(&lines[lines.len() - 2..], &["#190\n", "#290\n"]);
}

#[test]
fn test_wrong_frame_size_stops_loop() {
    let transport = MemoryTransport::new();
    let mut control = ControlLoop::new(transport, &config()).unwrap();
    let stop = AtomicBool::new(false);
    let mut source = FrameSequence::from_frames(vec![Frame::new(W, H), Frame::new(W * 2, H)]);

    let result = control.run(&mut source, &mut HeadlessOperator::new(), &stop);
    assert!(matches!(result, Err(ControlError::Acquisition(_))));
    assert_eq!(control.status().cycles, 1);
}

#[test]
fn test_stop_flag_exits_before_first_frame() {
    let transport = MemoryTransport::new();
    let mut control = ControlLoop::new(transport, &config()).unwrap();
    let stop = AtomicBool::new(true);
    let mut source = frames(frame_with_target(40, 30), 5);

    let reason = control
        .run(&mut source, &mut HeadlessOperator::new(), &stop)
        .unwrap();
    assert_eq!(reason, ExitReason::Stopped);
    assert_eq!(source.remaining(), 5);
}

#[test]
fn test_operator_quit() {
    let transport = MemoryTransport::new();
    let mut control = ControlLoop::new(transport, &config()).unwrap();
    let stop = AtomicBool::new(false);
    let mut operator = ScriptedOperator::new().idle(2).then(OperatorEvent::Quit);
    let mut source = frames(frame_with_target(40, 30), 10);

    let reason = control.run(&mut source, &mut operator, &stop).unwrap();
    assert_eq!(reason, ExitReason::Quit);
    assert_eq!(source.remaining(), 7);
}

#[test]
fn test_paused_loop_sends_nothing() {
    let transport = MemoryTransport::new();
    let probe = transport.clone();
    let mut control = ControlLoop::new(transport, &config()).unwrap();
    let stop = AtomicBool::new(false);
    let mut operator = ScriptedOperator::new().then(OperatorEvent::TogglePause);
    let mut source = frames(frame_with_target(70, 50), 4);

    control.run(&mut source, &mut operator, &stop).unwrap();

    // start centre, first tracked cycle, shutdown centre
    assert_eq!(probe.lines().len(), 6);
    assert!(operator.seen()[1..]
        .iter()
        .all(|s| matches!(s.state, LoopState::Paused { .. })));
}

#[test]
fn test_boxed_source_and_operator() {
    let transport = MemoryTransport::new();
    let mut control = ControlLoop::new(transport, &config()).unwrap();
    let stop = AtomicBool::new(false);
    let mut source: Box<dyn FrameSource> = Box::new(frames(frame_with_target(40, 30), 2));
    let mut operator: Box<dyn pantilt_loop::Operator> = Box::new(HeadlessOperator::new());

    let reason = control.run(source.as_mut(), &mut operator, &stop).unwrap();
    assert_eq!(reason, ExitReason::EndOfStream);
}

#[test]
fn test_drop_while_running_recentres() {
    let transport = MemoryTransport::new();
    let probe = transport.clone();
    {
        let mut control = ControlLoop::new(transport, &config()).unwrap();
        control.start().unwrap();
        control.handle_event(OperatorEvent::ToggleMode);
        control.handle_event(OperatorEvent::MoveLeft);
        probe.clear();
    }
    assert_eq!(probe.lines(), vec!["#190\n", "#290\n"]);
    assert!(!probe.is_connected());
}

mod sequences {
    use super::*;
    use pantilt_cns::WireCommand;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Input {
        Frame(Option<(u32, u32)>),
        Event(OperatorEvent),
    }

    fn input() -> impl Strategy<Value = Input> {
        prop_oneof![
            3 => proptest::option::of((6u32..W - 6, 6u32..H - 6)).prop_map(Input::Frame),
            2 => proptest::sample::select(OperatorEvent::ALL.to_vec()).prop_map(Input::Event),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn test_any_session_stays_within_limits(inputs in proptest::collection::vec(input(), 1..40)) {
            let transport = MemoryTransport::new();
            let probe = transport.clone();
            let mut control = ControlLoop::new(transport, &config()).unwrap();
            control.start().unwrap();

            for input in inputs {
                match input {
                    Input::Frame(target) => {
                        let mut frame = match target {
                            Some((x, y)) => frame_with_target(x, y),
                            None => Frame::from_pixel(W, H, Rgb([20, 20, 20])),
                        };
                        control.step(&mut frame).unwrap();
                    }
                    Input::Event(event) => control.handle_event(event),
                }

                let status = control.status();
                prop_assert!((30.0..=150.0).contains(&status.pan));
                prop_assert!((60.0..=150.0).contains(&status.tilt));
                prop_assert!((1..=20).contains(&status.manual_step));
                if status.state != LoopState::Tracking {
                    prop_assert!(!status.object_found);
                }
            }

            control.shutdown().unwrap();
            prop_assert_eq!(control.state(), LoopState::Idle);
            for line in probe.lines() {
                let command = WireCommand::decode(line.as_bytes()).unwrap();
                prop_assert!(command.degrees <= 180);
            }
        }
    }
}
