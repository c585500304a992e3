//! Tests for frame sources

use image::Rgb;
use pantilt_eye::{Frame, FrameSequence, FrameSource, VisionError};

#[test]
fn test_replay_directory_in_name_order() {
    let dir = tempfile::tempdir().unwrap();
    Frame::from_pixel(8, 8, Rgb([200, 0, 0])).save(dir.path().join("frame_002.png")).unwrap();
    Frame::from_pixel(8, 8, Rgb([0, 200, 0])).save(dir.path().join("frame_001.png")).unwrap();
    std::fs::write(dir.path().join("notes.txt"), "not a frame").unwrap();

    let mut source = FrameSequence::from_dir(dir.path()).unwrap();
    assert_eq!(source.remaining(), 2);

    let first = source.next_frame().unwrap().unwrap();
    assert_eq!(*first.get_pixel(0, 0), Rgb([0, 200, 0]));
    let second = source.next_frame().unwrap().unwrap();
    assert_eq!(*second.get_pixel(0, 0), Rgb([200, 0, 0]));
    assert!(source.next_frame().unwrap().is_none());
}

#[test]
fn test_replay_resizes_frames() {
    let dir = tempfile::tempdir().unwrap();
    Frame::from_pixel(64, 48, Rgb([10, 20, 30])).save(dir.path().join("a.png")).unwrap();

    let mut source = FrameSequence::from_dir(dir.path()).unwrap().with_resolution(32, 24);
    let frame = source.next_frame().unwrap().unwrap();
    assert_eq!(frame.dimensions(), (32, 24));
}

#[test]
fn test_empty_directory_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    match FrameSequence::from_dir(dir.path()) {
        Err(VisionError::Camera(msg)) => assert!(msg.contains("No PNG or JPEG")),
        _ => panic!("Expected Camera error"),
    }
}

#[test]
fn test_missing_directory_is_io_error() {
    let result = FrameSequence::from_dir("/definitely/not/here/pantilt");
    assert!(matches!(result, Err(VisionError::Io(_))));
}

#[test]
fn test_corrupt_frame_is_image_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("broken.png"), b"not really a png").unwrap();

    let mut source = FrameSequence::from_dir(dir.path()).unwrap();
    assert!(matches!(source.next_frame(), Err(VisionError::Image(_))));
}
