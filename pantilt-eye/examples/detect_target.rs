//! Locate the target in a still image
//!
//! ```text
//! cargo run -p pantilt-eye --example detect_target -- photo.jpg annotated.png
//! ```

use pantilt_eye::{ColorRange, ErrorEstimator, FrameSegmenter, FrameSize, VisionConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let input = args.next().ok_or("usage: detect_target <image> [output]")?;
    let output = args.next();

    let mut frame = image::open(&input)?.to_rgb8();
    let config = VisionConfig::default();
    let segmenter = FrameSegmenter::from_config(&config);

    for (name, range) in [("red", ColorRange::red()), ("skin", ColorRange::skin())] {
        let detection = segmenter.segment(&mut frame, &range);
        match detection.centroid() {
            Some(centroid) => {
                let error = ErrorEstimator::error(centroid, FrameSize::of(&frame));
                println!(
                    "{}: found at {:?}, area {:?}, offset ({:+.0}, {:+.0})",
                    name,
                    centroid,
                    detection.area(),
                    error.x,
                    error.y
                );
            }
            None => println!("{}: not found", name),
        }
    }

    if let Some(output) = output {
        frame.save(&output)?;
        println!("Annotated frame written to {}", output);
    }
    Ok(())
}
