// pantilt command line interface
// Colour tracking on a two-axis servo rig, plus servo maintenance commands

mod console;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use pantilt_cns::{create_transport, ActuatorLink, Axis, Transport, TransportType, WireCommand};
use pantilt_eye::{ColorRange, FrameSequence, FrameSource};
use pantilt_loop::{ControlLoop, HeadlessOperator, Operator, TrackerConfig};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "pantilt")]
#[command(about = "Keep a coloured object centred with a pan/tilt servo rig", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (JSON or TOML)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum ConfigFormat {
    Toml,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum AxisArg {
    Pan,
    Tilt,
}

impl From<AxisArg> for Axis {
    fn from(axis: AxisArg) -> Self {
        match axis {
            AxisArg::Pan => Axis::Pan,
            AxisArg::Tilt => Axis::Tilt,
        }
    }
}

/// Serial link options shared by every command that talks to the rig
#[derive(clap::Args)]
struct LinkArgs {
    /// Serial port (overrides the configuration)
    #[arg(long, short)]
    port: Option<String>,

    /// Baud rate (overrides the configuration)
    #[arg(long)]
    baud: Option<u32>,

    /// Record commands in memory instead of opening the serial port
    #[arg(long)]
    dry_run: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Track the configured colour until stopped
    Track {
        #[command(flatten)]
        link: LinkArgs,

        /// Replay PNG/JPEG frames from a directory instead of the camera
        #[arg(long)]
        frames_dir: Option<PathBuf>,

        /// Camera index
        #[arg(long)]
        camera: Option<u32>,

        /// Proportional gain
        #[arg(long)]
        gain: Option<f64>,

        /// Smoothing factor in (0, 1]
        #[arg(long)]
        smoothing: Option<f64>,

        /// Minimum region area in pixels
        #[arg(long)]
        min_area: Option<u32>,

        /// Track skin tones instead of the configured colour
        #[arg(long)]
        skin: bool,

        /// Run without a preview window
        #[arg(long)]
        headless: bool,
    },

    /// Sweep both servos through the self-test pattern
    ServoTest {
        #[command(flatten)]
        link: LinkArgs,
    },

    /// Move the rig to an angle pair in interpolated steps
    Move {
        #[command(flatten)]
        link: LinkArgs,

        /// Pan angle in degrees
        pan: f64,

        /// Tilt angle in degrees
        tilt: f64,

        /// Interpolation steps
        #[arg(long, default_value = "10")]
        steps: u32,
    },

    /// Send a single angle command
    Send {
        #[command(flatten)]
        link: LinkArgs,

        #[arg(value_enum)]
        axis: AxisArg,

        /// Angle in degrees (clamped to the axis range)
        angle: f64,
    },

    /// Validate and print the effective configuration
    CheckConfig {
        #[arg(long, value_enum, default_value_t = ConfigFormat::Toml)]
        format: ConfigFormat,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_format)?;

    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Track {
            link,
            frames_dir,
            camera,
            gain,
            smoothing,
            min_area,
            skin,
            headless,
        } => {
            apply_link_args(&mut config, &link);
            if let Some(camera) = camera {
                config.vision.camera_id = camera;
            }
            if let Some(gain) = gain {
                config.control.gain = gain;
            }
            if let Some(smoothing) = smoothing {
                config.control.smoothing_factor = smoothing;
            }
            if let Some(min_area) = min_area {
                config.vision.min_area = min_area;
            }
            if skin {
                config.vision.color_range = ColorRange::skin();
            }
            config.validate()?;
            track(config, link.dry_run, frames_dir, headless).await?;
        }
        Commands::ServoTest { link } => {
            apply_link_args(&mut config, &link);
            config.validate()?;
            let mut actuator = open_link(&config, link.dry_run)?;
            actuator.self_test()?;
            actuator.center()?;
            actuator.disconnect()?;
            println!("Servo self-test complete");
        }
        Commands::Move {
            link,
            pan,
            tilt,
            steps,
        } => {
            apply_link_args(&mut config, &link);
            config.validate()?;
            let mut actuator = open_link(&config, link.dry_run)?;
            actuator.smooth_move(pan, tilt, steps)?;
            let (pan, tilt) = actuator.angles();
            actuator.disconnect()?;
            println!("pan {:.1} tilt {:.1}", pan, tilt);
        }
        Commands::Send { link, axis, angle } => {
            apply_link_args(&mut config, &link);
            config.validate()?;
            let axis = Axis::from(axis);
            let mut actuator = open_link(&config, link.dry_run)?;
            let sent = actuator.set_angle(axis, angle)?;
            actuator.disconnect()?;
            println!(
                "{} {:.1} -> {:?}",
                axis,
                sent,
                WireCommand::from_angle(axis, sent).to_string()
            );
        }
        Commands::CheckConfig { format } => {
            config.validate()?;
            let rendered = match format {
                ConfigFormat::Toml => config.to_toml()?,
                ConfigFormat::Json => config.to_json()?,
            };
            println!("{}", rendered);
        }
    }

    Ok(())
}

fn init_tracing(log_level: &str, format: LogFormat) -> anyhow::Result<()> {
    let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
    if !valid_log_levels.contains(&log_level) {
        bail!("Invalid log level: {}", log_level);
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(fmt::layer().with_target(false))
            .with(env_filter)
            .init(),
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<TrackerConfig> {
    let config = match path {
        Some(path) => TrackerConfig::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => {
            let mut config = TrackerConfig::default();
            config.apply_env()?;
            config
        }
    };
    Ok(config)
}

fn apply_link_args(config: &mut TrackerConfig, link: &LinkArgs) {
    if let Some(port) = &link.port {
        config.servo.port = port.clone();
    }
    if let Some(baud) = link.baud {
        config.servo.baud_rate = baud;
    }
    if link.dry_run {
        config.servo.settle_delay_ms = 0;
    }
}

fn open_transport(config: &TrackerConfig, dry_run: bool) -> anyhow::Result<Box<dyn Transport>> {
    let transport_type = if dry_run {
        TransportType::Memory
    } else {
        TransportType::Serial
    };
    Ok(create_transport(&config.servo.transport(transport_type))?)
}

fn open_link(config: &TrackerConfig, dry_run: bool) -> anyhow::Result<ActuatorLink<Box<dyn Transport>>> {
    let mut link = ActuatorLink::new(open_transport(config, dry_run)?, &config.servo);
    link.connect()
        .with_context(|| format!("Failed to open servo link on {}", config.servo.port))?;
    Ok(link)
}

async fn track(
    config: TrackerConfig,
    dry_run: bool,
    frames_dir: Option<PathBuf>,
    headless: bool,
) -> anyhow::Result<()> {
    let transport = open_transport(&config, dry_run)?;
    let mut control = ControlLoop::new(transport, &config)?;

    let stop = Arc::new(AtomicBool::new(false));
    let signal_flag = stop.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, stopping");
            signal_flag.store(true, Ordering::SeqCst);
        }
    });

    if !headless {
        println!("{}", console::HELP);
    }

    let reason = tokio::task::spawn_blocking(move || -> anyhow::Result<_> {
        let mut source = open_source(&config, frames_dir.as_deref())?;
        let mut operator = open_operator(headless)?;
        let reason = control.run(source.as_mut(), &mut operator, &stop)?;
        Ok(reason)
    })
    .await??;

    info!("Tracking finished: {:?}", reason);
    Ok(())
}

fn open_source(config: &TrackerConfig, frames_dir: Option<&Path>) -> anyhow::Result<Box<dyn FrameSource>> {
    let (width, height) = config.vision.resolution;
    if let Some(dir) = frames_dir {
        let source = FrameSequence::from_dir(dir)
            .with_context(|| format!("Failed to read frames from {}", dir.display()))?
            .with_resolution(width, height);
        return Ok(Box::new(source));
    }

    #[cfg(feature = "camera")]
    {
        let camera = pantilt_eye::camera::OpenCvCamera::open(&config.vision)?;
        Ok(Box::new(camera))
    }

    #[cfg(not(feature = "camera"))]
    {
        bail!("Built without camera support; rebuild with --features camera or pass --frames-dir")
    }
}

fn open_operator(headless: bool) -> anyhow::Result<Box<dyn Operator>> {
    if headless {
        return Ok(Box::new(HeadlessOperator::new()));
    }

    #[cfg(feature = "camera")]
    {
        Ok(Box::new(console::WindowOperator::new("pantilt")?))
    }

    #[cfg(not(feature = "camera"))]
    {
        tracing::warn!("Built without a preview window; running headless");
        Ok(Box::new(HeadlessOperator::new()))
    }
}
