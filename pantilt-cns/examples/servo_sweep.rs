//! Servo sweep example
//!
//! Without arguments the commands are recorded in memory and printed.
//! With `--features serial-transport` and a port argument they go to the rig:
//!
//! ```text
//! cargo run -p pantilt-cns --example servo_sweep --features serial-transport -- /dev/ttyACM0
//! ```

use pantilt_cns::{create_transport, ActuatorLink, MemoryTransport, ServoConfig, TransportType};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    match std::env::args().nth(1) {
        Some(port) => {
            let config = ServoConfig {
                port,
                ..ServoConfig::default()
            };
            let transport = create_transport(&config.transport(TransportType::Serial))?;
            let mut link = ActuatorLink::new(transport, &config);
            link.connect()?;
            link.self_test()?;
            link.smooth_move(120.0, 100.0, 20)?;
            link.center()?;
            link.disconnect()?;
        }
        None => {
            let transport = MemoryTransport::new();
            let probe = transport.clone();
            let config = ServoConfig {
                settle_delay_ms: 0,
                ..ServoConfig::default()
            };
            let mut link = ActuatorLink::new(transport, &config).without_delays();
            link.connect()?;
            link.self_test()?;
            link.smooth_move(120.0, 100.0, 4)?;
            link.center()?;
            link.disconnect()?;

            for line in probe.lines() {
                print!("{}", line);
            }
        }
    }

    Ok(())
}
