//! Transport layer abstraction

use crate::error::CnsError;
use bytes::Bytes;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Transport type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportType {
    /// Serial port transport
    Serial,
    /// In-process byte sink (dry runs and tests)
    Memory,
}

/// Transport configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Transport type
    pub transport_type: TransportType,
    /// Device path, e.g. `/dev/ttyACM0` or `COM3`
    pub port: String,
    /// Line speed
    pub baud_rate: u32,
    /// Write timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            transport_type: TransportType::Serial,
            port: "/dev/ttyACM0".to_string(),
            baud_rate: 9600,
            timeout_ms: 1000,
        }
    }
}

/// Byte-oriented, ordered channel to the servo controller
pub trait Transport: Send {
    /// Get transport type
    fn transport_type(&self) -> TransportType;

    /// Open the channel
    fn connect(&mut self, config: &TransportConfig) -> Result<(), CnsError>;

    /// Close the channel; closing a closed channel is a no-op
    fn disconnect(&mut self) -> Result<(), CnsError>;

    /// Write all of `data`
    fn send(&mut self, data: &Bytes) -> Result<(), CnsError>;

    /// Check if transport is connected
    fn is_connected(&self) -> bool;
}

/// Build the transport named by `config`.
pub fn create_transport(config: &TransportConfig) -> Result<Box<dyn Transport>, CnsError> {
    match config.transport_type {
        TransportType::Memory => Ok(Box::new(MemoryTransport::new())),
        #[cfg(feature = "serial-transport")]
        TransportType::Serial => Ok(Box::new(SerialTransport::new())),
        #[cfg(not(feature = "serial-transport"))]
        TransportType::Serial => Err(CnsError::Config(
            "serial transport not compiled in (enable the `serial-transport` feature)".to_string(),
        )),
    }
}

impl Transport for Box<dyn Transport> {
    fn transport_type(&self) -> TransportType {
        (**self).transport_type()
    }

    fn connect(&mut self, config: &TransportConfig) -> Result<(), CnsError> {
        (**self).connect(config)
    }

    fn disconnect(&mut self) -> Result<(), CnsError> {
        (**self).disconnect()
    }

    fn send(&mut self, data: &Bytes) -> Result<(), CnsError> {
        (**self).send(data)
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    connected: bool,
    refuse_connect: bool,
    fail_writes: bool,
    written: Vec<u8>,
    connects: usize,
}

/// Records written bytes; clones share the same buffer
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport whose `connect` always fails.
    pub fn refusing() -> Self {
        let transport = Self::new();
        transport.state.lock().refuse_connect = true;
        transport
    }

    /// Make subsequent writes fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.state.lock().fail_writes = fail;
    }

    /// Everything written so far.
    pub fn written(&self) -> Vec<u8> {
        self.state.lock().written.clone()
    }

    /// Written bytes split into lines, newline kept.
    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.state.lock().written)
            .split_inclusive('\n')
            .map(str::to_string)
            .collect()
    }

    pub fn clear(&self) {
        self.state.lock().written.clear();
    }

    pub fn connect_count(&self) -> usize {
        self.state.lock().connects
    }
}

impl Transport for MemoryTransport {
    fn transport_type(&self) -> TransportType {
        TransportType::Memory
    }

    fn connect(&mut self, config: &TransportConfig) -> Result<(), CnsError> {
        let mut state = self.state.lock();
        if state.refuse_connect {
            return Err(CnsError::Connection(format!("{}: connection refused", config.port)));
        }
        state.connected = true;
        state.connects += 1;
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), CnsError> {
        self.state.lock().connected = false;
        Ok(())
    }

    fn send(&mut self, data: &Bytes) -> Result<(), CnsError> {
        let mut state = self.state.lock();
        if !state.connected {
            return Err(CnsError::Transport("Not connected".to_string()));
        }
        if state.fail_writes {
            return Err(CnsError::Transport("write failed".to_string()));
        }
        state.written.extend_from_slice(data);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.state.lock().connected
    }
}

#[cfg(feature = "serial-transport")]
pub use self::serial::SerialTransport;

#[cfg(feature = "serial-transport")]
mod serial {
    use super::{Transport, TransportConfig, TransportType};
    use crate::error::CnsError;
    use bytes::Bytes;
    use serialport::SerialPort;
    use std::io::Write;
    use std::time::Duration;
    use tracing::info;

    /// Serial port transport backed by the `serialport` crate
    #[derive(Default)]
    pub struct SerialTransport {
        port: Option<Box<dyn SerialPort>>,
        name: String,
    }

    impl SerialTransport {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl Transport for SerialTransport {
        fn transport_type(&self) -> TransportType {
            TransportType::Serial
        }

        fn connect(&mut self, config: &TransportConfig) -> Result<(), CnsError> {
            let port = serialport::new(config.port.as_str(), config.baud_rate)
                .timeout(Duration::from_millis(config.timeout_ms))
                .open()
                .map_err(|e| CnsError::Connection(format!("{}: {}", config.port, e)))?;
            self.port = Some(port);
            self.name = config.port.clone();
            info!("Opened serial port {} at {} baud", config.port, config.baud_rate);
            Ok(())
        }

        fn disconnect(&mut self) -> Result<(), CnsError> {
            if self.port.take().is_some() {
                info!("Closed serial port {}", self.name);
            }
            Ok(())
        }

        fn send(&mut self, data: &Bytes) -> Result<(), CnsError> {
            let port = self.port.as_mut().ok_or_else(|| CnsError::Transport("Not connected".to_string()))?;
            port.write_all(data)?;
            port.flush()?;
            Ok(())
        }

        fn is_connected(&self) -> bool {
            self.port.is_some()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_config() -> TransportConfig {
        TransportConfig {
            transport_type: TransportType::Memory,
            ..TransportConfig::default()
        }
    }

    #[test]
    fn test_memory_transport_records_bytes() {
        let mut transport = MemoryTransport::new();
        let probe = transport.clone();
        transport.connect(&memory_config()).unwrap();
        transport.send(&Bytes::from_static(b"#190\n")).unwrap();
        transport.send(&Bytes::from_static(b"#290\n")).unwrap();
        assert_eq!(probe.written(), b"#190\n#290\n");
        assert_eq!(probe.lines(), vec!["#190\n".to_string(), "#290\n".to_string()]);
    }

    #[test]
    fn test_memory_transport_requires_connection() {
        let mut transport = MemoryTransport::new();
        assert!(transport.send(&Bytes::from_static(b"#190\n")).is_err());
        assert!(transport.written().is_empty());
    }

    #[test]
    fn test_refusing_transport() {
        let mut transport = MemoryTransport::refusing();
        assert!(matches!(transport.connect(&memory_config()), Err(CnsError::Connection(_))));
        assert!(!transport.is_connected());
    }

    #[test]
    fn test_write_failure_injection() {
        let mut transport = MemoryTransport::new();
        transport.connect(&memory_config()).unwrap();
        transport.set_fail_writes(true);
        assert!(transport.send(&Bytes::from_static(b"#190\n")).is_err());
        transport.set_fail_writes(false);
        assert!(transport.send(&Bytes::from_static(b"#190\n")).is_ok());
    }

    #[test]
    fn test_create_memory_transport() {
        let transport = create_transport(&memory_config()).unwrap();
        assert_eq!(transport.transport_type(), TransportType::Memory);
        assert!(!transport.is_connected());
    }

    #[test]
    fn test_transport_config_serde() {
        let json = serde_json::to_string(&memory_config()).unwrap();
        assert!(json.contains("\"memory\""));
        let back: TransportConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, memory_config());
    }
}
