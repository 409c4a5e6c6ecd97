// Serial port abstraction with async support
// Wraps the serialport crate with tokio async functionality

use std::io::{self, Read, Write};
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;

#[derive(Error, Debug)]
pub enum SerialError {
    #[error("Serial port error: {0}")]
    Port(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Port not open")]
    NotOpen,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, SerialError>;

/// Serial port configuration
#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Baud rate (e.g., 9600, 19200, 38400, 57600, 115200)
    pub baud_rate: u32,

    /// Data bits (5, 6, 7, 8)
    pub data_bits: serialport::DataBits,

    /// Stop bits
    pub stop_bits: serialport::StopBits,

    /// Parity
    pub parity: serialport::Parity,

    /// Flow control
    pub flow_control: serialport::FlowControl,

    /// Read/write timeout
    pub timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: 9600,
            data_bits: serialport::DataBits::Eight,
            stop_bits: serialport::StopBits::One,
            parity: serialport::Parity::None,
            flow_control: serialport::FlowControl::None,
            timeout: Duration::from_secs(1),
        }
    }
}

impl SerialConfig {
    /// Create a new configuration with specified baud rate
    pub fn new(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            ..Default::default()
        }
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.baud_rate == 0 {
            return Err(SerialError::InvalidConfig("baud rate must be positive".into()));
        }
        if self.timeout.is_zero() {
            return Err(SerialError::InvalidConfig("timeout must be non-zero".into()));
        }
        Ok(())
    }
}

/// Async serial port wrapper
pub struct SerialPort {
    port: Option<Box<dyn serialport::SerialPort>>,
    config: SerialConfig,
    port_name: String,
}

impl SerialPort {
    /// Open a serial port with the given configuration
    pub fn open(port_name: &str, config: SerialConfig) -> Result<Self> {
        config.validate()?;

        let port = serialport::new(port_name, config.baud_rate)
            .data_bits(config.data_bits)
            .stop_bits(config.stop_bits)
            .parity(config.parity)
            .flow_control(config.flow_control)
            .timeout(config.timeout)
            .open()
            .map_err(|e| SerialError::Port(format!("{}: {}", port_name, e)))?;

        tracing::debug!(port = port_name, baud = config.baud_rate, "serial port opened");

        Ok(Self {
            port: Some(port),
            config,
            port_name: port_name.to_string(),
        })
    }

    /// Get the port name
    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// Get the configuration
    pub fn config(&self) -> &SerialConfig {
        &self.config
    }

    /// Open a second handle to the same device.
    ///
    /// The clone has its own timeout, so a reader can poll with a short
    /// timeout while the writer keeps the configured one.
    pub fn try_clone(&self) -> Result<Self> {
        let port = self.port.as_ref().ok_or(SerialError::NotOpen)?;
        let cloned = port
            .try_clone()
            .map_err(|e| SerialError::Port(e.to_string()))?;

        Ok(Self {
            port: Some(cloned),
            config: self.config.clone(),
            port_name: self.port_name.clone(),
        })
    }

    /// Change the read/write timeout of this handle
    pub fn set_timeout(&mut self, timeout: Duration) -> Result<()> {
        let port = self.port.as_mut().ok_or(SerialError::NotOpen)?;
        port.set_timeout(timeout)
            .map_err(|e| SerialError::Port(e.to_string()))?;
        self.config.timeout = timeout;
        Ok(())
    }

    /// Read up to n bytes with timeout
    pub async fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let port = self.port.as_mut().ok_or(SerialError::NotOpen)?;

        timeout(self.config.timeout, async {
            loop {
                match port.read(buf) {
                    Ok(n) => return Ok(n),
                    Err(ref e) if e.kind() == io::ErrorKind::TimedOut => {
                        tokio::time::sleep(Duration::from_millis(10)).await;
                        continue;
                    }
                    Err(e) => return Err(e),
                }
            }
        })
        .await
        .map_err(|_| SerialError::Timeout(self.config.timeout))?
        .map_err(SerialError::Io)
    }

    /// Write all bytes with timeout
    pub async fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        let port = self.port.as_mut().ok_or(SerialError::NotOpen)?;

        timeout(self.config.timeout, async {
            port.write_all(buf).map_err(SerialError::Io)
        })
        .await
        .map_err(|_| SerialError::Timeout(self.config.timeout))?
    }

    /// Flush the output buffer
    pub async fn flush(&mut self) -> Result<()> {
        let port = self.port.as_mut().ok_or(SerialError::NotOpen)?;
        port.flush().map_err(SerialError::Io)
    }

    /// Clear both input and output buffers
    pub fn clear_all(&mut self) -> Result<()> {
        let port = self.port.as_mut().ok_or(SerialError::NotOpen)?;
        port.clear(serialport::ClearBuffer::All)
            .map_err(|e| SerialError::Port(e.to_string()))
    }
}

/// List available serial ports
pub fn list_ports() -> Result<Vec<String>> {
    serialport::available_ports()
        .map_err(|e| SerialError::Port(e.to_string()))?
        .into_iter()
        .map(|p| Ok(p.port_name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_config() {
        let config = SerialConfig::default();
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.data_bits, serialport::DataBits::Eight);
        assert_eq!(config.flow_control, serialport::FlowControl::None);

        let config = SerialConfig::new(115200).with_timeout(Duration::from_secs(5));
        assert_eq!(config.baud_rate, 115200);
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_config_validation() {
        assert!(SerialConfig::new(9600).validate().is_ok());
        assert!(matches!(
            SerialConfig::new(0).validate(),
            Err(SerialError::InvalidConfig(_))
        ));
        assert!(SerialConfig::new(9600)
            .with_timeout(Duration::ZERO)
            .validate()
            .is_err());
    }

    #[test]
    fn test_open_missing_device() {
        let result = SerialPort::open("/dev/piterm-does-not-exist", SerialConfig::new(9600));
        assert!(matches!(result, Err(SerialError::Port(_))));
    }
}
