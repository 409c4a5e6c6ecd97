// Mock serial port for testing without hardware

use super::comm::{SerialConfig, SerialError};
use super::transport::Transport;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Mock serial port for testing
///
/// Clones share their buffers, so one clone can act as the link's reader,
/// another as its writer, and the test keeps a third to drive both.
#[derive(Clone)]
pub struct MockSerialPort {
    /// Data to be read (simulates the remote radio sending)
    read_buffer: Arc<Mutex<VecDeque<u8>>>,

    /// Data that was written (simulates what went out on the wire)
    write_buffer: Arc<Mutex<Vec<u8>>>,

    /// Makes every read fail with an I/O error (simulates an unplugged device)
    disconnected: Arc<Mutex<bool>>,

    /// Makes every write fail with an I/O error
    write_fails: Arc<Mutex<bool>>,

    /// Makes every read return zero bytes (simulates end of file)
    at_eof: Arc<Mutex<bool>>,

    /// Configuration
    config: SerialConfig,

    /// Simulated delay for read/write operations (in ms)
    delay_ms: u64,
}

impl MockSerialPort {
    /// Create a new mock serial port
    pub fn new() -> Self {
        Self {
            read_buffer: Arc::new(Mutex::new(VecDeque::new())),
            write_buffer: Arc::new(Mutex::new(Vec::new())),
            disconnected: Arc::new(Mutex::new(false)),
            write_fails: Arc::new(Mutex::new(false)),
            at_eof: Arc::new(Mutex::new(false)),
            config: SerialConfig::default(),
            delay_ms: 0,
        }
    }

    /// Set simulated delay for operations
    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Push data to be read
    pub fn push_read_data(&self, data: &[u8]) {
        let mut buffer = self.read_buffer.lock().unwrap();
        buffer.extend(data.iter().copied());
    }

    /// Get data that was written
    pub fn get_written_data(&self) -> Vec<u8> {
        self.write_buffer.lock().unwrap().clone()
    }

    /// Clear written data
    pub fn clear_written_data(&self) {
        self.write_buffer.lock().unwrap().clear();
    }

    /// Check if a specific byte sequence was written
    pub fn was_written(&self, expected: &[u8]) -> bool {
        let buffer = self.write_buffer.lock().unwrap();
        buffer
            .windows(expected.len())
            .any(|window| window == expected)
    }

    /// Make subsequent reads fail
    pub fn disconnect(&self) {
        *self.disconnected.lock().unwrap() = true;
    }

    /// Make subsequent reads return 0 bytes
    pub fn hang_up(&self) {
        *self.at_eof.lock().unwrap() = true;
    }

    /// Make subsequent writes fail (or succeed again)
    pub fn set_write_failure(&self, fail: bool) {
        *self.write_fails.lock().unwrap() = fail;
    }

    /// Get number of bytes available to read
    pub fn bytes_available(&self) -> usize {
        self.read_buffer.lock().unwrap().len()
    }

    async fn simulate_delay(&self) {
        if self.delay_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(self.delay_ms)).await;
        }
    }

    /// Simulate reading bytes
    pub async fn read(&mut self, buf: &mut [u8]) -> Result<usize, SerialError> {
        self.simulate_delay().await;

        if *self.disconnected.lock().unwrap() {
            return Err(SerialError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "device disconnected",
            )));
        }

        if *self.at_eof.lock().unwrap() {
            return Ok(0);
        }

        let mut buffer = self.read_buffer.lock().unwrap();
        let mut count = 0;

        for item in buf.iter_mut() {
            if let Some(byte) = buffer.pop_front() {
                *item = byte;
                count += 1;
            } else {
                break;
            }
        }

        if count == 0 {
            Err(SerialError::Timeout(self.config.timeout))
        } else {
            Ok(count)
        }
    }

    /// Simulate writing all bytes
    pub async fn write_all(&mut self, buf: &[u8]) -> Result<(), SerialError> {
        self.simulate_delay().await;

        if *self.write_fails.lock().unwrap() {
            return Err(SerialError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "write failed",
            )));
        }

        let mut buffer = self.write_buffer.lock().unwrap();
        buffer.extend_from_slice(buf);
        Ok(())
    }

    /// Simulate flush (no-op for mock)
    pub async fn flush(&mut self) -> Result<(), SerialError> {
        Ok(())
    }
}

impl Default for MockSerialPort {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MockSerialPort {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, SerialError> {
        MockSerialPort::read(self, buf).await
    }

    async fn write_all(&mut self, buf: &[u8]) -> Result<(), SerialError> {
        MockSerialPort::write_all(self, buf).await
    }

    async fn flush(&mut self) -> Result<(), SerialError> {
        MockSerialPort::flush(self).await
    }
}

/// Helper to create a mock port with pre-loaded inbound data
pub fn mock_port_with_response(response: &[u8]) -> MockSerialPort {
    let port = MockSerialPort::new();
    port.push_read_data(response);
    port
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_serial_basic() {
        let mut port = mock_port_with_response(b"Hello");

        let mut buf = [0u8; 5];
        let n = port.read(&mut buf).await.unwrap();
        assert_eq!(n, 5);
        assert_eq!(&buf, b"Hello");

        port.write_all(b"World").await.unwrap();
        assert_eq!(port.get_written_data(), b"World");
    }

    #[tokio::test]
    async fn test_mock_serial_timeout() {
        let mut port = MockSerialPort::new();

        let mut buf = [0u8; 5];
        let result = port.read(&mut buf).await;
        assert!(matches!(result, Err(SerialError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_mock_serial_partial_read() {
        let mut port = MockSerialPort::new();
        port.push_read_data(b"Hi");

        let mut buf = [0u8; 5];
        let n = port.read(&mut buf).await.unwrap();
        assert_eq!(n, 2);
        assert_eq!(&buf[..2], b"Hi");
        assert_eq!(port.bytes_available(), 0);
    }

    #[tokio::test]
    async fn test_mock_clones_share_buffers() {
        let driver = MockSerialPort::new();
        let mut writer = driver.clone();

        writer.write_all(b"COMMAND123").await.unwrap();

        assert!(driver.was_written(b"COMMAND"));
        assert!(driver.was_written(b"123"));
        assert!(!driver.was_written(b"NOTFOUND"));

        driver.clear_written_data();
        assert!(driver.get_written_data().is_empty());
    }

    #[tokio::test]
    async fn test_mock_disconnect() {
        let mut port = mock_port_with_response(b"data");
        port.disconnect();

        let mut buf = [0u8; 4];
        assert!(matches!(port.read(&mut buf).await, Err(SerialError::Io(_))));
    }

    #[tokio::test]
    async fn test_mock_hang_up() {
        let mut port = mock_port_with_response(b"data");
        port.hang_up();

        let mut buf = [0u8; 4];
        assert_eq!(port.read(&mut buf).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_mock_write_failure() {
        let mut port = MockSerialPort::new();
        port.set_write_failure(true);
        assert!(matches!(port.write_all(b"x").await, Err(SerialError::Io(_))));
        assert!(port.get_written_data().is_empty());

        port.set_write_failure(false);
        port.write_all(b"x").await.unwrap();
        assert_eq!(port.get_written_data(), b"x");
    }

    #[tokio::test]
    async fn test_mock_with_delay() {
        let mut port = MockSerialPort::new().with_delay(10);
        port.push_read_data(b"Test");

        let start = std::time::Instant::now();
        let mut buf = [0u8; 4];
        port.read(&mut buf).await.unwrap();

        assert!(start.elapsed().as_millis() >= 10);
    }
}
