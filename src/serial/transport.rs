// Byte transport seam between the link layer and the physical port

use super::comm::{Result, SerialPort};
use std::future::Future;

/// Anything the link can read raw bytes from and write raw bytes to.
///
/// A read that finds no data within the handle's timeout must fail with
/// `SerialError::Timeout` so the reader loop can keep polling.
pub trait Transport: Send + 'static {
    /// Read up to `buf.len()` bytes
    fn read(&mut self, buf: &mut [u8]) -> impl Future<Output = Result<usize>> + Send;

    /// Write the whole buffer
    fn write_all(&mut self, buf: &[u8]) -> impl Future<Output = Result<()>> + Send;

    /// Flush pending output
    fn flush(&mut self) -> impl Future<Output = Result<()>> + Send;
}

impl Transport for SerialPort {
    fn read(&mut self, buf: &mut [u8]) -> impl Future<Output = Result<usize>> + Send {
        SerialPort::read(self, buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> impl Future<Output = Result<()>> + Send {
        SerialPort::write_all(self, buf)
    }

    fn flush(&mut self) -> impl Future<Output = Result<()>> + Send {
        SerialPort::flush(self)
    }
}
