// Connection to the remote side: plain serial or XBee API mode
pub mod event;
mod reader;

pub use event::{LinkEvent, ReceivedPacket};

use crate::core::constants::{DEFAULT_DESTINATION, DEFAULT_NETWORK, POLL_INTERVAL};
use crate::serial::{SerialConfig, SerialError, SerialPort, Transport};
use crate::xbee::{encode_frame, Address16, Address64, ApiFrame, FrameError};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;

#[derive(Error, Debug)]
pub enum LinkError {
    #[error(transparent)]
    Serial(#[from] SerialError),

    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error("Operation needs an XBee link")]
    NotXbee,

    #[error("Invalid AT command {0:?}: expected two ASCII letters or digits")]
    InvalidAtCommand(String),

    #[error("Link is closed")]
    Closed,

    #[error("Reader task failed: {0}")]
    Task(String),
}

pub type LinkResult<T> = std::result::Result<T, LinkError>;

/// How bytes on the wire are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkMode {
    /// Raw bytes both ways
    Serial,
    /// XBee API frames; `escaped` selects API mode 2
    Xbee { escaped: bool },
}

/// Addressing and mode for outbound packets
#[derive(Debug, Clone)]
pub struct LinkConfig {
    pub mode: LinkMode,
    pub destination: Address64,
    pub network: Address16,
    pub broadcast_radius: u8,
    pub options: u8,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            mode: LinkMode::Xbee { escaped: false },
            destination: DEFAULT_DESTINATION,
            network: DEFAULT_NETWORK,
            broadcast_radius: 0,
            options: 0,
        }
    }
}

impl LinkConfig {
    pub fn serial() -> Self {
        Self {
            mode: LinkMode::Serial,
            ..Default::default()
        }
    }
}

/// An open link with a running reader task.
///
/// Must be created inside a tokio runtime. Inbound traffic arrives on the
/// receiver returned by [`Link::start`] / [`Link::connect`].
pub struct Link<T: Transport> {
    writer: Arc<Mutex<T>>,
    config: LinkConfig,
    next_frame_id: AtomicU8,
    shutdown: watch::Sender<bool>,
    reader: Option<JoinHandle<()>>,
}

impl Link<SerialPort> {
    /// Open `device` and start reading from it
    pub fn connect(
        device: &str,
        serial_config: SerialConfig,
        config: LinkConfig,
    ) -> LinkResult<(Self, mpsc::UnboundedReceiver<LinkEvent>)> {
        let mut writer = SerialPort::open(device, serial_config)?;
        writer.clear_all()?;

        let mut reader = writer.try_clone()?;
        reader.set_timeout(POLL_INTERVAL)?;

        tracing::info!(
            device = writer.port_name(),
            baud = writer.config().baud_rate,
            mode = ?config.mode,
            "link connected"
        );

        Ok(Self::start(reader, writer, config))
    }
}

impl<T: Transport> Link<T> {
    /// Start a link over an already open reader/writer pair
    pub fn start(reader: T, writer: T, config: LinkConfig) -> (Self, mpsc::UnboundedReceiver<LinkEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(reader::run(reader, config.mode, events_tx, shutdown_rx));

        let link = Self {
            writer: Arc::new(Mutex::new(writer)),
            config,
            next_frame_id: AtomicU8::new(1),
            shutdown: shutdown_tx,
            reader: Some(handle),
        };

        (link, events_rx)
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Next frame id, cycling through 1..=255 (0 would suppress the reply)
    fn next_frame_id(&self) -> u8 {
        loop {
            let id = self.next_frame_id.fetch_add(1, Ordering::Relaxed);
            if id != 0 {
                return id;
            }
        }
    }

    fn escaped(&self) -> LinkResult<bool> {
        match self.config.mode {
            LinkMode::Xbee { escaped } => Ok(escaped),
            LinkMode::Serial => Err(LinkError::NotXbee),
        }
    }

    async fn write_raw(&self, bytes: &[u8]) -> LinkResult<()> {
        let mut port = self.writer.lock().await;
        port.write_all(bytes).await?;
        port.flush().await?;
        Ok(())
    }

    async fn write_frame(&self, frame: &ApiFrame) -> LinkResult<()> {
        let bytes = encode_frame(&frame.to_bytes(), self.escaped()?)?;
        tracing::debug!(name = frame.name(), len = bytes.len(), "sending frame");
        self.write_raw(&bytes).await
    }

    /// Send a payload to the configured destination.
    ///
    /// Returns the frame id on an XBee link, `None` on a plain serial link.
    pub async fn send_packet(&self, payload: &[u8]) -> LinkResult<Option<u8>> {
        match self.config.mode {
            LinkMode::Serial => {
                self.write_raw(payload).await?;
                tracing::debug!(len = payload.len(), "sent raw bytes");
                Ok(None)
            }
            LinkMode::Xbee { .. } => {
                let id = self
                    .send_to(
                        self.config.destination,
                        self.config.network,
                        self.config.options,
                        payload,
                    )
                    .await?;
                Ok(Some(id))
            }
        }
    }

    /// Send a transmit request to an explicit address
    pub async fn send_to(
        &self,
        destination: Address64,
        network: Address16,
        options: u8,
        payload: &[u8],
    ) -> LinkResult<u8> {
        let frame_id = self.next_frame_id();
        let frame = ApiFrame::TransmitRequest {
            frame_id,
            destination,
            network,
            broadcast_radius: self.config.broadcast_radius,
            options,
            payload: payload.to_vec(),
        };
        self.write_frame(&frame).await?;
        Ok(frame_id)
    }

    /// Issue a local AT command; an empty parameter queries the register
    pub async fn at_command(&self, command: &str, parameter: &[u8]) -> LinkResult<u8> {
        let bytes = command.as_bytes();
        if bytes.len() != 2 || !bytes.iter().all(|b| b.is_ascii_alphanumeric()) {
            return Err(LinkError::InvalidAtCommand(command.to_string()));
        }

        let frame_id = self.next_frame_id();
        let frame = ApiFrame::AtCommand {
            frame_id,
            command: [bytes[0].to_ascii_uppercase(), bytes[1].to_ascii_uppercase()],
            parameter: parameter.to_vec(),
        };
        self.write_frame(&frame).await?;
        Ok(frame_id)
    }

    /// Stop the reader and wait for it to exit
    pub async fn close(mut self) -> LinkResult<()> {
        let _ = self.shutdown.send(true);
        if let Some(handle) = self.reader.take() {
            handle.await.map_err(|e| LinkError::Task(e.to_string()))?;
        }
        tracing::info!("link closed");
        Ok(())
    }
}

impl<T: Transport> Drop for Link<T> {
    fn drop(&mut self) {
        // Reader notices on its next poll; close() is the way to wait for it
        let _ = self.shutdown.send(true);
    }
}
