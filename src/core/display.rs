// Display model behind the two terminal panes
//
// The ASCII pane shows inbound bytes as text, the hex pane shows the same
// bytes hex encoded. Both only grow until the user clears them. Everything
// that is not payload (modem status, AT replies, errors) goes to the log.

use super::hexdump::hex_dump;
use crate::link::LinkEvent;
use crate::xbee::{at_status_description, delivery_status_description, modem_status_description};

/// Append-only text with a record of what was added since the last drain
#[derive(Debug, Default, Clone)]
pub struct DisplayBuffer {
    text: String,
    pending: String,
}

impl DisplayBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, s: &str) {
        self.text.push_str(s);
        self.pending.push_str(s);
    }

    /// Everything since the last clear
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Text appended since the previous call
    pub fn take_pending(&mut self) -> String {
        std::mem::take(&mut self.pending)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.pending.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// New text for both panes since the last update
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DisplayUpdate {
    pub ascii: String,
    pub hex: String,
}

impl DisplayUpdate {
    pub fn is_empty(&self) -> bool {
        self.ascii.is_empty() && self.hex.is_empty()
    }
}

/// Incremental UTF-8 decoding for the text pane.
///
/// A character split across two reads is held back until its remaining
/// bytes arrive; only bytes that can never form a character become U+FFFD.
/// NUL becomes '.' so the text survives the trip through C strings into the
/// GUI toolkit.
#[derive(Debug, Default, Clone)]
pub struct TextDecoder {
    carry: Vec<u8>,
}

impl TextDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decode(&mut self, data: &[u8]) -> String {
        let mut bytes = std::mem::take(&mut self.carry);
        bytes.extend_from_slice(data);

        let mut text = String::with_capacity(bytes.len());
        let mut rest = bytes.as_slice();
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    text.push_str(valid);
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    text.push_str(&String::from_utf8_lossy(valid));
                    match e.error_len() {
                        Some(len) => {
                            text.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                        None => {
                            // Incomplete sequence at the end, at most 3 bytes
                            self.carry = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }

        text.replace('\0', ".")
    }

    /// Bytes held back waiting for the rest of a character
    pub fn pending(&self) -> &[u8] {
        &self.carry
    }

    pub fn reset(&mut self) {
        self.carry.clear();
    }
}

/// The two panes of the terminal
#[derive(Debug, Default)]
pub struct Terminal {
    ascii: DisplayBuffer,
    hex: DisplayBuffer,
    decoder: TextDecoder,
}

impl Terminal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ascii(&self) -> &str {
        self.ascii.text()
    }

    pub fn hex(&self) -> &str {
        self.hex.text()
    }

    /// Append inbound payload to both panes
    pub fn record_received(&mut self, data: &[u8]) {
        let text = self.decoder.decode(data);
        self.ascii.append(&text);
        self.hex.append(&hex::encode(data));
    }

    /// Apply one event from the link
    pub fn handle_event(&mut self, event: &LinkEvent) {
        match event {
            LinkEvent::Received(packet) => {
                tracing::debug!(
                    len = packet.data.len(),
                    source = ?packet.source.map(|a| a.to_string()),
                    "packet received"
                );
                self.record_received(&packet.data);
            }
            LinkEvent::ModemStatus { status } => {
                tracing::info!("Modem Status: {}", modem_status_description(*status));
            }
            LinkEvent::AtResponse {
                frame_id,
                command,
                status,
                data,
            } => {
                tracing::info!(
                    "AT Response: {} (frame {}) {}\n{}",
                    String::from_utf8_lossy(command),
                    frame_id,
                    at_status_description(*status),
                    hex_dump(data)
                );
            }
            LinkEvent::TransmitStatus {
                frame_id,
                retries,
                delivery,
                ..
            } => {
                if *delivery == 0 {
                    tracing::debug!(frame_id, retries, "packet delivered");
                } else {
                    tracing::warn!(
                        "Delivery failed for frame {}: {}",
                        frame_id,
                        delivery_status_description(*delivery)
                    );
                }
            }
            LinkEvent::Error { message } => {
                tracing::error!("{}", message);
            }
        }
    }

    /// Empty both panes
    pub fn clear(&mut self) {
        self.ascii.clear();
        self.hex.clear();
        self.decoder.reset();
    }

    /// Drain text added since the previous update
    pub fn take_update(&mut self) -> Option<DisplayUpdate> {
        if !self.ascii.has_pending() && !self.hex.has_pending() {
            return None;
        }
        Some(DisplayUpdate {
            ascii: self.ascii.take_pending(),
            hex: self.hex.take_pending(),
        })
    }
}
