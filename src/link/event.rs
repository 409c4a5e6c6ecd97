// Events delivered from the link's reader task

use crate::xbee::{Address16, Address64, ApiFrame};
use serde::{Serialize, Serializer};

fn as_hex<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(data))
}

fn command_as_str<S: Serializer>(command: &[u8; 2], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&String::from_utf8_lossy(command))
}

/// Inbound payload, with addressing when it came through an XBee
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceivedPacket {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Address64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<Address16>,
    pub options: u8,
    #[serde(serialize_with = "as_hex")]
    pub data: Vec<u8>,
}

impl ReceivedPacket {
    /// Bytes read straight off a plain serial link
    pub fn raw(data: Vec<u8>) -> Self {
        Self {
            source: None,
            network: None,
            options: 0,
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LinkEvent {
    Received(ReceivedPacket),

    ModemStatus {
        status: u8,
    },

    AtResponse {
        frame_id: u8,
        #[serde(serialize_with = "command_as_str")]
        command: [u8; 2],
        status: u8,
        #[serde(serialize_with = "as_hex")]
        data: Vec<u8>,
    },

    TransmitStatus {
        frame_id: u8,
        network: Address16,
        retries: u8,
        delivery: u8,
    },

    Error {
        message: String,
    },
}

impl LinkEvent {
    pub fn error(message: impl Into<String>) -> Self {
        LinkEvent::Error {
            message: message.into(),
        }
    }

    /// Map a decoded API frame to the event the front ends care about.
    ///
    /// Returns `None` for outbound frame types echoed back and for frame
    /// types this terminal does not handle.
    pub fn from_frame(frame: ApiFrame) -> Option<Self> {
        match frame {
            ApiFrame::ReceivePacket {
                source,
                network,
                options,
                data,
            } => Some(LinkEvent::Received(ReceivedPacket {
                source: Some(source),
                network: Some(network),
                options,
                data,
            })),
            ApiFrame::ModemStatus { status } => Some(LinkEvent::ModemStatus { status }),
            ApiFrame::AtCommandResponse {
                frame_id,
                command,
                status,
                data,
            } => Some(LinkEvent::AtResponse {
                frame_id,
                command,
                status,
                data,
            }),
            ApiFrame::TransmitStatus {
                frame_id,
                network,
                retries,
                delivery,
                ..
            } => Some(LinkEvent::TransmitStatus {
                frame_id,
                network,
                retries,
                delivery,
            }),
            other => {
                tracing::debug!(
                    frame_type = other.frame_type(),
                    name = other.name(),
                    "ignoring frame"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_frame() {
        let event = LinkEvent::from_frame(ApiFrame::ModemStatus { status: 2 });
        assert_eq!(event, Some(LinkEvent::ModemStatus { status: 2 }));

        let ignored = LinkEvent::from_frame(ApiFrame::Unknown {
            frame_type: 0xA1,
            data: vec![],
        });
        assert!(ignored.is_none());
    }

    #[test]
    fn test_json_shape() {
        let event = LinkEvent::Received(ReceivedPacket::raw(b"hi".to_vec()));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "received");
        assert_eq!(json["data"], "6869");
        assert!(json.get("source").is_none());

        let event = LinkEvent::AtResponse {
            frame_id: 1,
            command: *b"NI",
            status: 0,
            data: b"BB8".to_vec(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "at_response");
        assert_eq!(json["command"], "NI");
        assert_eq!(json["data"], "424238");
    }
}
