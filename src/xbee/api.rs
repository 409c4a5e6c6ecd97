// XBee API frame types (the frame data between length and checksum)
// Parsed with nom the same way other binary records are

use super::address::{Address16, Address64};
use super::frame::FrameError;
use nom::{
    bytes::complete::take,
    combinator::rest,
    number::complete::be_u8,
    IResult,
};

/// API identifiers
pub mod frame_type {
    pub const AT_COMMAND: u8 = 0x08;
    pub const TRANSMIT_REQUEST: u8 = 0x10;
    pub const AT_COMMAND_RESPONSE: u8 = 0x88;
    pub const MODEM_STATUS: u8 = 0x8A;
    pub const TRANSMIT_STATUS: u8 = 0x8B;
    pub const RECEIVE_PACKET: u8 = 0x90;
}

/// A decoded API frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiFrame {
    /// Local AT command (query when `parameter` is empty)
    AtCommand {
        frame_id: u8,
        command: [u8; 2],
        parameter: Vec<u8>,
    },

    /// Outbound RF data
    TransmitRequest {
        frame_id: u8,
        destination: Address64,
        network: Address16,
        broadcast_radius: u8,
        options: u8,
        payload: Vec<u8>,
    },

    AtCommandResponse {
        frame_id: u8,
        command: [u8; 2],
        status: u8,
        data: Vec<u8>,
    },

    ModemStatus {
        status: u8,
    },

    TransmitStatus {
        frame_id: u8,
        network: Address16,
        retries: u8,
        delivery: u8,
        discovery: u8,
    },

    /// Inbound RF data
    ReceivePacket {
        source: Address64,
        network: Address16,
        options: u8,
        data: Vec<u8>,
    },

    /// Any frame type this terminal does not interpret
    Unknown {
        frame_type: u8,
        data: Vec<u8>,
    },
}

fn parse_address64(input: &[u8]) -> IResult<&[u8], Address64> {
    let (input, bytes) = take(8usize)(input)?;
    let mut addr = [0u8; 8];
    addr.copy_from_slice(bytes);
    Ok((input, Address64(addr)))
}

fn parse_address16(input: &[u8]) -> IResult<&[u8], Address16> {
    let (input, bytes) = take(2usize)(input)?;
    Ok((input, Address16([bytes[0], bytes[1]])))
}

fn parse_command(input: &[u8]) -> IResult<&[u8], [u8; 2]> {
    let (input, bytes) = take(2usize)(input)?;
    Ok((input, [bytes[0], bytes[1]]))
}

fn parse_at_command(input: &[u8]) -> IResult<&[u8], ApiFrame> {
    let (input, frame_id) = be_u8(input)?;
    let (input, command) = parse_command(input)?;
    let (input, parameter) = rest(input)?;
    Ok((
        input,
        ApiFrame::AtCommand {
            frame_id,
            command,
            parameter: parameter.to_vec(),
        },
    ))
}

fn parse_transmit_request(input: &[u8]) -> IResult<&[u8], ApiFrame> {
    let (input, frame_id) = be_u8(input)?;
    let (input, destination) = parse_address64(input)?;
    let (input, network) = parse_address16(input)?;
    let (input, broadcast_radius) = be_u8(input)?;
    let (input, options) = be_u8(input)?;
    let (input, payload) = rest(input)?;
    Ok((
        input,
        ApiFrame::TransmitRequest {
            frame_id,
            destination,
            network,
            broadcast_radius,
            options,
            payload: payload.to_vec(),
        },
    ))
}

fn parse_at_response(input: &[u8]) -> IResult<&[u8], ApiFrame> {
    let (input, frame_id) = be_u8(input)?;
    let (input, command) = parse_command(input)?;
    let (input, status) = be_u8(input)?;
    let (input, data) = rest(input)?;
    Ok((
        input,
        ApiFrame::AtCommandResponse {
            frame_id,
            command,
            status,
            data: data.to_vec(),
        },
    ))
}

fn parse_modem_status(input: &[u8]) -> IResult<&[u8], ApiFrame> {
    let (input, status) = be_u8(input)?;
    Ok((input, ApiFrame::ModemStatus { status }))
}

fn parse_transmit_status(input: &[u8]) -> IResult<&[u8], ApiFrame> {
    let (input, frame_id) = be_u8(input)?;
    let (input, network) = parse_address16(input)?;
    let (input, retries) = be_u8(input)?;
    let (input, delivery) = be_u8(input)?;
    let (input, discovery) = be_u8(input)?;
    Ok((
        input,
        ApiFrame::TransmitStatus {
            frame_id,
            network,
            retries,
            delivery,
            discovery,
        },
    ))
}

fn parse_receive_packet(input: &[u8]) -> IResult<&[u8], ApiFrame> {
    let (input, source) = parse_address64(input)?;
    let (input, network) = parse_address16(input)?;
    let (input, options) = be_u8(input)?;
    let (input, data) = rest(input)?;
    Ok((
        input,
        ApiFrame::ReceivePacket {
            source,
            network,
            options,
            data: data.to_vec(),
        },
    ))
}

impl ApiFrame {
    /// API identifier of this frame
    pub fn frame_type(&self) -> u8 {
        match self {
            ApiFrame::AtCommand { .. } => frame_type::AT_COMMAND,
            ApiFrame::TransmitRequest { .. } => frame_type::TRANSMIT_REQUEST,
            ApiFrame::AtCommandResponse { .. } => frame_type::AT_COMMAND_RESPONSE,
            ApiFrame::ModemStatus { .. } => frame_type::MODEM_STATUS,
            ApiFrame::TransmitStatus { .. } => frame_type::TRANSMIT_STATUS,
            ApiFrame::ReceivePacket { .. } => frame_type::RECEIVE_PACKET,
            ApiFrame::Unknown { frame_type, .. } => *frame_type,
        }
    }

    /// Short human readable name, used in logs and errors
    pub fn name(&self) -> &'static str {
        type_name(self.frame_type())
    }

    /// Parse frame data (API identifier first)
    pub fn parse(frame_data: &[u8]) -> Result<ApiFrame, FrameError> {
        let (&api_id, body) = frame_data.split_first().ok_or(FrameError::Empty)?;

        let parsed = match api_id {
            frame_type::AT_COMMAND => parse_at_command(body),
            frame_type::TRANSMIT_REQUEST => parse_transmit_request(body),
            frame_type::AT_COMMAND_RESPONSE => parse_at_response(body),
            frame_type::MODEM_STATUS => parse_modem_status(body),
            frame_type::TRANSMIT_STATUS => parse_transmit_status(body),
            frame_type::RECEIVE_PACKET => parse_receive_packet(body),
            other => {
                return Ok(ApiFrame::Unknown {
                    frame_type: other,
                    data: body.to_vec(),
                })
            }
        };

        parsed
            .map(|(_, frame)| frame)
            .map_err(|e| FrameError::Malformed {
                frame: type_name(api_id),
                reason: match e {
                    nom::Err::Incomplete(_) => "incomplete".to_string(),
                    nom::Err::Error(err) | nom::Err::Failure(err) => {
                        format!("{:?} after {} bytes", err.code, body.len() - err.input.len())
                    }
                },
            })
    }

    /// Serialize to frame data (API identifier first)
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![self.frame_type()];
        match self {
            ApiFrame::AtCommand {
                frame_id,
                command,
                parameter,
            } => {
                out.push(*frame_id);
                out.extend_from_slice(command);
                out.extend_from_slice(parameter);
            }
            ApiFrame::TransmitRequest {
                frame_id,
                destination,
                network,
                broadcast_radius,
                options,
                payload,
            } => {
                out.push(*frame_id);
                out.extend_from_slice(destination.as_bytes());
                out.extend_from_slice(network.as_bytes());
                out.push(*broadcast_radius);
                out.push(*options);
                out.extend_from_slice(payload);
            }
            ApiFrame::AtCommandResponse {
                frame_id,
                command,
                status,
                data,
            } => {
                out.push(*frame_id);
                out.extend_from_slice(command);
                out.push(*status);
                out.extend_from_slice(data);
            }
            ApiFrame::ModemStatus { status } => out.push(*status),
            ApiFrame::TransmitStatus {
                frame_id,
                network,
                retries,
                delivery,
                discovery,
            } => {
                out.push(*frame_id);
                out.extend_from_slice(network.as_bytes());
                out.extend_from_slice(&[*retries, *delivery, *discovery]);
            }
            ApiFrame::ReceivePacket {
                source,
                network,
                options,
                data,
            } => {
                out.extend_from_slice(source.as_bytes());
                out.extend_from_slice(network.as_bytes());
                out.push(*options);
                out.extend_from_slice(data);
            }
            ApiFrame::Unknown { data, .. } => out.extend_from_slice(data),
        }
        out
    }
}

fn type_name(api_id: u8) -> &'static str {
    match api_id {
        frame_type::AT_COMMAND => "AT Command",
        frame_type::TRANSMIT_REQUEST => "Transmit Request",
        frame_type::AT_COMMAND_RESPONSE => "AT Command Response",
        frame_type::MODEM_STATUS => "Modem Status",
        frame_type::TRANSMIT_STATUS => "Transmit Status",
        frame_type::RECEIVE_PACKET => "Receive Packet",
        _ => "Unknown",
    }
}
