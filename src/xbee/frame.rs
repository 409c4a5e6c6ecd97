// XBee API framing
// Frame layout: 0x7E <len_hi> <len_lo> <frame data...> <checksum>

use thiserror::Error;

/// Start delimiter
pub const START_DELIMITER: u8 = 0x7E;

/// Escape marker used in API mode 2
pub const ESCAPE: u8 = 0x7D;

/// XON / XOFF, escaped in API mode 2
pub const XON: u8 = 0x11;
pub const XOFF: u8 = 0x13;

const ESCAPE_XOR: u8 = 0x20;

/// Largest frame data the 16-bit length field can describe
pub const MAX_FRAME_DATA: usize = u16::MAX as usize;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("Checksum mismatch (expected {expected:#04x}, got {actual:#04x})")]
    Checksum { expected: u8, actual: u8 },

    #[error("Frame with zero length")]
    Empty,

    #[error("Frame data too long: {0} bytes")]
    TooLong(usize),

    #[error("Start delimiter inside frame, {0} bytes discarded")]
    Interrupted(usize),

    #[error("Malformed {frame} frame: {reason}")]
    Malformed { frame: &'static str, reason: String },
}

/// Compute the API checksum over frame data (API id + payload)
pub fn checksum(frame_data: &[u8]) -> u8 {
    let sum = frame_data.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    0xFF - sum
}

fn needs_escape(byte: u8) -> bool {
    matches!(byte, START_DELIMITER | ESCAPE | XON | XOFF)
}

fn push_escaped(out: &mut Vec<u8>, byte: u8, escaped: bool) {
    if escaped && needs_escape(byte) {
        out.push(ESCAPE);
        out.push(byte ^ ESCAPE_XOR);
    } else {
        out.push(byte);
    }
}

/// Wrap frame data in a complete API frame
pub fn encode_frame(frame_data: &[u8], escaped: bool) -> Result<Vec<u8>, FrameError> {
    if frame_data.is_empty() {
        return Err(FrameError::Empty);
    }
    if frame_data.len() > MAX_FRAME_DATA {
        return Err(FrameError::TooLong(frame_data.len()));
    }

    let len = (frame_data.len() as u16).to_be_bytes();
    let mut out = Vec::with_capacity(frame_data.len() + 4);
    out.push(START_DELIMITER);

    for &byte in len.iter().chain(frame_data.iter()) {
        push_escaped(&mut out, byte, escaped);
    }
    push_escaped(&mut out, checksum(frame_data), escaped);

    Ok(out)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    LengthHigh,
    LengthLow,
    Data,
    Checksum,
}

/// Incremental frame decoder
///
/// Bytes arrive in arbitrary chunks from the serial port; the decoder keeps
/// its position between calls and yields the frame data of every complete
/// frame. Noise before a start delimiter is skipped silently.
#[derive(Debug)]
pub struct FrameDecoder {
    escaped: bool,
    state: State,
    unescape_next: bool,
    length: usize,
    data: Vec<u8>,
}

impl FrameDecoder {
    pub fn new(escaped: bool) -> Self {
        Self {
            escaped,
            state: State::Start,
            unescape_next: false,
            length: 0,
            data: Vec::new(),
        }
    }

    fn reset(&mut self) {
        self.state = State::Start;
        self.unescape_next = false;
        self.length = 0;
        self.data.clear();
    }

    /// Number of bytes consumed into the frame currently being assembled
    fn partial_len(&self) -> usize {
        match self.state {
            State::Start => 0,
            State::LengthHigh => 1,
            State::LengthLow => 2,
            State::Data | State::Checksum => 3 + self.data.len(),
        }
    }

    /// Feed one raw byte, returning a finished frame or error if this byte
    /// completed one
    pub fn push(&mut self, raw: u8) -> Option<Result<Vec<u8>, FrameError>> {
        if raw == START_DELIMITER && (self.escaped || self.state == State::Start) {
            // In escaped mode a bare delimiter always starts a new frame
            let discarded = self.partial_len();
            self.reset();
            self.state = State::LengthHigh;
            if discarded > 0 {
                return Some(Err(FrameError::Interrupted(discarded)));
            }
            return None;
        }

        if self.state == State::Start {
            tracing::trace!(byte = raw, "skipping byte outside frame");
            return None;
        }

        let byte = if self.escaped && raw == ESCAPE {
            self.unescape_next = true;
            return None;
        } else if self.unescape_next {
            self.unescape_next = false;
            raw ^ ESCAPE_XOR
        } else {
            raw
        };

        match self.state {
            State::Start => None,
            State::LengthHigh => {
                self.length = (byte as usize) << 8;
                self.state = State::LengthLow;
                None
            }
            State::LengthLow => {
                self.length |= byte as usize;
                if self.length == 0 {
                    self.reset();
                    return Some(Err(FrameError::Empty));
                }
                self.data.reserve(self.length);
                self.state = State::Data;
                None
            }
            State::Data => {
                self.data.push(byte);
                if self.data.len() == self.length {
                    self.state = State::Checksum;
                }
                None
            }
            State::Checksum => {
                let expected = checksum(&self.data);
                let data = std::mem::take(&mut self.data);
                self.reset();
                if expected == byte {
                    Some(Ok(data))
                } else {
                    Some(Err(FrameError::Checksum {
                        expected,
                        actual: byte,
                    }))
                }
            }
        }
    }

    /// Feed a chunk of raw bytes, collecting every result it produced
    pub fn decode(&mut self, bytes: &[u8]) -> Vec<Result<Vec<u8>, FrameError>> {
        bytes.iter().filter_map(|&b| self.push(b)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // AT command "NJ" with frame id 0x52, from the XBee reference manual
    const AT_NJ: [u8; 8] = [0x7E, 0x00, 0x04, 0x08, 0x52, 0x4E, 0x4A, 0x0D];

    #[test]
    fn test_checksum() {
        assert_eq!(checksum(&[0x08, 0x52, 0x4E, 0x4A]), 0x0D);

        // Sum of frame data and checksum is always 0xFF
        let data = [0x10, 0x01, 0xAA, 0xFE];
        let total = data
            .iter()
            .fold(checksum(&data), |acc, &b| acc.wrapping_add(b));
        assert_eq!(total, 0xFF);
    }

    #[test]
    fn test_encode_frame() {
        let frame = encode_frame(&[0x08, 0x52, 0x4E, 0x4A], false).unwrap();
        assert_eq!(frame, AT_NJ);

        assert_eq!(encode_frame(&[], false), Err(FrameError::Empty));
    }

    #[test]
    fn test_encode_escaped() {
        // 0x7E and 0x11 in the payload must be escaped, the start delimiter not
        let frame = encode_frame(&[0x8A, 0x7E, 0x11], true).unwrap();
        let sum = checksum(&[0x8A, 0x7E, 0x11]);
        assert_eq!(
            frame,
            vec![0x7E, 0x00, 0x03, 0x8A, 0x7D, 0x5E, 0x7D, 0x31, sum]
        );
    }

    #[test]
    fn test_decode_split_chunks() {
        let mut decoder = FrameDecoder::new(false);
        assert!(decoder.decode(&AT_NJ[..3]).is_empty());
        let frames = decoder.decode(&AT_NJ[3..]);
        assert_eq!(frames, vec![Ok(vec![0x08, 0x52, 0x4E, 0x4A])]);
    }

    #[test]
    fn test_decode_skips_noise_and_handles_back_to_back() {
        let mut decoder = FrameDecoder::new(false);
        let mut stream = vec![0x00, 0xFF, 0x41];
        stream.extend_from_slice(&AT_NJ);
        stream.extend_from_slice(&AT_NJ);

        let frames = decoder.decode(&stream);
        assert_eq!(frames.len(), 2);
        assert!(frames.iter().all(|f| f.is_ok()));
    }

    #[test]
    fn test_decode_bad_checksum() {
        let mut decoder = FrameDecoder::new(false);
        let mut bad = AT_NJ;
        bad[7] = 0x0E;

        let frames = decoder.decode(&bad);
        assert_eq!(
            frames,
            vec![Err(FrameError::Checksum {
                expected: 0x0D,
                actual: 0x0E
            })]
        );

        // Decoder recovers for the next frame
        assert_eq!(decoder.decode(&AT_NJ).len(), 1);
    }

    #[test]
    fn test_decode_zero_length() {
        let mut decoder = FrameDecoder::new(false);
        assert_eq!(decoder.decode(&[0x7E, 0x00, 0x00]), vec![Err(FrameError::Empty)]);
    }

    #[test]
    fn test_decode_escaped_payload() {
        let frame = encode_frame(&[0x90, 0x7D, 0x13, 0x7E], true).unwrap();
        let mut decoder = FrameDecoder::new(true);
        assert_eq!(decoder.decode(&frame), vec![Ok(vec![0x90, 0x7D, 0x13, 0x7E])]);
    }

    #[test]
    fn test_escaped_resync_on_delimiter() {
        let mut decoder = FrameDecoder::new(true);
        let mut stream = vec![0x7E, 0x00, 0x05, 0x90];
        stream.extend_from_slice(&AT_NJ);

        let results = decoder.decode(&stream);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0], Err(FrameError::Interrupted(4)));
        assert!(results[1].is_ok());
    }
}
