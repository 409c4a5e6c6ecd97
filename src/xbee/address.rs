// XBee 64-bit (IEEE) and 16-bit (network) addresses

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// 64-bit hardware address, printed as 16 uppercase hex digits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address64(pub [u8; 8]);

/// 16-bit network address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address16(pub [u8; 2]);

impl Address64 {
    /// Broadcast address
    pub const BROADCAST: Address64 = Address64([0, 0, 0, 0, 0, 0, 0xFF, 0xFF]);

    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }
}

impl Address16 {
    /// Network address not known; the radio resolves it from the 64-bit address
    pub const UNKNOWN: Address16 = Address16([0xFF, 0xFE]);

    pub fn as_bytes(&self) -> &[u8; 2] {
        &self.0
    }
}

fn parse_hex_array<const N: usize>(s: &str) -> Result<[u8; N], String> {
    let s = s.trim();
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);

    if digits.len() != N * 2 {
        return Err(format!(
            "expected {} hex digits, got {}",
            N * 2,
            digits.len()
        ));
    }

    let mut out = [0u8; N];
    hex::decode_to_slice(digits, &mut out).map_err(|e| format!("invalid hex address: {}", e))?;
    Ok(out)
}

impl FromStr for Address64 {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hex_array::<8>(s).map(Address64)
    }
}

impl FromStr for Address16 {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hex_array::<2>(s).map(Address16)
    }
}

impl fmt::Display for Address64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode_upper(self.0))
    }
}

impl fmt::Display for Address16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode_upper(self.0))
    }
}

impl Serialize for Address64 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl Serialize for Address16 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
