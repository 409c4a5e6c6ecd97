// Constants shared by the terminal front ends

use crate::xbee::{Address16, Address64};
use std::time::Duration;

/// XBee on the robot's head board
pub const HEAD_ADDRESS: Address64 = Address64([0x00, 0x13, 0xA2, 0x00, 0x40, 0x90, 0x2A, 0x21]);

/// XBee on the robot's body board
pub const BODY_ADDRESS: Address64 = Address64([0x00, 0x13, 0xA2, 0x00, 0x40, 0x90, 0x29, 0x23]);

/// Default destination for outbound packets
pub const DEFAULT_DESTINATION: Address64 = HEAD_ADDRESS;

/// Default 16-bit destination (let the radio resolve it)
pub const DEFAULT_NETWORK: Address16 = Address16::UNKNOWN;

/// Default window size (width, height)
pub const DEFAULT_RESOLUTION: (u32, u32) = (480, 280);

/// Smallest accepted window dimension
pub const MIN_DIMENSION: u32 = 100;

/// Serial timeout used when connecting and writing
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// How often the reader polls the port and the GUI polls the session
pub const POLL_INTERVAL: Duration = Duration::from_millis(30);

/// Size of a single read from the port
pub const READ_CHUNK: usize = 256;

/// Window title
pub const APP_NAME: &str = "PiTerm";

/// Shown after the GUI's --help text
pub const USAGE_EXAMPLE: &str = "Examples:\n  piterm /dev/tty0 9600\n  piterm /dev/tty1 115200 480x240";
