// PITERM-RS: serial / XBee terminal for hobby robotics links
// Copyright 2024 - Licensed under GPLv3

pub mod cli;
pub mod core;
pub mod link;
pub mod logging;
pub mod serial;
pub mod session;
pub mod xbee;

#[cfg(feature = "gui")]
pub mod gui;

// Re-export commonly used types
pub use crate::core::{constants::*, DisplayUpdate, Terminal};
pub use link::{Link, LinkConfig, LinkError, LinkEvent, LinkMode, LinkResult};
pub use serial::{SerialConfig, SerialError, SerialPort, Transport};
pub use session::Session;
pub use xbee::{Address16, Address64, ApiFrame, FrameDecoder};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
