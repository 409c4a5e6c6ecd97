// Core module: display model, constants and formatting helpers
pub mod constants;
pub mod display;
pub mod hexdump;

// Re-export commonly used types
pub use constants::*;
pub use display::{DisplayBuffer, DisplayUpdate, Terminal, TextDecoder};
pub use hexdump::hex_dump;
