// XBee API mode support: framing, frame types, addressing and status codes
pub mod address;
pub mod api;
pub mod frame;
pub mod status;

pub use address::{Address16, Address64};
pub use api::ApiFrame;
pub use frame::{checksum, encode_frame, FrameDecoder, FrameError};
pub use status::{at_status_description, delivery_status_description, modem_status_description};
