// Human readable descriptions for XBee status bytes

/// Describe a modem status (frame 0x8A) code
pub fn modem_status_description(status: u8) -> String {
    let text = match status {
        0x00 => "Hardware reset",
        0x01 => "Watchdog timer reset",
        0x02 => "Joined network",
        0x03 => "Disassociated",
        0x06 => "Coordinator started",
        0x07 => "Network security key was updated",
        0x0B => "Network woke up",
        0x0C => "Network went to sleep",
        0x0D => "Voltage supply limit exceeded",
        0x11 => "Modem configuration changed while join in progress",
        s if s >= 0x80 => return format!("Stack error ({:#04x})", s),
        s => return format!("Unknown modem status ({:#04x})", s),
    };
    text.to_string()
}

/// Describe an AT command response status
pub fn at_status_description(status: u8) -> &'static str {
    match status {
        0x00 => "OK",
        0x01 => "ERROR",
        0x02 => "Invalid command",
        0x03 => "Invalid parameter",
        0x04 => "Tx failure",
        _ => "Unknown status",
    }
}

/// Describe a transmit status delivery code
pub fn delivery_status_description(status: u8) -> &'static str {
    match status {
        0x00 => "Success",
        0x01 => "MAC ACK failure",
        0x02 => "CCA failure",
        0x15 => "Invalid destination endpoint",
        0x21 => "Network ACK failure",
        0x22 => "Not joined to network",
        0x23 => "Self-addressed",
        0x24 => "Address not found",
        0x25 => "Route not found",
        0x26 => "Broadcast source failed to hear a neighbor relay the message",
        0x2B => "Invalid binding table index",
        0x2C => "Resource error, lack of free buffers or timers",
        0x2D => "Attempted broadcast with APS transmission",
        0x2E => "Attempted unicast with APS transmission, but EE=0",
        0x32 => "Resource error, lack of free buffers or timers",
        0x74 => "Data payload too large",
        _ => "Unknown delivery status",
    }
}
