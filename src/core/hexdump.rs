// Canonical hex dump: offset, 16 bytes in two groups of eight, ASCII column

use std::fmt::Write;

/// Render `data` as a multi-line hex dump, one line per 16 bytes
pub fn hex_dump(data: &[u8]) -> String {
    let mut out = String::new();

    for (offset, chunk) in data.chunks(16).enumerate() {
        let _ = write!(out, "{:08x}  ", offset * 16);

        for i in 0..16 {
            match chunk.get(i) {
                Some(byte) => {
                    let _ = write!(out, "{:02x} ", byte);
                }
                None => out.push_str("   "),
            }
            if i == 7 {
                out.push(' ');
            }
        }

        out.push_str(" |");
        for byte in chunk {
            let c = if byte.is_ascii_graphic() || *byte == b' ' {
                *byte as char
            } else {
                '.'
            };
            out.push(c);
        }
        out.push_str("|\n");
    }

    out
}
