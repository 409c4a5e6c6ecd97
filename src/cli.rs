// Command line arguments for the terminal binaries

use crate::core::constants::{
    BODY_ADDRESS, DEFAULT_DESTINATION, DEFAULT_NETWORK, DEFAULT_RESOLUTION, DEFAULT_TIMEOUT,
    HEAD_ADDRESS, MIN_DIMENSION, USAGE_EXAMPLE,
};
use crate::link::{LinkConfig, LinkMode};
use crate::serial::SerialConfig;
use crate::xbee::{Address16, Address64};
use clap::{Args, Parser, ValueEnum};
use std::fmt;
use std::time::Duration;

/// Window size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            width: DEFAULT_RESOLUTION.0,
            height: DEFAULT_RESOLUTION.1,
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Parse a baud rate; only positive integers are accepted
pub fn parse_baud_rate(s: &str) -> Result<u32, String> {
    match s.trim().parse::<u32>() {
        Ok(baud) if baud > 0 => Ok(baud),
        _ => Err("Invalid Baud Rate".to_string()),
    }
}

/// Parse `<width>x<height>`, each dimension at least 100
pub fn parse_resolution(s: &str) -> Result<Resolution, String> {
    let parts: Vec<&str> = s.split('x').collect();
    if parts.len() != 2 {
        return Err("Invalid Resolution Format".to_string());
    }

    let dimension = |part: &str| part.trim().parse::<u32>().ok().filter(|&v| v >= MIN_DIMENSION);
    match (dimension(parts[0]), dimension(parts[1])) {
        (Some(width), Some(height)) => Ok(Resolution { width, height }),
        _ => Err(format!(
            "Minimum Resolution Must Be {}x{}",
            MIN_DIMENSION, MIN_DIMENSION
        )),
    }
}

/// Parse a 64-bit address; `head` and `body` name the robot's two radios
pub fn parse_address64(s: &str) -> Result<Address64, String> {
    match s.to_ascii_lowercase().as_str() {
        "head" => Ok(HEAD_ADDRESS),
        "body" => Ok(BODY_ADDRESS),
        _ => s.parse(),
    }
}

fn parse_address16(s: &str) -> Result<Address16, String> {
    s.parse()
}

/// Wire protocol selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Raw bytes, no framing
    Serial,
    /// XBee API mode 1
    Xbee,
    /// XBee API mode 2 (escaped)
    XbeeEscaped,
}

impl From<ModeArg> for LinkMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Serial => LinkMode::Serial,
            ModeArg::Xbee => LinkMode::Xbee { escaped: false },
            ModeArg::XbeeEscaped => LinkMode::Xbee { escaped: true },
        }
    }
}

/// Options shared by the GUI and console front ends
#[derive(Debug, Clone, Args)]
pub struct LinkOptions {
    /// Link protocol
    #[arg(long, value_enum, default_value_t = ModeArg::Xbee)]
    pub mode: ModeArg,

    /// 64-bit destination address: 16 hex digits, `head` or `body`
    #[arg(long, value_parser = parse_address64, default_value_t = DEFAULT_DESTINATION)]
    pub dest: Address64,

    /// 16-bit destination network address (FFFE when unknown)
    #[arg(long, value_parser = parse_address16, default_value_t = DEFAULT_NETWORK)]
    pub network: Address16,

    /// Serial timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs(), value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,
}

impl LinkOptions {
    pub fn link_config(&self) -> LinkConfig {
        LinkConfig {
            mode: self.mode.into(),
            destination: self.dest,
            network: self.network,
            ..Default::default()
        }
    }

    pub fn serial_config(&self, baud_rate: u32) -> SerialConfig {
        SerialConfig::new(baud_rate).with_timeout(Duration::from_secs(self.timeout))
    }
}

/// Serial/XBee terminal for Raspberry Pi robotics links
#[derive(Debug, Parser)]
#[command(
    name = "piterm",
    version,
    after_help = USAGE_EXAMPLE
)]
pub struct GuiArgs {
    /// Serial device, e.g. /dev/ttyUSB0
    pub device: String,

    /// Baud rate, e.g. 115200
    #[arg(value_parser = parse_baud_rate, allow_hyphen_values = true)]
    pub baud_rate: u32,

    /// Window size as <width>x<height>, each at least 100
    #[arg(value_parser = parse_resolution)]
    pub resolution: Option<Resolution>,

    #[command(flatten)]
    pub link: LinkOptions,
}

impl GuiArgs {
    pub fn resolution(&self) -> Resolution {
        self.resolution.unwrap_or_default()
    }
}

/// Headless serial/XBee terminal: stdin lines out, received packets to stdout
#[derive(Debug, Parser)]
#[command(
    name = "piterm-console",
    version,
    after_help = "Lines starting with ':at XX [hex]' send a local AT command on XBee links."
)]
pub struct ConsoleArgs {
    /// Serial device, e.g. /dev/ttyUSB0
    pub device: String,

    /// Baud rate, e.g. 115200
    #[arg(value_parser = parse_baud_rate, allow_hyphen_values = true)]
    pub baud_rate: u32,

    /// Print events as JSON lines
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub link: LinkOptions,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_parse_baud_rate() {
        assert_eq!(parse_baud_rate("115200"), Ok(115200));
        assert_eq!(parse_baud_rate("1"), Ok(1));
        assert!(parse_baud_rate("0").is_err());
        assert!(parse_baud_rate("-9600").is_err());
        assert!(parse_baud_rate("fast").is_err());
        assert!(parse_baud_rate("").is_err());
    }

    #[test]
    fn test_parse_resolution() {
        assert_eq!(
            parse_resolution("320x240"),
            Ok(Resolution {
                width: 320,
                height: 240
            })
        );
        assert_eq!(
            parse_resolution("100x100"),
            Ok(Resolution {
                width: 100,
                height: 100
            })
        );
    }

    #[test]
    fn test_parse_resolution_errors() {
        assert_eq!(
            parse_resolution("480"),
            Err("Invalid Resolution Format".to_string())
        );
        assert_eq!(
            parse_resolution("480x240x2"),
            Err("Invalid Resolution Format".to_string())
        );
        assert_eq!(
            parse_resolution("99x240"),
            Err("Minimum Resolution Must Be 100x100".to_string())
        );
        assert_eq!(
            parse_resolution("480x99"),
            Err("Minimum Resolution Must Be 100x100".to_string())
        );
        assert!(parse_resolution("widex240").is_err());
    }

    #[test]
    fn test_parse_address_names() {
        assert_eq!(parse_address64("head"), Ok(HEAD_ADDRESS));
        assert_eq!(parse_address64("BODY"), Ok(BODY_ADDRESS));
        assert_eq!(parse_address64("0013A20040902923"), Ok(BODY_ADDRESS));
        assert!(parse_address64("tail").is_err());
    }

    #[test]
    fn test_gui_args_defaults() {
        let args = GuiArgs::try_parse_from(["piterm", "/dev/ttyUSB0", "9600"]).unwrap();
        assert_eq!(args.device, "/dev/ttyUSB0");
        assert_eq!(args.baud_rate, 9600);
        assert_eq!(args.resolution(), Resolution::default());
        assert_eq!(args.resolution().to_string(), "480x280");

        let config = args.link.link_config();
        assert_eq!(config.mode, LinkMode::Xbee { escaped: false });
        assert_eq!(config.destination, DEFAULT_DESTINATION);
        assert_eq!(config.network, Address16::UNKNOWN);
        assert_eq!(args.link.serial_config(9600).timeout, Duration::from_secs(1));
    }

    #[test]
    fn test_gui_args_full() {
        let args = GuiArgs::try_parse_from([
            "piterm",
            "/dev/ttyAMA0",
            "115200",
            "320x240",
            "--mode",
            "serial",
            "--dest",
            "0013A20040902923",
            "--timeout",
            "3",
        ])
        .unwrap();
        assert_eq!(args.resolution().width, 320);
        assert_eq!(args.link.link_config().mode, LinkMode::Serial);
        assert_eq!(args.link.dest.to_string(), "0013A20040902923");
        assert_eq!(args.link.timeout, 3);
    }

    #[test]
    fn test_gui_args_rejected() {
        assert!(GuiArgs::try_parse_from(["piterm", "/dev/ttyUSB0"]).is_err());
        assert!(GuiArgs::try_parse_from(["piterm", "/dev/ttyUSB0", "0"]).is_err());
        assert!(GuiArgs::try_parse_from(["piterm", "/dev/ttyUSB0", "-1"]).is_err());
        assert!(GuiArgs::try_parse_from(["piterm", "/dev/ttyUSB0", "9600", "50x50"]).is_err());
        assert!(
            GuiArgs::try_parse_from(["piterm", "/dev/ttyUSB0", "9600", "--timeout", "0"]).is_err()
        );
    }

    #[test]
    fn test_console_args() {
        let args =
            ConsoleArgs::try_parse_from(["piterm-console", "/dev/ttyUSB0", "57600", "--json"])
                .unwrap();
        assert!(args.json);
        assert_eq!(args.baud_rate, 57600);
    }

    #[test]
    fn test_commands_are_well_formed() {
        GuiArgs::command().debug_assert();
        ConsoleArgs::command().debug_assert();
    }
}
