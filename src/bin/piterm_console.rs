//! Headless terminal
//! Sends each stdin line as one packet and prints whatever comes back

use anyhow::Context;
use clap::Parser;
use piterm_rs::cli::ConsoleArgs;
use piterm_rs::link::{Link, LinkEvent};
use piterm_rs::serial::{list_ports, SerialPort};
use piterm_rs::Terminal;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

/// A parsed `:at XX [hex]` line
#[derive(Debug, PartialEq, Eq)]
struct AtRequest {
    command: String,
    parameter: Vec<u8>,
}

/// Returns `None` for ordinary lines that should be sent as data
fn parse_at_line(line: &str) -> Option<Result<AtRequest, String>> {
    let rest = line.strip_prefix(":at")?;
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let mut words = rest.split_whitespace();

    let Some(command) = words.next() else {
        return Some(Err("usage: :at XX [hex parameter]".to_string()));
    };
    let parameter = match words.next() {
        Some(param) => match hex::decode(param) {
            Ok(bytes) => bytes,
            Err(e) => return Some(Err(format!("bad parameter {:?}: {}", param, e))),
        },
        None => Vec::new(),
    };

    Some(Ok(AtRequest {
        command: command.to_string(),
        parameter,
    }))
}

fn print_event(event: &LinkEvent, json: bool, terminal: &mut Terminal) -> anyhow::Result<()> {
    if json {
        let line = serde_json::to_string(event)?;
        println!("{}", line);
    } else {
        terminal.handle_event(event);
        if let Some(update) = terminal.take_update() {
            println!("{}  | {}", update.ascii, update.hex);
        }
        // Keep memory flat; the console has its own scrollback
        terminal.clear();
    }
    std::io::stdout().flush()?;
    Ok(())
}

async fn handle_line(link: &Link<SerialPort>, line: &str) {
    match parse_at_line(line) {
        Some(Ok(request)) => match link.at_command(&request.command, &request.parameter).await {
            Ok(frame_id) => tracing::info!(command = %request.command, frame_id, "AT command sent"),
            Err(e) => tracing::error!("AT Error: {}", e),
        },
        Some(Err(message)) => tracing::error!("{}", message),
        None => {
            if let Err(e) = link.send_packet(line.as_bytes()).await {
                tracing::error!("Send Error: {}", e);
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ConsoleArgs::parse();
    piterm_rs::logging::init();

    let (link, mut events) = match Link::connect(
        &args.device,
        args.link.serial_config(args.baud_rate),
        args.link.link_config(),
    ) {
        Ok(opened) => opened,
        Err(e) => {
            if let Ok(ports) = list_ports() {
                tracing::info!("Available ports: {}", ports.join(", "));
            }
            return Err(e).with_context(|| format!("Failed to open {}", args.device));
        }
    };

    tracing::info!(
        destination = %link.config().destination,
        json = args.json,
        "console ready, type a line to send it"
    );

    let mut terminal = Terminal::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => match line.context("Failed to read stdin")? {
                Some(line) => handle_line(&link, &line).await,
                None => break,
            },
            event = events.recv() => match event {
                Some(event) => print_event(&event, args.json, &mut terminal)?,
                None => {
                    tracing::warn!("Link reader stopped");
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    link.close().await?;
    Ok(())
}
