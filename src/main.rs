// PITERM-RS main entry point
// Opens the link and launches the Qt terminal window

use anyhow::Context;
use clap::Parser;
use piterm_rs::cli::GuiArgs;
use piterm_rs::gui::run_qt_app;
use piterm_rs::serial::list_ports;
use piterm_rs::Session;

fn main() -> anyhow::Result<()> {
    let args = GuiArgs::parse();
    piterm_rs::logging::init();

    let cores = std::thread::available_parallelism().map_or(1, |n| n.get());
    tracing::info!("Cores: {}", cores);

    let session = Session::open(
        &args.device,
        args.link.serial_config(args.baud_rate),
        args.link.link_config(),
    )
    .map_err(|e| {
        if let Ok(ports) = list_ports() {
            tracing::info!("Available ports: {}", ports.join(", "));
        }
        e
    })
    .with_context(|| format!("Failed to open {}", args.device))?;

    tracing::info!(resolution = %args.resolution(), "starting GUI");
    let code = run_qt_app(session, args.resolution());

    std::process::exit(code)
}
