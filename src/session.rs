// Synchronous session used by the GUI event loop
//
// The GUI thread never runs async code itself: the session owns a small
// tokio runtime for the link's reader and blocks on it for sends and
// shutdown.

use crate::core::{DisplayUpdate, Terminal};
use crate::link::{Link, LinkConfig, LinkError, LinkEvent, LinkResult};
use crate::serial::{SerialConfig, SerialError, SerialPort, Transport};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

pub struct Session<T: Transport> {
    runtime: Runtime,
    link: Option<Link<T>>,
    events: mpsc::UnboundedReceiver<LinkEvent>,
    terminal: Terminal,
}

fn build_runtime() -> LinkResult<Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("piterm-link")
        .enable_all()
        .build()
        .map_err(|e| LinkError::Serial(SerialError::Io(e)))
}

impl Session<SerialPort> {
    /// Connect to `device` and start receiving
    pub fn open(device: &str, serial_config: SerialConfig, config: LinkConfig) -> LinkResult<Self> {
        Self::start_with(build_runtime()?, |rt| {
            let _guard = rt.enter();
            Link::connect(device, serial_config, config)
        })
    }
}

impl<T: Transport> Session<T> {
    /// Build a session from a link created inside `runtime`
    pub fn start_with<F>(runtime: Runtime, start: F) -> LinkResult<Self>
    where
        F: FnOnce(&Runtime) -> LinkResult<(Link<T>, mpsc::UnboundedReceiver<LinkEvent>)>,
    {
        let (link, events) = start(&runtime)?;
        Ok(Self {
            runtime,
            link: Some(link),
            events,
            terminal: Terminal::new(),
        })
    }

    pub fn terminal(&self) -> &Terminal {
        &self.terminal
    }

    pub fn is_open(&self) -> bool {
        self.link.is_some()
    }

    /// Apply pending link events and return the new pane text, if any
    pub fn poll(&mut self) -> Option<DisplayUpdate> {
        while let Ok(event) = self.events.try_recv() {
            self.terminal.handle_event(&event);
        }
        self.terminal.take_update()
    }

    /// Send the compose text as one packet
    pub fn send(&mut self, text: &str) -> LinkResult<Option<u8>> {
        let link = self.link.as_ref().ok_or(LinkError::Closed)?;
        let frame_id = self.runtime.block_on(link.send_packet(text.as_bytes()))?;
        tracing::debug!(len = text.len(), ?frame_id, "compose text sent");
        Ok(frame_id)
    }

    /// Empty both panes
    pub fn clear(&mut self) {
        self.terminal.clear();
    }

    /// Close the link and wait for its reader to finish
    pub fn shutdown(&mut self) -> LinkResult<()> {
        match self.link.take() {
            Some(link) => self.runtime.block_on(link.close()),
            None => Ok(()),
        }
    }
}

impl<T: Transport> Drop for Session<T> {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            tracing::warn!("session shutdown failed: {}", e);
        }
    }
}
