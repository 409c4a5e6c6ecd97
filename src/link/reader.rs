// Background reader: turns bytes from the port into link events

use super::event::{LinkEvent, ReceivedPacket};
use super::LinkMode;
use crate::core::constants::READ_CHUNK;
use crate::serial::{SerialError, Transport};
use crate::xbee::{ApiFrame, FrameDecoder};
use tokio::sync::{mpsc, watch};

/// Decode one chunk of inbound bytes into events
pub(crate) fn chunk_events(decoder: Option<&mut FrameDecoder>, chunk: &[u8]) -> Vec<LinkEvent> {
    let Some(decoder) = decoder else {
        return vec![LinkEvent::Received(ReceivedPacket::raw(chunk.to_vec()))];
    };

    decoder
        .decode(chunk)
        .into_iter()
        .filter_map(|result| match result.and_then(|data| ApiFrame::parse(&data)) {
            Ok(frame) => {
                tracing::trace!(name = frame.name(), "frame received");
                LinkEvent::from_frame(frame)
            }
            Err(e) => {
                tracing::warn!("dropping bad frame: {}", e);
                Some(LinkEvent::error(e.to_string()))
            }
        })
        .collect()
}

/// Read until shutdown is signalled, the event receiver goes away, or the
/// port fails
pub(crate) async fn run<T: Transport>(
    mut port: T,
    mode: LinkMode,
    events: mpsc::UnboundedSender<LinkEvent>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut decoder = match mode {
        LinkMode::Serial => None,
        LinkMode::Xbee { escaped } => Some(FrameDecoder::new(escaped)),
    };
    let mut buf = [0u8; READ_CHUNK];

    tracing::debug!(?mode, "reader started");

    loop {
        if *shutdown.borrow() {
            break;
        }

        let result = tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() {
                    // Link dropped without closing
                    break;
                }
                continue;
            }
            result = port.read(&mut buf) => result,
        };

        match result {
            Ok(0) => {
                tracing::error!("read returned no data, port closed");
                let _ = events.send(LinkEvent::error("Read error: Port closed"));
                break;
            }
            Ok(n) => {
                for event in chunk_events(decoder.as_mut(), &buf[..n]) {
                    if events.send(event).is_err() {
                        tracing::debug!("event receiver gone, reader stopping");
                        return;
                    }
                }
            }
            Err(SerialError::Timeout(_)) => tokio::task::yield_now().await,
            Err(e) => {
                tracing::error!("read failed: {}", e);
                let _ = events.send(LinkEvent::error(format!("Read error: {}", e)));
                break;
            }
        }
    }

    tracing::debug!("reader stopped");
}
