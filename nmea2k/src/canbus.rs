use socketcan::{CanSocket, EmbeddedFrame, Frame, Socket};
use std::io;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::frame_source::{FrameSource, RawFrame};
use crate::stream_reader::N2kStreamReader;

/// Opens a CAN socket with automatic retry on failure
///
/// Blocks until the interface comes up (e.g. "can0", "vcan0").
pub fn open_can_socket_with_retry(interface: &str) -> CanSocket {
    loop {
        match CanSocket::open(interface) {
            Ok(socket) => {
                info!("Successfully opened CAN interface: {}", interface);
                return socket;
            }
            Err(e) => {
                warn!("Failed to open CAN interface '{}': {}", interface, e);
                warn!("Retrying in 10 seconds...");
                std::thread::sleep(Duration::from_secs(10));
            }
        }
    }
}

/// Reads NMEA2000 messages from a live SocketCAN interface
pub struct CanBusSource {
    interface: String,
    socket: CanSocket,
    reader: N2kStreamReader,
}

impl CanBusSource {
    pub fn open(interface: &str) -> io::Result<Self> {
        let socket = open_can_socket_with_retry(interface);
        // Wake up periodically so the caller can run housekeeping with no bus activity
        socket.set_read_timeout(Duration::from_millis(500))?;
        Ok(Self {
            interface: interface.to_string(),
            socket,
            reader: N2kStreamReader::new(),
        })
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }
}

impl FrameSource for CanBusSource {
    fn read_frame(&mut self) -> io::Result<Option<RawFrame>> {
        loop {
            let frame = self.socket.read_frame()?;
            if !frame.is_extended() {
                debug!("Skipping standard CAN frame on {}", self.interface);
                continue;
            }
            // NMEA2000 uses 29-bit extended CAN identifiers
            let can_id = frame.can_id().as_raw();
            if let Some(message) = self.reader.process_frame(can_id, frame.data()) {
                return Ok(Some(message));
            }
        }
    }
}
