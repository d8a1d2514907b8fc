use std::io;

/// A complete NMEA2000 message: 29-bit identifier and its (reassembled) payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    pub can_id: u32,
    pub data: Vec<u8>,
}

impl RawFrame {
    pub fn new(can_id: u32, data: Vec<u8>) -> Self {
        Self { can_id, data }
    }

    pub fn pgn(&self) -> u32 {
        crate::identifier::pgn(self.can_id)
    }

    pub fn source(&self) -> u8 {
        crate::identifier::source_address(self.can_id)
    }
}

/// Trait for producers of NMEA2000 messages
///
/// Implementations deliver complete messages in arrival order. `Ok(None)`
/// signals the end of the stream; timeouts surface as `WouldBlock` or
/// `TimedOut` errors so the caller can do housekeeping between frames.
pub trait FrameSource {
    fn read_frame(&mut self) -> io::Result<Option<RawFrame>>;
}
