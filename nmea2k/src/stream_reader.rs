use nmea2000::FastPacket;
use std::collections::HashMap;

use crate::frame_source::RawFrame;
use crate::identifier;

// Key for tracking multi-frame messages: (PGN, Source)
type FastPacketKey = (u32, u8);

struct FastPacketBuffer {
    sequence: u8,
    next_frame: u8,
    data: Vec<u8>,
    total_len: usize,
}

impl FastPacketBuffer {
    fn new(sequence: u8, total_len: usize) -> Self {
        Self {
            sequence,
            next_frame: 1,
            data: Vec::with_capacity(total_len + 7),
            total_len,
        }
    }

    fn is_complete(&self) -> bool {
        self.data.len() >= self.total_len
    }

    fn take_complete_data(mut self) -> Vec<u8> {
        self.data.truncate(self.total_len);
        self.data
    }
}

/// NMEA2000 Stream Reader
///
/// Stateful reader for NMEA2000 CAN frames. It handles:
/// - Single-frame messages (returned immediately)
/// - Fast packet messages (assembled from multiple frames)
///
/// ```no_run
/// use nmea2k::N2kStreamReader;
///
/// let mut reader = N2kStreamReader::new();
/// # let (can_id, data) = (0u32, [0u8; 8]);
/// if let Some(frame) = reader.process_frame(can_id, &data) {
///     println!("PGN: {} {} bytes", frame.pgn(), frame.data.len());
/// }
/// ```
pub struct N2kStreamReader {
    fast_packet_buffers: HashMap<FastPacketKey, FastPacketBuffer>,
}

impl N2kStreamReader {
    pub fn new() -> Self {
        Self {
            fast_packet_buffers: HashMap::new(),
        }
    }

    /// Process a CAN frame and return a complete message if available
    pub fn process_frame(&mut self, can_id: u32, data: &[u8]) -> Option<RawFrame> {
        let pgn = identifier::pgn(can_id);
        if is_fast_packet_pgn(pgn) && data.len() == 8 {
            self.process_fast_packet(can_id, data)
        } else {
            Some(RawFrame::new(can_id, data.to_vec()))
        }
    }

    fn process_fast_packet(&mut self, can_id: u32, data: &[u8]) -> Option<RawFrame> {
        let mut packet_data = [0u8; 8];
        packet_data.copy_from_slice(data);
        let fast_packet = FastPacket(packet_data);

        let key = (identifier::pgn(can_id), identifier::source_address(can_id));
        let sequence = data[0] >> 5;
        let frame_no = data[0] & 0x1f;

        if fast_packet.is_first() {
            let total_len = fast_packet.total_len()? as usize;
            let mut buffer = FastPacketBuffer::new(sequence, total_len);
            buffer.data.extend_from_slice(&fast_packet.data()[..]);
            if buffer.is_complete() {
                self.fast_packet_buffers.remove(&key);
                return Some(RawFrame::new(can_id, buffer.take_complete_data()));
            }
            self.fast_packet_buffers.insert(key, buffer);
            return None;
        }

        let buffer = self.fast_packet_buffers.get_mut(&key)?;
        if buffer.sequence != sequence || buffer.next_frame != frame_no {
            // lost or reordered frame, wait for the next first frame
            self.fast_packet_buffers.remove(&key);
            return None;
        }
        buffer.data.extend_from_slice(&fast_packet.data()[..]);
        buffer.next_frame += 1;
        if buffer.is_complete() {
            let buffer = self.fast_packet_buffers.remove(&key)?;
            return Some(RawFrame::new(can_id, buffer.take_complete_data()));
        }
        None
    }
}

impl Default for N2kStreamReader {
    fn default() -> Self {
        Self::new()
    }
}

pub fn is_fast_packet_pgn(pgn: u32) -> bool {
    matches!(
        pgn,
        126996 | 127233 | 127237 | 127489 | 127493 | 127505 | 128275 | 129029 | 129038 | 129039
            | 129040 | 129041 | 129540 | 129794 | 129797 | 129809 | 129810
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_packet_frames(sequence: u8, payload: &[u8]) -> Vec<[u8; 8]> {
        let mut frames = Vec::new();
        let mut first = [0xffu8; 8];
        first[0] = sequence << 5;
        first[1] = payload.len() as u8;
        let head = payload.len().min(6);
        first[2..2 + head].copy_from_slice(&payload[..head]);
        frames.push(first);
        for (i, chunk) in payload[head..].chunks(7).enumerate() {
            let mut frame = [0xffu8; 8];
            frame[0] = (sequence << 5) | (i as u8 + 1);
            frame[1..1 + chunk.len()].copy_from_slice(chunk);
            frames.push(frame);
        }
        frames
    }

    #[test]
    fn test_single_frame_passes_through() {
        let mut reader = N2kStreamReader::new();
        let id = identifier::can_id(2, 129025, 0x10, 0xff);
        let frame = reader.process_frame(id, &[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        assert_eq!(frame.pgn(), 129025);
        assert_eq!(frame.data, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_fast_packet_assembly() {
        let mut reader = N2kStreamReader::new();
        let id = identifier::can_id(4, 129038, 0x2b, 0xff);
        let payload: Vec<u8> = (0..20).collect();
        let frames = fast_packet_frames(3, &payload);
        assert_eq!(frames.len(), 3);
        let mut result = None;
        for frame in &frames {
            result = reader.process_frame(id, frame);
        }
        let frame = result.unwrap();
        assert_eq!(frame.data, payload);
        assert_eq!(frame.source(), 0x2b);
    }

    #[test]
    fn test_fast_packet_missing_frame_is_dropped() {
        let mut reader = N2kStreamReader::new();
        let id = identifier::can_id(4, 129038, 0x2b, 0xff);
        let payload: Vec<u8> = (0..20).collect();
        let frames = fast_packet_frames(1, &payload);
        assert!(reader.process_frame(id, &frames[0]).is_none());
        assert!(reader.process_frame(id, &frames[2]).is_none());
        // the stale sequence was discarded, a fresh one still assembles
        let mut result = None;
        for frame in &fast_packet_frames(2, &payload) {
            result = reader.process_frame(id, frame);
        }
        assert_eq!(result.unwrap().data, payload);
    }
}
