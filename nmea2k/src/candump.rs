//! Replay of `candump -l` / `candump -L` log files.
//!
//! Each line looks like `(1700000000.123456) can0 09F80110#0102030405060708`.
//! Only extended (8 hex digit) identifiers are NMEA2000 traffic.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use tracing::warn;

use crate::frame_source::{FrameSource, RawFrame};
use crate::stream_reader::N2kStreamReader;

#[derive(Debug, Clone, PartialEq)]
pub struct CandumpLine {
    pub timestamp: Option<f64>,
    pub interface: Option<String>,
    pub can_id: u32,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CandumpError {
    #[error("no ID#DATA token")]
    MissingFrame,
    #[error("not an extended identifier: {0}")]
    NotExtended(String),
    #[error("invalid hex in {0}")]
    BadHex(String),
    #[error("payload longer than 8 bytes: {0}")]
    TooLong(String),
}

fn parse_hex_bytes(hex: &str) -> Result<Vec<u8>, CandumpError> {
    if hex.len() % 2 != 0 {
        return Err(CandumpError::BadHex(hex.to_string()));
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            hex.get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| CandumpError::BadHex(hex.to_string()))
        })
        .collect()
}

pub fn parse_line(line: &str) -> Result<CandumpLine, CandumpError> {
    let mut timestamp = None;
    let mut interface = None;
    let mut frame = None;
    for token in line.split_whitespace() {
        if let Some(ts) = token.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
            timestamp = ts.parse::<f64>().ok();
        } else if token.contains('#') {
            frame = Some(token);
        } else if frame.is_none() {
            interface = Some(token.to_string());
        }
    }
    let frame = frame.ok_or(CandumpError::MissingFrame)?;
    let (id, hex) = frame.split_once('#').ok_or(CandumpError::MissingFrame)?;
    if id.len() != 8 {
        return Err(CandumpError::NotExtended(id.to_string()));
    }
    let can_id = u32::from_str_radix(id, 16).map_err(|_| CandumpError::BadHex(id.to_string()))?;
    let data = parse_hex_bytes(hex)?;
    if data.len() > 8 {
        return Err(CandumpError::TooLong(frame.to_string()));
    }
    Ok(CandumpLine {
        timestamp,
        interface,
        can_id: can_id & 0x1fff_ffff,
        data,
    })
}

/// Frame source backed by a candump log
pub struct CandumpSource<R: BufRead> {
    lines: io::Lines<R>,
    reader: N2kStreamReader,
    line_no: usize,
}

impl CandumpSource<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: BufRead> CandumpSource<R> {
    pub fn new(input: R) -> Self {
        Self {
            lines: input.lines(),
            reader: N2kStreamReader::new(),
            line_no: 0,
        }
    }
}

impl<R: BufRead> FrameSource for CandumpSource<R> {
    fn read_frame(&mut self) -> io::Result<Option<RawFrame>> {
        while let Some(line) = self.lines.next() {
            let line = line?;
            self.line_no += 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            match parse_line(trimmed) {
                Ok(parsed) => {
                    if let Some(frame) = self.reader.process_frame(parsed.can_id, &parsed.data) {
                        return Ok(Some(frame));
                    }
                }
                Err(e) => warn!("Skipping candump line {}: {}", self.line_no, e),
            }
        }
        Ok(None)
    }
}
