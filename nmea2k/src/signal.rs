use std::fmt;

use crate::catalog::{SignalDescriptor, SignalFormat, ValueType};

/// A decoded signal value
#[derive(Debug, Clone, PartialEq)]
pub enum SignalValue {
    Number(f64),
    Integer(i64),
    Text(String),
    Bytes(Vec<u8>),
}

impl SignalValue {
    pub fn kind(&self) -> &'static str {
        match self {
            SignalValue::Number(_) => "number",
            SignalValue::Integer(_) => "integer",
            SignalValue::Text(_) => "text",
            SignalValue::Bytes(_) => "bytes",
        }
    }
}

impl fmt::Display for SignalValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SignalValue::Number(v) => write!(f, "{}", v),
            SignalValue::Integer(v) => write!(f, "{}", v),
            SignalValue::Text(v) => write!(f, "\"{}\"", v),
            SignalValue::Bytes(v) => {
                for b in v {
                    write!(f, "{:02X}", b)?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignalError {
    #[error("signal {name} (bits {start}..{end}) exceeds payload of {payload} bytes")]
    OutOfRange {
        name: String,
        start: usize,
        end: usize,
        payload: usize,
    },
    #[error("signal {name} has unsupported length {length}")]
    BadLength { name: String, length: u16 },
}

/// Extract `length` bits (1..=64) starting at `start_bit`, little-endian
/// (Intel) bit numbering. Returns None if the field runs past the payload.
pub fn extract_bits(data: &[u8], start_bit: usize, length: usize) -> Option<u64> {
    if length == 0 || length > 64 || start_bit + length > data.len() * 8 {
        return None;
    }
    let mut result: u64 = 0;
    for i in 0..length {
        let bit_pos = start_bit + i;
        let bit = (data[bit_pos / 8] >> (bit_pos % 8)) & 0x01;
        result |= (bit as u64) << i;
    }
    Some(result)
}

pub fn sign_extend(raw: u64, length: usize) -> i64 {
    if length >= 64 {
        return raw as i64;
    }
    let shift = 64 - length;
    ((raw << shift) as i64) >> shift
}

fn is_not_available(raw: u64, length: usize, value_type: ValueType) -> bool {
    if length <= 1 {
        return false;
    }
    match value_type {
        ValueType::Unsigned => raw == u64::MAX >> (64 - length),
        ValueType::Signed => {
            let value = sign_extend(raw, length);
            let max = (i64::MAX as u64 >> (64 - length)) as i64;
            value == max || value == -max - 1
        }
    }
}

fn trim_padding(bytes: &[u8]) -> String {
    let end = bytes
        .iter()
        .rposition(|&b| !matches!(b, b'@' | b' ' | 0x00 | 0xff))
        .map_or(0, |p| p + 1);
    bytes[..end]
        .iter()
        .map(|&b| if b.is_ascii() { b as char } else { '?' })
        .collect()
}

fn byte_run<'a>(sd: &SignalDescriptor, data: &'a [u8]) -> Result<&'a [u8], SignalError> {
    let start = sd.start_bit as usize;
    let out_of_range = |end: usize| SignalError::OutOfRange {
        name: sd.name.clone(),
        start,
        end,
        payload: data.len(),
    };
    if start % 8 != 0 || sd.length % 8 != 0 {
        return Err(SignalError::BadLength {
            name: sd.name.clone(),
            length: sd.length,
        });
    }
    let first = start / 8;
    if first > data.len() {
        return Err(out_of_range(start));
    }
    if sd.length == 0 {
        return Ok(&data[first..]);
    }
    let last = first + sd.length as usize / 8;
    if last > data.len() {
        return Err(out_of_range(last * 8));
    }
    Ok(&data[first..last])
}

fn string_lau(sd: &SignalDescriptor, data: &[u8]) -> Result<String, SignalError> {
    let run = byte_run(sd, data)?;
    // length byte counts itself and the encoding byte
    let Some(&len) = run.first() else {
        return Ok(String::new());
    };
    let len = len as usize;
    if len <= 2 {
        return Ok(String::new());
    }
    if len > run.len() {
        return Err(SignalError::OutOfRange {
            name: sd.name.clone(),
            start: sd.start_bit as usize,
            end: sd.start_bit as usize + len * 8,
            payload: data.len(),
        });
    }
    Ok(trim_padding(&run[2..len]))
}

/// Decode one signal out of a complete (reassembled) payload
pub fn decode(sd: &SignalDescriptor, data: &[u8]) -> Result<SignalValue, SignalError> {
    match sd.format {
        SignalFormat::Ascii => byte_run(sd, data).map(|run| SignalValue::Text(trim_padding(run))),
        SignalFormat::StringLau => string_lau(sd, data).map(SignalValue::Text),
        SignalFormat::Binary => byte_run(sd, data).map(|run| SignalValue::Bytes(run.to_vec())),
        SignalFormat::Number | SignalFormat::Integer => {
            let start = sd.start_bit as usize;
            let length = sd.length as usize;
            if length == 0 || length > 64 {
                return Err(SignalError::BadLength {
                    name: sd.name.clone(),
                    length: sd.length,
                });
            }
            let raw = extract_bits(data, start, length).ok_or_else(|| SignalError::OutOfRange {
                name: sd.name.clone(),
                start,
                end: start + length,
                payload: data.len(),
            })?;
            let value = match sd.value_type {
                ValueType::Unsigned => raw as i64,
                ValueType::Signed => sign_extend(raw, length),
            };
            if sd.format == SignalFormat::Integer {
                return Ok(SignalValue::Integer(value));
            }
            if is_not_available(raw, length, sd.value_type) {
                return Ok(SignalValue::Number(f64::NAN));
            }
            let physical = match sd.value_type {
                ValueType::Unsigned => raw as f64 * sd.scale,
                ValueType::Signed => value as f64 * sd.scale,
            };
            Ok(SignalValue::Number(physical))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MessageCatalog;
    use approx::assert_abs_diff_eq;

    fn number(value: SignalValue) -> f64 {
        match value {
            SignalValue::Number(v) => v,
            other => panic!("not a number: {:?}", other),
        }
    }

    #[test]
    fn test_extract_bits_across_bytes() {
        let data = [0b1010_0000, 0b0000_0101];
        assert_eq!(extract_bits(&data, 5, 6), Some(0b101101));
        assert_eq!(extract_bits(&data, 12, 8), None);
    }

    #[test]
    fn test_extract_full_word() {
        let data = (-5i64).to_le_bytes();
        let raw = extract_bits(&data, 0, 64).unwrap();
        assert_eq!(sign_extend(raw, 64), -5);
    }

    #[test]
    fn test_sign_extend() {
        assert_eq!(sign_extend(0xffff, 16), -1);
        assert_eq!(sign_extend(0x7fff, 16), 32767);
        assert_eq!(sign_extend(0b10, 2), -2);
    }

    #[test]
    fn test_decode_position_rapid_update() {
        let catalog = MessageCatalog::builtin();
        let mut data = Vec::new();
        data.extend_from_slice(&601_000_000i32.to_le_bytes());
        data.extend_from_slice(&(-245_000_000i32).to_le_bytes());
        let lat = number(decode(catalog.signal(129025, "Latitude").unwrap(), &data).unwrap());
        let lon = number(decode(catalog.signal(129025, "Longitude").unwrap(), &data).unwrap());
        assert_abs_diff_eq!(lat, 60.1, epsilon = 1e-9);
        assert_abs_diff_eq!(lon, -24.5, epsilon = 1e-9);
    }

    #[test]
    fn test_not_available_is_nan() {
        let catalog = MessageCatalog::builtin();
        let data = [0x01, 0xff, 0xff, 0xff, 0xff, 0x00, 0x00, 0xff];
        let depth = number(decode(catalog.signal(128267, "Water_Depth_Transducer").unwrap(), &data).unwrap());
        assert!(depth.is_nan());
        let offset = number(decode(catalog.signal(128267, "Offset").unwrap(), &data).unwrap());
        assert_eq!(offset, 0.0);
        let sid = decode(catalog.signal(128267, "Sid").unwrap(), &data).unwrap();
        assert_eq!(sid, SignalValue::Integer(1));
    }

    #[test]
    fn test_signed_extremes_are_not_available() {
        let catalog = MessageCatalog::builtin();
        let sd = catalog.signal(127257, "Pitch").unwrap();
        let mut data = [0u8; 8];
        data[3..5].copy_from_slice(&i16::MAX.to_le_bytes());
        assert!(number(decode(sd, &data).unwrap()).is_nan());
        data[3..5].copy_from_slice(&i16::MIN.to_le_bytes());
        assert!(number(decode(sd, &data).unwrap()).is_nan());
        data[3..5].copy_from_slice(&(-1000i16).to_le_bytes());
        assert_abs_diff_eq!(number(decode(sd, &data).unwrap()), -0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_out_of_range() {
        let catalog = MessageCatalog::builtin();
        let err = decode(catalog.signal(129025, "Longitude").unwrap(), &[0u8; 6]).unwrap_err();
        assert!(matches!(err, SignalError::OutOfRange { payload: 6, .. }));
    }

    #[test]
    fn test_ascii_trims_padding() {
        let catalog = MessageCatalog::builtin();
        let sd = catalog.signal(129810, "Call_Sign").unwrap();
        let mut data = vec![0u8; 35];
        data[13..20].copy_from_slice(b"OH2X@@@");
        assert_eq!(decode(sd, &data).unwrap(), SignalValue::Text("OH2X".to_string()));
        data[13..20].copy_from_slice(&[b'S', b'Y', 0xff, 0xff, 0xff, 0xff, 0xff]);
        assert_eq!(decode(sd, &data).unwrap(), SignalValue::Text("SY".to_string()));
    }

    #[test]
    fn test_string_lau() {
        let catalog = MessageCatalog::builtin();
        let sd = catalog.signal(129041, "Name").unwrap();
        let mut data = vec![0u8; 26];
        data.extend_from_slice(&[7, 1, b'B', b'U', b'O', b'Y', b' ']);
        assert_eq!(decode(sd, &data).unwrap(), SignalValue::Text("BUOY".to_string()));
    }

    #[test]
    fn test_binary_to_end() {
        let catalog = MessageCatalog::builtin();
        let sd = catalog.signal(129797, "Binary_Data").unwrap();
        let data = [0, 0, 0, 0, 0, 0, 16, 0, 0xAB, 0xCD];
        assert_eq!(decode(sd, &data).unwrap(), SignalValue::Bytes(vec![0xAB, 0xCD]));
    }
}
