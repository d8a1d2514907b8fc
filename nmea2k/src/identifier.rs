//! Decomposition of the 29-bit NMEA2000 CAN identifier.
//!
//! Layout: 3-bit priority, 18-bit PGN (data page + PDU format + PDU specific)
//! and an 8-bit source address. For PDU1 formats (PF < 240) the PDU specific
//! byte carries a destination address and is not part of the PGN.

use nmea2000::Identifier;
use socketcan::ExtendedId;

pub const DESTINATION_BROADCAST: u8 = 0xff;

const PDU2_THRESHOLD: u32 = 240;

const EXTENDED_ID_MASK: u32 = 0x1fff_ffff;

fn pdu_format(can_id: u32) -> u32 {
    (can_id >> 16) & 0xff
}

/// The bus identifier, any bits above the 29-bit range dropped
pub fn identifier(can_id: u32) -> Option<Identifier> {
    ExtendedId::new(can_id & EXTENDED_ID_MASK).map(Identifier::from_can_id)
}

/// Parameter group number carried by the identifier.
#[inline]
pub fn pgn(can_id: u32) -> u32 {
    let pgn = identifier(can_id).map_or(0, Identifier::pgn);
    if pdu_format(can_id) < PDU2_THRESHOLD {
        pgn & 0x3ff00
    } else {
        pgn
    }
}

#[inline]
pub fn source_address(can_id: u32) -> u8 {
    identifier(can_id).map_or(0, Identifier::source)
}

#[inline]
pub fn priority(can_id: u32) -> u8 {
    identifier(can_id).map_or(0, Identifier::priority)
}

/// Destination address, broadcast for PDU2 messages.
#[inline]
pub fn destination(can_id: u32) -> u8 {
    if pdu_format(can_id) < PDU2_THRESHOLD {
        ((can_id >> 8) & 0xff) as u8
    } else {
        DESTINATION_BROADCAST
    }
}

/// Compose an identifier. The destination is ignored for PDU2 PGNs.
pub fn can_id(priority: u8, pgn: u32, source: u8, destination: u8) -> u32 {
    let base = ((priority as u32 & 0x7) << 26) | ((pgn & 0x3ffff) << 8) | source as u32;
    if ((pgn >> 8) & 0xff) < PDU2_THRESHOLD {
        (base & !0xff00) | ((destination as u32) << 8)
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdu2_decomposition() {
        // 0x09F80110: priority 2, PGN 129025, source 0x10
        let id = 0x09F8_0110;
        assert_eq!(pgn(id), 129025);
        assert_eq!(source_address(id), 0x10);
        assert_eq!(priority(id), 2);
        assert_eq!(destination(id), DESTINATION_BROADCAST);
    }

    #[test]
    fn test_pdu1_masks_destination() {
        // ISO request (PGN 59904) addressed to 0x23 from 0x05
        let id = can_id(6, 59904, 0x05, 0x23);
        assert_eq!(pgn(id), 59904);
        assert_eq!(destination(id), 0x23);
        assert_eq!(source_address(id), 0x05);
    }

    #[test]
    fn test_compose_round_trip() {
        let id = can_id(3, 129038, 0x2a, 0);
        assert_eq!(pgn(id), 129038);
        assert_eq!(source_address(id), 0x2a);
        assert_eq!(priority(id), 3);
    }

    #[test]
    fn test_bits_above_29_are_ignored() {
        let id = 0x09F8_0110 | 0x8000_0000;
        assert_eq!(pgn(id), 129025);
        assert_eq!(priority(id), 2);
        assert_eq!(identifier(id).map(|i| i.source()), Some(0x10));
    }

    #[test]
    fn test_gnss_and_time_ids_share_source() {
        assert_eq!(pgn(234358032), 129029);
        assert_eq!(pgn(234359056), 129033);
        assert_eq!(source_address(234358032), source_address(234359056));
    }
}
