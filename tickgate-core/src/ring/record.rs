//! The 64-byte decision record
//!
//! Fixed little-endian wire layout, cache-line aligned, one record per
//! risk verdict:
//!
//! ```text
//! off  sz  field
//!  0    4  seq                 ITCH sequence of the triggering message
//!  4    4  reserved (=0)
//!  8    8  ts_ingress
//! 16    8  ts_decision
//! 24    2  symbol_index
//! 26    1  side                0=bid, 1=ask
//! 27    1  flags               bit0 accept, 1 stale, 2 price-band,
//!                              3 token, 4 position, 5 kill
//! 28    4  qty
//! 32    4  price
//! 36    4  ref_price
//! 40    4  feature0            ask − bid spread (unsigned, may wrap)
//! 44    4  feature1            bid_qty − ask_qty (signed)
//! 48    4  feature2            last_trade_px
//! 52    2  payload_crc16       CCITT over bytes 0..51, written last
//! 54    2  pad (=0)
//! 56    8  reserved (=0)
//! ```
//!
//! Encoding is explicit field-by-field little-endian, so records are
//! byte-identical across hosts regardless of native endianness.

use crate::risk::gate::flags;

/// Wire size of one record
pub const RECORD_SIZE: usize = 64;

/// CRC scope: bytes `[0..CRC_COVERED)` of the encoded record
const CRC_COVERED: usize = 52;

/// CRC-16-CCITT: poly 0x1021, init 0xFFFF, no reflection, no final xor.
pub fn crc16_ccitt(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ 0x1021
            } else {
                crc << 1
            };
        }
    }
    crc
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C, align(64))]
pub struct DecisionRecord {
    pub seq: u32,
    pub reserved0: u32,
    pub ts_ingress: u64,
    pub ts_decision: u64,
    pub symbol_index: u16,
    pub side: u8,
    pub flags: u8,
    pub qty: u32,
    pub price: u32,
    pub ref_price: u32,
    pub feature0: u32,
    pub feature1: i32,
    pub feature2: u32,
    pub payload_crc16: u16,
    pub pad: u16,
    pub reserved1: u64,
}

// The layout above must stay exactly one cache line.
const _: () = assert!(std::mem::size_of::<DecisionRecord>() == RECORD_SIZE);
const _: () = assert!(std::mem::align_of::<DecisionRecord>() == 64);

impl DecisionRecord {
    pub const fn zeroed() -> Self {
        Self {
            seq: 0,
            reserved0: 0,
            ts_ingress: 0,
            ts_decision: 0,
            symbol_index: 0,
            side: 0,
            flags: 0,
            qty: 0,
            price: 0,
            ref_price: 0,
            feature0: 0,
            feature1: 0,
            feature2: 0,
            payload_crc16: 0,
            pad: 0,
            reserved1: 0,
        }
    }

    /// Encode to the wire layout.
    pub fn encode(&self) -> [u8; RECORD_SIZE] {
        let mut buf = [0u8; RECORD_SIZE];
        buf[0..4].copy_from_slice(&self.seq.to_le_bytes());
        buf[4..8].copy_from_slice(&self.reserved0.to_le_bytes());
        buf[8..16].copy_from_slice(&self.ts_ingress.to_le_bytes());
        buf[16..24].copy_from_slice(&self.ts_decision.to_le_bytes());
        buf[24..26].copy_from_slice(&self.symbol_index.to_le_bytes());
        buf[26] = self.side;
        buf[27] = self.flags;
        buf[28..32].copy_from_slice(&self.qty.to_le_bytes());
        buf[32..36].copy_from_slice(&self.price.to_le_bytes());
        buf[36..40].copy_from_slice(&self.ref_price.to_le_bytes());
        buf[40..44].copy_from_slice(&self.feature0.to_le_bytes());
        buf[44..48].copy_from_slice(&self.feature1.to_le_bytes());
        buf[48..52].copy_from_slice(&self.feature2.to_le_bytes());
        buf[52..54].copy_from_slice(&self.payload_crc16.to_le_bytes());
        buf[54..56].copy_from_slice(&self.pad.to_le_bytes());
        buf[56..64].copy_from_slice(&self.reserved1.to_le_bytes());
        buf
    }

    /// Decode from the wire layout.
    pub fn decode(buf: &[u8; RECORD_SIZE]) -> Self {
        let le_u16 = |o: usize| u16::from_le_bytes([buf[o], buf[o + 1]]);
        let le_u32 = |o: usize| u32::from_le_bytes([buf[o], buf[o + 1], buf[o + 2], buf[o + 3]]);
        let le_u64 = |o: usize| {
            u64::from_le_bytes([
                buf[o],
                buf[o + 1],
                buf[o + 2],
                buf[o + 3],
                buf[o + 4],
                buf[o + 5],
                buf[o + 6],
                buf[o + 7],
            ])
        };
        Self {
            seq: le_u32(0),
            reserved0: le_u32(4),
            ts_ingress: le_u64(8),
            ts_decision: le_u64(16),
            symbol_index: le_u16(24),
            side: buf[26],
            flags: buf[27],
            qty: le_u32(28),
            price: le_u32(32),
            ref_price: le_u32(36),
            feature0: le_u32(40),
            feature1: le_u32(44) as i32,
            feature2: le_u32(48),
            payload_crc16: le_u16(52),
            pad: le_u16(54),
            reserved1: le_u64(56),
        }
    }

    /// CRC over the covered prefix of the encoded layout.
    pub fn compute_crc(&self) -> u16 {
        crc16_ccitt(&self.encode()[..CRC_COVERED])
    }

    /// Stamp `payload_crc16` from the current field values.
    #[inline]
    pub fn seal(&mut self) {
        self.payload_crc16 = self.compute_crc();
    }

    /// Verify the stored CRC against the field values.
    #[inline]
    pub fn crc_ok(&self) -> bool {
        self.payload_crc16 == self.compute_crc()
    }

    #[inline(always)]
    pub fn is_accept(&self) -> bool {
        self.flags & flags::ACCEPT != 0
    }

    #[inline(always)]
    pub fn is_stale(&self) -> bool {
        self.flags & flags::STALE != 0
    }

    /// Pipeline latency for this decision.
    #[inline(always)]
    pub fn latency_ns(&self) -> u64 {
        self.ts_decision.saturating_sub(self.ts_ingress)
    }
}

impl Default for DecisionRecord {
    fn default() -> Self {
        Self::zeroed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DecisionRecord {
        let mut rec = DecisionRecord {
            seq: 42,
            reserved0: 0,
            ts_ingress: 1_000,
            ts_decision: 2_345,
            symbol_index: 7,
            side: 1,
            flags: flags::ACCEPT,
            qty: 100,
            price: 1_502_500,
            ref_price: 1_500_000,
            feature0: 2_500,
            feature1: -25,
            feature2: 1_501_000,
            payload_crc16: 0,
            pad: 0,
            reserved1: 0,
        };
        rec.seal();
        rec
    }

    #[test]
    fn test_layout_is_one_cache_line() {
        assert_eq!(std::mem::size_of::<DecisionRecord>(), 64);
        assert_eq!(std::mem::align_of::<DecisionRecord>(), 64);
    }

    #[test]
    fn test_crc16_ccitt_check_value() {
        // Standard CRC-16/CCITT-FALSE check value for "123456789".
        assert_eq!(crc16_ccitt(b"123456789"), 0x29B1);
        assert_eq!(crc16_ccitt(b""), 0xFFFF);
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let rec = sample();
        let decoded = DecisionRecord::decode(&rec.encode());
        assert_eq!(decoded, rec);
    }

    #[test]
    fn test_field_offsets_on_wire() {
        let rec = sample();
        let buf = rec.encode();

        assert_eq!(u32::from_le_bytes(buf[0..4].try_into().unwrap()), 42);
        assert_eq!(u64::from_le_bytes(buf[8..16].try_into().unwrap()), 1_000);
        assert_eq!(u64::from_le_bytes(buf[16..24].try_into().unwrap()), 2_345);
        assert_eq!(u16::from_le_bytes(buf[24..26].try_into().unwrap()), 7);
        assert_eq!(buf[26], 1);
        assert_eq!(buf[27], flags::ACCEPT);
        assert_eq!(u32::from_le_bytes(buf[28..32].try_into().unwrap()), 100);
        assert_eq!(
            u32::from_le_bytes(buf[32..36].try_into().unwrap()),
            1_502_500
        );
        assert_eq!(
            i32::from_le_bytes(buf[44..48].try_into().unwrap()),
            -25
        );
        assert_eq!(
            u16::from_le_bytes(buf[52..54].try_into().unwrap()),
            rec.payload_crc16
        );
    }

    #[test]
    fn test_seal_and_verify() {
        let mut rec = sample();
        assert!(rec.crc_ok());

        // Any covered byte change invalidates the CRC.
        rec.price += 1;
        assert!(!rec.crc_ok());
        rec.seal();
        assert!(rec.crc_ok());
    }

    #[test]
    fn test_crc_ignores_trailing_pad() {
        let mut rec = sample();
        let crc = rec.payload_crc16;
        rec.reserved1 = u64::MAX;
        assert_eq!(rec.compute_crc(), crc);
    }

    #[test]
    fn test_latency_saturates() {
        let mut rec = DecisionRecord::zeroed();
        rec.ts_ingress = 100;
        rec.ts_decision = 60;
        assert_eq!(rec.latency_ns(), 0);

        rec.ts_decision = 160;
        assert_eq!(rec.latency_ns(), 60);
    }
}
