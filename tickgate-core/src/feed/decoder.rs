//! Typed ITCH message decoder
//!
//! Converts a framed message into a [`DecodedMessage`], resolving the
//! symbol key against the active symbol map for the types that carry
//! one ('A', 'F', 'P', 'R'). All multi-byte fields are big-endian on
//! the wire; they are converted to host order here and nowhere else.
//!
//! Order-reference-only messages ('E','C','X','D','U') leave `side`
//! unset and `symbol_valid` false - the book resolves them against the
//! most recently referenced symbol (aggregate top-of-book model).

use crate::core::Side;
use crate::symbols::SymbolTable;

use super::types::{carries_symbol, is_book_affecting, DecodedMessage, RawFrame};

#[inline(always)]
fn be_u32(b: &[u8]) -> u32 {
    u32::from_be_bytes([b[0], b[1], b[2], b[3]])
}

#[inline(always)]
fn be_u64(b: &[u8]) -> u64 {
    u64::from_be_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
}

/// Decode one framed message.
///
/// The splitter guarantees the frame length matches the type table, so
/// field offsets are always in bounds.
pub fn decode(frame: &RawFrame, symbols: &SymbolTable, decode_ts: u64) -> DecodedMessage {
    let msg = frame.bytes();

    let mut out = DecodedMessage {
        ingress_ts: frame.ingress_ts,
        decode_ts,
        seq: frame.seq,
        msg_type: frame.msg_type,
        symbol_index: 0,
        symbol_valid: false,
        side: None,
        price: 0,
        qty: 0,
        order_id: 0,
        is_book_affecting: is_book_affecting(frame.msg_type),
        stale: frame.stale,
    };

    // Body layout after the common header (type, seq[1..5], ts[5..11]):
    match frame.msg_type {
        b'A' | b'F' => {
            // order_ref(8) side(1) shares(4) stock(8) price(4) [mpid(4)]
            out.order_id = be_u64(&msg[11..19]);
            out.side = Some(Side::from_itch(msg[19]));
            out.qty = be_u32(&msg[20..24]);
            out.price = be_u32(&msg[32..36]);
        }
        b'E' => {
            // order_ref(8) executed_shares(4) match(8)
            out.order_id = be_u64(&msg[11..19]);
            out.qty = be_u32(&msg[19..23]);
        }
        b'C' => {
            // order_ref(8) executed_shares(4) match(8) printable(1) price(4)
            out.order_id = be_u64(&msg[11..19]);
            out.qty = be_u32(&msg[19..23]);
            out.price = be_u32(&msg[32..36]);
        }
        b'X' => {
            // order_ref(8) cancelled_shares(4)
            out.order_id = be_u64(&msg[11..19]);
            out.qty = be_u32(&msg[19..23]);
        }
        b'D' => {
            // order_ref(8)
            out.order_id = be_u64(&msg[11..19]);
        }
        b'U' => {
            // orig_ref(8) new_ref(8) shares(4) price(4)
            out.order_id = be_u64(&msg[11..19]);
            out.qty = be_u32(&msg[27..31]);
            out.price = be_u32(&msg[31..35]);
        }
        b'P' => {
            // order_ref(8) side(1) shares(4) stock(8) price(4) match(8)
            out.order_id = be_u64(&msg[11..19]);
            out.side = Some(Side::from_itch(msg[19]));
            out.qty = be_u32(&msg[20..24]);
            out.price = be_u32(&msg[32..36]);
        }
        // Non-book messages need no field extraction beyond the symbol
        // lookup below ('R') - the pipeline only counts them.
        _ => {}
    }

    if carries_symbol(frame.msg_type) {
        let key = symbol_key(frame);
        if let Some(index) = symbols.lookup(&key) {
            out.symbol_index = index;
            out.symbol_valid = true;
        }
    }

    out
}

/// Extract the 8-byte symbol key for a symbol-bearing type.
#[inline]
fn symbol_key(frame: &RawFrame) -> [u8; 8] {
    let msg = frame.bytes();
    // 'R' carries the stock immediately after the header; 'A'/'F'/'P'
    // carry it after order_ref + side + shares.
    let off = if frame.msg_type == b'R' { 11 } else { 24 };
    let mut key = [0u8; 8];
    key.copy_from_slice(&msg[off..off + 8]);
    key
}
