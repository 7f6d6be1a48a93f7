//! ITCH 5.0 message table and frame/decode value types
//!
//! Every ITCH message is a single type byte followed by a fixed,
//! type-dependent body. Bytes [1..5] carry the 32-bit big-endian
//! sequence number and bytes [5..11] the 48-bit venue timestamp, so the
//! smallest frameable message is 11 bytes.

use crate::core::Side;

/// Minimum ITCH header: type(1) + sequence(4) + timestamp(6)
pub const MIN_HEADER_LEN: usize = 11;

/// Largest message in the type table ('I', 50 bytes); frames are staged
/// in a 64-byte buffer, mirroring the width of the source's stream bus.
pub const MAX_MSG_LEN: usize = 64;

/// Total on-wire length (including the type byte) for a message type.
///
/// Returns `None` for unknown type bytes, which the splitter treats as
/// a framing desync.
#[inline(always)]
pub fn message_len(msg_type: u8) -> Option<usize> {
    Some(match msg_type {
        b'S' => 12, // System event
        b'R' => 39, // Stock directory
        b'H' => 25, // Trading action
        b'Y' => 20, // Reg SHO restriction
        b'L' => 26, // Market participant position
        b'V' => 35, // MWCB decline level
        b'W' => 12, // MWCB status
        b'K' => 28, // IPO quoting period
        b'J' => 35, // LULD auction collar
        b'h' => 21, // Operational halt
        b'A' => 36, // Add order
        b'F' => 40, // Add order with MPID
        b'E' => 31, // Order executed
        b'C' => 36, // Order executed with price
        b'X' => 23, // Order cancel
        b'D' => 19, // Order delete
        b'U' => 35, // Order replace
        b'P' => 44, // Trade (non-cross)
        b'Q' => 40, // Cross trade
        b'B' => 19, // Broken trade
        b'I' => 50, // Net order imbalance
        b'N' => 20, // Retail interest
        _ => return None,
    })
}

/// Whether a message type mutates top-of-book state.
#[inline(always)]
pub fn is_book_affecting(msg_type: u8) -> bool {
    matches!(
        msg_type,
        b'A' | b'F' | b'E' | b'C' | b'X' | b'D' | b'U' | b'P'
    )
}

/// Whether a message type carries the 8-byte symbol key.
#[inline(always)]
pub fn carries_symbol(msg_type: u8) -> bool {
    matches!(msg_type, b'A' | b'F' | b'P' | b'R')
}

/// One framed ITCH message, staged into a fixed buffer.
///
/// `Copy` by design: frames never outlive the packet scan that produced
/// them, and a 64-byte copy keeps the splitter free of borrow ties to
/// the assembly buffer.
#[derive(Debug, Clone, Copy)]
pub struct RawFrame {
    /// ITCH type byte
    pub msg_type: u8,
    /// Total message length (type byte included)
    pub len: u8,
    /// 32-bit sequence from bytes [1..5]
    pub seq: u32,
    /// Stale latch state at emission time
    pub stale: bool,
    /// Ingress timestamp of the carrying packet
    pub ingress_ts: u64,
    /// Message bytes; only `[..len]` is meaningful
    pub data: [u8; MAX_MSG_LEN],
}

impl RawFrame {
    /// The meaningful message bytes.
    #[inline(always)]
    pub fn bytes(&self) -> &[u8] {
        &self.data[..self.len as usize]
    }
}

/// Fully decoded message, ready for the book and the risk gate.
///
/// `side` is `None` for order-reference-only messages ('E','C','X','D',
/// 'U'); the book resolves those against the most recent add. For
/// messages without a symbol key, `symbol_valid` is false and
/// `symbol_index` is meaningless.
#[derive(Debug, Clone, Copy)]
pub struct DecodedMessage {
    pub ingress_ts: u64,
    pub decode_ts: u64,
    pub seq: u32,
    pub msg_type: u8,
    pub symbol_index: u16,
    pub symbol_valid: bool,
    pub side: Option<Side>,
    /// Fixed-point price when the message carries one, else 0
    pub price: u32,
    /// Shares: added, executed, cancelled or replaced, per type
    pub qty: u32,
    /// Order reference (original reference for 'U')
    pub order_id: u64,
    pub is_book_affecting: bool,
    pub stale: bool,
}
