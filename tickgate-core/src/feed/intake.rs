//! Frame intake: per-stream assembly buffer
//!
//! The intake receives raw UDP payloads with their ingress timestamps
//! and maintains the byte stream the splitter frames messages from. A
//! message may straddle two payloads; the unconsumed tail stays
//! buffered until the next payload arrives.
//!
//! Payloads shorter than the minimum ITCH header are dropped whole -
//! no partial state leaks across the call boundary.

use super::types::MIN_HEADER_LEN;

/// Assembly buffer for one feed stream.
#[derive(Debug, Default)]
pub struct FrameIntake {
    buf: Vec<u8>,
}

impl FrameIntake {
    pub fn new() -> Self {
        // One MTU of headroom; the buffer never grows past
        // carry-over (< one message) plus one payload.
        Self {
            buf: Vec::with_capacity(2048),
        }
    }

    /// Append a payload to the stream.
    ///
    /// Returns false (payload dropped, nothing buffered) when the
    /// payload is shorter than the minimum ITCH header.
    #[inline]
    pub fn on_payload(&mut self, bytes: &[u8]) -> bool {
        if bytes.len() < MIN_HEADER_LEN {
            return false;
        }
        self.buf.extend_from_slice(bytes);
        true
    }

    /// Bytes currently awaiting framing.
    #[inline(always)]
    pub fn buffered(&self) -> &[u8] {
        &self.buf
    }

    /// Discard the first `n` framed bytes, keeping any partial tail.
    #[inline]
    pub fn consume(&mut self, n: usize) {
        debug_assert!(n <= self.buf.len());
        self.buf.drain(..n);
    }

    /// Drop everything buffered (framing desync recovery).
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }
}
