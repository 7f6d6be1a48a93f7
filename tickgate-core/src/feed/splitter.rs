//! ITCH message splitter: framing, sequence tracking, stale latch
//!
//! Consumes the concatenated payload stream and emits one frame per
//! message, in order, with no gaps or overlaps. Framing is driven
//! entirely by the static type/length table - the splitter never scans
//! for a plausible type byte. An unknown type is a desync: the
//! remainder of the packet is drained and framing resumes at the next
//! packet boundary.
//!
//! ## Sequence tracking
//!
//! Messages carry a 32-bit sequence at bytes [1..5]. The splitter keeps
//! `expected_seq`; a message ahead of it is a gap (counted, forwarded,
//! stale latch armed), a message behind it is a duplicate (counted,
//! dropped). The latch stays up until the stream runs
//! `seq_gap_threshold` messages past the gap without another gap, or
//! until the owner clears it.

use tracing::warn;

use super::types::{message_len, RawFrame, MAX_MSG_LEN};

/// Per-call sequence-checking configuration, sampled from the shared
/// risk parameters at packet granularity.
#[derive(Debug, Clone, Copy)]
pub struct SeqConfig {
    /// When false, frames are forwarded unchecked and the stale latch
    /// is never asserted by this stage.
    pub enabled: bool,
    /// In-order run length that clears the stale latch
    pub gap_threshold: u16,
}

impl Default for SeqConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            gap_threshold: 16,
        }
    }
}

/// Outcome of splitting one packet's worth of bytes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SplitStats {
    /// Bytes consumed from the front of the assembly buffer
    pub consumed: usize,
    /// Frames emitted
    pub frames: u32,
    /// Gap events detected
    pub gaps: u32,
    /// Duplicate messages dropped
    pub dupes: u32,
    /// Unknown type byte hit; caller must drop the packet remainder
    pub desync: bool,
}

/// Stateful splitter for one feed stream.
#[derive(Debug)]
pub struct MessageSplitter {
    expected_seq: u32,
    /// False until the first message adopts its sequence
    synced: bool,
    stale: bool,
    /// First sequence that clears the latch (valid while `stale`)
    stale_clear_seq: u32,
}

impl MessageSplitter {
    pub fn new() -> Self {
        Self {
            expected_seq: 0,
            synced: false,
            stale: false,
            stale_clear_seq: 0,
        }
    }

    /// Whether the stale latch is currently asserted.
    #[inline(always)]
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Clear the stale latch (configuration-channel request).
    #[inline]
    pub fn clear_stale(&mut self) {
        self.stale = false;
    }

    /// Next sequence number the splitter expects.
    #[inline(always)]
    pub fn expected_seq(&self) -> u32 {
        self.expected_seq
    }

    /// Frame as many complete messages as `data` holds.
    ///
    /// `emit` is invoked once per forwarded frame. On a desync the
    /// caller must discard its whole buffer (`SplitStats::consumed`
    /// is not meaningful past the failure point).
    pub fn split<F>(
        &mut self,
        data: &[u8],
        ingress_ts: u64,
        cfg: SeqConfig,
        mut emit: F,
    ) -> SplitStats
    where
        F: FnMut(RawFrame),
    {
        let mut stats = SplitStats::default();
        let mut off = 0usize;

        while off < data.len() {
            let msg_type = data[off];
            let len = match message_len(msg_type) {
                Some(len) => len,
                None => {
                    warn!(
                        msg_type,
                        offset = off,
                        "unknown ITCH type byte, dropping packet remainder"
                    );
                    stats.desync = true;
                    return stats;
                }
            };

            if off + len > data.len() {
                // Partial message: wait for the next payload.
                break;
            }

            let msg = &data[off..off + len];
            off += len;
            stats.consumed = off;

            let seq = u32::from_be_bytes([msg[1], msg[2], msg[3], msg[4]]);

            if cfg.enabled && self.synced {
                if seq > self.expected_seq {
                    // Gap: flag, latch, forward the message itself.
                    // The latch clears once the stream runs
                    // gap_threshold in-order messages past the gap.
                    stats.gaps += 1;
                    self.stale = true;
                    self.stale_clear_seq =
                        seq.wrapping_add(1).wrapping_add(cfg.gap_threshold as u32);
                    warn!(
                        expected = self.expected_seq,
                        got = seq,
                        missing = seq - self.expected_seq,
                        "sequence gap"
                    );
                } else if seq < self.expected_seq {
                    stats.dupes += 1;
                    continue;
                } else if self.stale && seq >= self.stale_clear_seq {
                    // Caught up: clear before this frame is emitted.
                    self.stale = false;
                }
            } else {
                // First message (or checking disabled): adopt the stream.
                self.synced = true;
                if !cfg.enabled {
                    self.stale = false;
                }
            }
            self.expected_seq = seq.wrapping_add(1);

            let mut buf = [0u8; MAX_MSG_LEN];
            buf[..len].copy_from_slice(msg);
            emit(RawFrame {
                msg_type,
                len: len as u8,
                seq,
                stale: self.stale,
                ingress_ts,
                data: buf,
            });
            stats.frames += 1;
        }

        stats
    }
}

impl Default for MessageSplitter {
    fn default() -> Self {
        Self::new()
    }
}
