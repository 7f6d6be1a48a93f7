//! The six-check risk gate
//!
//! Every book event is evaluated against: kill switch, sequence-gap
//! staleness, price band, token bucket, position limit, and age
//! staleness. Checks are independent - each failing check sets its
//! record-flag bit - but the reported reason is the highest-priority
//! failure in that order.
//!
//! The gate performs no allocation, no blocking and no I/O; given
//! identical inputs, parameters and starting state it produces
//! identical verdicts.

use crate::book::BookEvent;

use super::params::RiskParams;
use super::token_bucket::TokenBucket;

/// Record flag bits, matching the decision-record wire layout
pub mod flags {
    pub const ACCEPT: u8 = 1 << 0;
    pub const STALE: u8 = 1 << 1;
    pub const PRICE_BAND_FAIL: u8 = 1 << 2;
    pub const TOKEN_FAIL: u8 = 1 << 3;
    pub const POSITION_FAIL: u8 = 1 << 4;
    pub const KILL_ACTIVE: u8 = 1 << 5;
}

/// Reject reasons, in reporting priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RejectReason {
    Kill = 0,
    StaleGap = 1,
    PriceBand = 2,
    Token = 3,
    Position = 4,
    StaleAge = 5,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::Kill => "kill switch active",
            RejectReason::StaleGap => "sequence gap staleness",
            RejectReason::PriceBand => "price band exceeded",
            RejectReason::Token => "token bucket empty",
            RejectReason::Position => "position limit exceeded",
            RejectReason::StaleAge => "event age exceeded threshold",
        }
    }
}

/// Outcome of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub accept: bool,
    /// Record flags byte (accept bit plus one bit per failing check)
    pub flags: u8,
    /// Highest-priority failing check, `None` on accept
    pub reason: Option<RejectReason>,
}

/// Data-path-owned gate state: the token bucket and the parameter
/// generation it was last armed for.
pub struct RiskGate {
    bucket: TokenBucket,
    armed_generation: u32,
}

impl RiskGate {
    pub fn new() -> Self {
        Self {
            bucket: TokenBucket::new(),
            armed_generation: 0,
        }
    }

    /// Tokens currently available (diagnostics).
    pub fn tokens(&self) -> u32 {
        self.bucket.available()
    }

    /// Evaluate one book event.
    ///
    /// `params_generation` comes from the shared parameter block; a new
    /// generation re-arms the token bucket to the new capacity before
    /// the checks run.
    pub fn evaluate(
        &mut self,
        event: &BookEvent,
        params: &RiskParams,
        params_generation: u32,
        ref_price: u32,
        now_ns: u64,
    ) -> Verdict {
        if params_generation != self.armed_generation {
            self.bucket.arm(params.token_bucket_max, now_ns);
            self.armed_generation = params_generation;
        }

        // 1. Kill switch
        let kill_fail = params.kill;

        // 2. Sequence-gap staleness (latched upstream)
        let gap_fail = event.stale;

        // 3. Price band against the reference price
        let band_fail = price_band_fails(
            event.tob.mid_price(),
            ref_price,
            params.price_band_bps,
        );

        // 4. Token bucket: replenish on entry, pass while nonempty
        self.bucket
            .replenish(now_ns, params.token_rate_per_ms, params.token_bucket_max);
        let token_fail = self.bucket.available() == 0;

        // 5. Position limit on aggregate TOB quantities
        let limit = params.position_limit.max(0) as u32;
        let position_fail = event.tob.bid_qty > limit || event.tob.ask_qty > limit;

        // 6. Age staleness
        let age_fail = now_ns.saturating_sub(event.book_ts) > params.stale_threshold_ns as u64;

        let mut bits = 0u8;
        if kill_fail {
            bits |= flags::KILL_ACTIVE;
        }
        if gap_fail || age_fail {
            bits |= flags::STALE;
        }
        if band_fail {
            bits |= flags::PRICE_BAND_FAIL;
        }
        if token_fail {
            bits |= flags::TOKEN_FAIL;
        }
        if position_fail {
            bits |= flags::POSITION_FAIL;
        }

        let reason = if kill_fail {
            Some(RejectReason::Kill)
        } else if gap_fail {
            Some(RejectReason::StaleGap)
        } else if band_fail {
            Some(RejectReason::PriceBand)
        } else if token_fail {
            Some(RejectReason::Token)
        } else if position_fail {
            Some(RejectReason::Position)
        } else if age_fail {
            Some(RejectReason::StaleAge)
        } else {
            None
        };

        let accept = reason.is_none();
        if accept {
            self.bucket.consume();
            bits |= flags::ACCEPT;
        }

        Verdict {
            accept,
            flags: bits,
            reason,
        }
    }
}

impl Default for RiskGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Band check: passes when no reference or no band is configured,
/// otherwise requires |mid − ref| · 10000 ≤ ref · band_bps. All
/// products in u64 so a full-scale price cannot overflow.
#[inline]
fn price_band_fails(mid: u32, ref_price: u32, band_bps: u16) -> bool {
    if ref_price == 0 || band_bps == 0 {
        return false;
    }
    let diff = (mid as u64).abs_diff(ref_price as u64);
    diff * 10_000 > (ref_price as u64) * (band_bps as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::BookEntry;
    use crate::core::Side;

    fn event(bid_px: u32, bid_qty: u32, ask_px: u32, ask_qty: u32, stale: bool) -> BookEvent {
        BookEvent {
            ingress_ts: 1_000,
            book_ts: 1_000,
            seq: 1,
            symbol_index: 0,
            side: Side::Bid,
            tob: BookEntry {
                bid_px,
                bid_qty,
                ask_px,
                ask_qty,
                last_trade_px: 0,
                last_trade_qty: 0,
                last_update_ts: 1_000,
                valid: true,
                last_side: Side::Bid,
            },
            stale,
            msg_type: b'A',
            bank_conflict: false,
        }
    }

    fn params() -> RiskParams {
        RiskParams {
            price_band_bps: 500,
            token_rate_per_ms: 1,
            token_bucket_max: 100,
            position_limit: 1_000_000,
            stale_threshold_ns: u32::MAX,
            seq_gap_threshold: 16,
            kill: false,
        }
    }

    fn eval(gate: &mut RiskGate, ev: &BookEvent, p: &RiskParams, ref_px: u32) -> Verdict {
        gate.evaluate(ev, p, 1, ref_px, 1_000)
    }

    #[test]
    fn test_clean_event_accepted() {
        let mut gate = RiskGate::new();
        let v = eval(&mut gate, &event(1_000_000, 100, 1_001_000, 100, false), &params(), 1_000_000);

        assert!(v.accept);
        assert_eq!(v.flags, flags::ACCEPT);
        assert_eq!(v.reason, None);
    }

    #[test]
    fn test_kill_rejects_and_outranks() {
        let mut gate = RiskGate::new();
        let mut p = params();
        p.kill = true;

        // Also trip the band so priority is observable.
        let v = eval(&mut gate, &event(2_000_000, 100, 0, 0, true), &p, 1_000_000);

        assert!(!v.accept);
        assert_eq!(v.reason, Some(RejectReason::Kill));
        assert_ne!(v.flags & flags::KILL_ACTIVE, 0);
        assert_ne!(v.flags & flags::STALE, 0);
        assert_ne!(v.flags & flags::PRICE_BAND_FAIL, 0);
        assert_eq!(v.flags & flags::ACCEPT, 0);
    }

    #[test]
    fn test_stale_gap_rejects() {
        let mut gate = RiskGate::new();
        let v = eval(&mut gate, &event(1_000_000, 100, 0, 0, true), &params(), 1_000_000);

        assert!(!v.accept);
        assert_eq!(v.reason, Some(RejectReason::StaleGap));
        assert_ne!(v.flags & flags::STALE, 0);
    }

    #[test]
    fn test_price_band_reject() {
        let mut gate = RiskGate::new();
        // One-sided book: mid = bid = 1.1M; |1.1M − 1.0M| · 10⁴ = 10⁹
        // vs 1.0M · 500 = 5·10⁸ → reject.
        let v = eval(&mut gate, &event(1_100_000, 100, 0, 0, false), &params(), 1_000_000);

        assert!(!v.accept);
        assert_eq!(v.reason, Some(RejectReason::PriceBand));
        assert_ne!(v.flags & flags::PRICE_BAND_FAIL, 0);
    }

    #[test]
    fn test_price_band_boundary_is_inclusive() {
        let mut gate = RiskGate::new();
        // Exactly 5% off a 1.0M reference with a 500 bps band: pass.
        let v = eval(&mut gate, &event(1_050_000, 100, 0, 0, false), &params(), 1_000_000);
        assert!(v.accept);
    }

    #[test]
    fn test_zero_reference_disables_band() {
        let mut gate = RiskGate::new();
        let v = eval(&mut gate, &event(9_000_000, 100, 0, 0, false), &params(), 0);
        assert!(v.accept);
    }

    #[test]
    fn test_zero_band_disables_check() {
        let mut gate = RiskGate::new();
        let mut p = params();
        p.price_band_bps = 0;
        let v = eval(&mut gate, &event(9_000_000, 100, 0, 0, false), &p, 1_000_000);
        assert!(v.accept);
    }

    #[test]
    fn test_token_exhaustion() {
        let mut gate = RiskGate::new();
        let mut p = params();
        p.token_bucket_max = 3;
        let ev = event(1_000_000, 100, 0, 0, false);

        for i in 0..3 {
            let v = gate.evaluate(&ev, &p, 1, 1_000_000, 1_000);
            assert!(v.accept, "accept {}", i);
        }
        let v = gate.evaluate(&ev, &p, 1, 1_000_000, 1_000);
        assert!(!v.accept);
        assert_eq!(v.reason, Some(RejectReason::Token));
        assert_ne!(v.flags & flags::TOKEN_FAIL, 0);
    }

    #[test]
    fn test_rejects_do_not_consume_tokens() {
        let mut gate = RiskGate::new();
        let mut p = params();
        p.token_bucket_max = 2;
        p.kill = true;

        let ev = event(1_000_000, 100, 0, 0, false);
        for _ in 0..10 {
            gate.evaluate(&ev, &p, 1, 1_000_000, 1_000);
        }

        p.kill = false;
        assert!(gate.evaluate(&ev, &p, 1, 1_000_000, 1_000).accept);
        assert!(gate.evaluate(&ev, &p, 1, 1_000_000, 1_000).accept);
        assert!(!gate.evaluate(&ev, &p, 1, 1_000_000, 1_000).accept);
    }

    #[test]
    fn test_tokens_replenish_over_time() {
        let mut gate = RiskGate::new();
        let mut p = params();
        p.token_bucket_max = 1;
        p.token_rate_per_ms = 1;
        let ev = event(1_000_000, 100, 0, 0, false);

        assert!(gate.evaluate(&ev, &p, 1, 0, 1_000).accept);
        assert!(!gate.evaluate(&ev, &p, 1, 0, 1_000).accept);

        // One millisecond later a token is back.
        assert!(gate.evaluate(&ev, &p, 1, 0, 1_001_000 + 1_000).accept);
    }

    #[test]
    fn test_position_limit() {
        let mut gate = RiskGate::new();
        let mut p = params();
        p.position_limit = 100;

        let v = eval(&mut gate, &event(1_000_000, 101, 0, 0, false), &p, 0);
        assert!(!v.accept);
        assert_eq!(v.reason, Some(RejectReason::Position));
        assert_ne!(v.flags & flags::POSITION_FAIL, 0);

        let v = eval(&mut gate, &event(1_000_000, 100, 0, 0, false), &p, 0);
        assert!(v.accept);
    }

    #[test]
    fn test_negative_position_limit_clamps_to_zero() {
        let mut gate = RiskGate::new();
        let mut p = params();
        p.position_limit = -5;

        let v = eval(&mut gate, &event(1_000_000, 1, 0, 0, false), &p, 0);
        assert!(!v.accept);
        assert_eq!(v.reason, Some(RejectReason::Position));
    }

    #[test]
    fn test_age_staleness() {
        let mut gate = RiskGate::new();
        let mut p = params();
        p.stale_threshold_ns = 500;

        let mut ev = event(1_000_000, 100, 0, 0, false);
        ev.book_ts = 1_000;

        // now − book_ts = 600 > 500
        let v = gate.evaluate(&ev, &p, 1, 0, 1_600);
        assert!(!v.accept);
        assert_eq!(v.reason, Some(RejectReason::StaleAge));
        assert_ne!(v.flags & flags::STALE, 0);
    }

    #[test]
    fn test_new_generation_rearms_bucket() {
        let mut gate = RiskGate::new();
        let mut p = params();
        p.token_bucket_max = 1;
        let ev = event(1_000_000, 100, 0, 0, false);

        assert!(gate.evaluate(&ev, &p, 1, 0, 1_000).accept);
        assert!(!gate.evaluate(&ev, &p, 1, 0, 1_000).accept);

        // Same params published again: bucket refills (generation 2).
        assert!(gate.evaluate(&ev, &p, 2, 0, 1_000).accept);
    }
}
