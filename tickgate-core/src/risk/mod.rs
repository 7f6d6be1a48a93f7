//! Pre-trade risk gate
//!
//! Six independent checks applied to every book event, a process-global
//! token bucket, and the shared parameter block the configuration
//! thread updates with release stores.
//!
//! ```text
//! BookEvent → Kill → Stale(gap) → Price band → Tokens → Position → Stale(age)
//!              ✓ flag   ✓ latch     ✓ vs ref     ✓ >0     ✓ TOB qty   ✓ age
//! ```
//!
//! Accept means every check passed; the reported reject reason is the
//! highest-priority failing check, while the record flags carry one bit
//! per failing check.

pub mod gate;
pub mod params;
pub mod token_bucket;

pub use gate::{RejectReason, RiskGate, Verdict};
pub use params::{RiskParams, SharedRiskParams};
pub use token_bucket::TokenBucket;
