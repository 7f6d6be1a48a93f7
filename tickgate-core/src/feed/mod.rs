//! Feed handling: frame intake, ITCH message splitter, typed decoder
//!
//! The three stages share one contract: bytes flow strictly forward,
//! failures become counters, and every message framed from a packet
//! inherits that packet's ingress timestamp.

pub mod decoder;
pub mod intake;
pub mod splitter;
pub mod types;

pub use decoder::decode;
pub use intake::FrameIntake;
pub use splitter::{MessageSplitter, SeqConfig, SplitStats};
pub use types::{DecodedMessage, RawFrame, MIN_HEADER_LEN};
