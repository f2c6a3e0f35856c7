//! Line protocol codec.
//!
//! # Wire Format
//! ```text
//! client → server:  PAYMENT|<amount>\n
//! server → client:  RESPONSE|<ACCEPTED|REJECTED>|<Reason>\n
//! ```
//!
//! # Design Decisions
//! - Stateless: parsing and rendering are pure functions over one frame
//! - Framing (splitting the byte stream on `\n`) belongs to the transport
//! - Reasons are capitalized at render time, so every producer gets the same shape

pub mod request;
pub mod response;

pub use request::{FrameError, PaymentRequest};
pub use response::{capitalize, Response, ResponseParseError, Status};

/// Field separator inside a frame.
pub const SEPARATOR: char = '|';
