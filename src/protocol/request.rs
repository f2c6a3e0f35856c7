//! Inbound `PAYMENT` frames.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::SEPARATOR;

/// Command token of the only supported request.
pub const PAYMENT_COMMAND: &str = "PAYMENT";

/// A frame that could not be turned into a request.
///
/// The `Display` text doubles as the rejection reason sent to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FrameError {
    /// Wrong field count or command token.
    #[error("invalid request")]
    MalformedFrame,
    /// Right shape, but the amount is not a base-10 integer.
    #[error("invalid amount")]
    MalformedAmount,
}

/// A parsed payment request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PaymentRequest {
    pub amount: i64,
}

impl PaymentRequest {
    pub fn new(amount: i64) -> Self {
        Self { amount }
    }

    /// Parse one frame (without its line terminator).
    pub fn parse(line: &str) -> Result<Self, FrameError> {
        let mut fields = line.split(SEPARATOR);
        let (Some(command), Some(amount), None) = (fields.next(), fields.next(), fields.next())
        else {
            return Err(FrameError::MalformedFrame);
        };
        if command != PAYMENT_COMMAND {
            return Err(FrameError::MalformedFrame);
        }

        let amount = amount.parse().map_err(|_| FrameError::MalformedAmount)?;
        Ok(Self { amount })
    }
}

impl FromStr for PaymentRequest {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PaymentRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PAYMENT_COMMAND}{SEPARATOR}{}", self.amount)
    }
}
