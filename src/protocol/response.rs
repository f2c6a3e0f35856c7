//! Outbound `RESPONSE` frames.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::request::FrameError;
use super::SEPARATOR;
use crate::processing::ServiceError;

/// Leading token of every response frame.
pub const RESPONSE_PREFIX: &str = "RESPONSE";

/// Reason sent when a request is processed successfully.
pub const REASON_PROCESSED: &str = "Transaction processed";

/// Reason sent when shutdown overtakes a request.
pub const REASON_CANCELLED: &str = "Cancelled";

/// Reason sent when processing died without producing a result.
pub const REASON_INTERNAL: &str = "Internal error";

/// Outcome of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Status {
    #[default]
    Accepted,
    Rejected,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Accepted => "ACCEPTED",
            Status::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A response frame.
///
/// The default value is `Accepted` with an empty reason and renders as
/// `RESPONSE|ACCEPTED|`. Nothing in the server produces it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Response {
    pub status: Status,
    pub reason: String,
}

impl Response {
    pub fn new(status: Status, reason: impl Into<String>) -> Self {
        Self {
            status,
            reason: reason.into(),
        }
    }

    pub fn accepted() -> Self {
        Self::new(Status::Accepted, REASON_PROCESSED)
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::new(Status::Rejected, reason)
    }

    pub fn cancelled() -> Self {
        Self::rejected(REASON_CANCELLED)
    }

    pub fn internal_error() -> Self {
        Self::rejected(REASON_INTERNAL)
    }

    pub fn is_accepted(&self) -> bool {
        self.status == Status::Accepted
    }

    /// Wire form including the `\n` terminator.
    pub fn to_frame(&self) -> String {
        format!("{self}\n")
    }
}

impl From<&FrameError> for Response {
    fn from(err: &FrameError) -> Self {
        Self::rejected(err.to_string())
    }
}

impl From<&ServiceError> for Response {
    fn from(err: &ServiceError) -> Self {
        Self::rejected(err.to_string())
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{RESPONSE_PREFIX}{SEPARATOR}{}{SEPARATOR}{}",
            self.status,
            capitalize(&self.reason)
        )
    }
}

/// A line that is not a well-formed response frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResponseParseError {
    #[error("missing RESPONSE prefix")]
    MissingPrefix,
    #[error("unknown status {0:?}")]
    UnknownStatus(String),
    #[error("missing reason field")]
    MissingReason,
}

impl FromStr for Response {
    type Err = ResponseParseError;

    /// Parse a response line; the reason is everything after the second separator.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_end_matches(['\r', '\n']);
        let mut fields = line.splitn(3, SEPARATOR);
        if fields.next() != Some(RESPONSE_PREFIX) {
            return Err(ResponseParseError::MissingPrefix);
        }
        let status = match fields.next() {
            Some("ACCEPTED") => Status::Accepted,
            Some("REJECTED") => Status::Rejected,
            other => {
                return Err(ResponseParseError::UnknownStatus(
                    other.unwrap_or_default().to_string(),
                ))
            }
        };
        let reason = fields.next().ok_or(ResponseParseError::MissingReason)?;
        Ok(Self::new(status, reason))
    }
}

/// Upper-case the first character, leave the rest untouched.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_with_capitalized_reason() {
        assert_eq!(
            Response::new(Status::Accepted, "payment accepted").to_string(),
            "RESPONSE|ACCEPTED|Payment accepted"
        );
        assert_eq!(
            Response::rejected("payment rejected").to_string(),
            "RESPONSE|REJECTED|Payment rejected"
        );
    }

    #[test]
    fn default_renders_empty_reason() {
        assert_eq!(Response::default().to_string(), "RESPONSE|ACCEPTED|");
    }

    #[test]
    fn frame_is_newline_terminated() {
        assert_eq!(Response::cancelled().to_frame(), "RESPONSE|REJECTED|Cancelled\n");
        assert_eq!(
            Response::accepted().to_frame(),
            "RESPONSE|ACCEPTED|Transaction processed\n"
        );
    }

    #[test]
    fn errors_become_rejections() {
        assert_eq!(
            Response::from(&FrameError::MalformedFrame).to_string(),
            "RESPONSE|REJECTED|Invalid request"
        );
        assert_eq!(
            Response::from(&FrameError::MalformedAmount).to_string(),
            "RESPONSE|REJECTED|Invalid amount"
        );
        assert_eq!(
            Response::from(&ServiceError::Downstream("service failure".into())).to_string(),
            "RESPONSE|REJECTED|Service failure"
        );
    }

    #[test]
    fn parses_rendered_frame_back() {
        let sent = Response::rejected("card declined");
        let parsed: Response = sent.to_frame().parse().unwrap();
        assert_eq!(parsed.status, Status::Rejected);
        assert_eq!(parsed.reason, "Card declined");

        let empty: Response = Response::default().to_string().parse().unwrap();
        assert_eq!(empty, Response::default());
    }

    #[test]
    fn reason_may_contain_separator() {
        let parsed: Response = "RESPONSE|REJECTED|a|b".parse().unwrap();
        assert_eq!(parsed.reason, "a|b");
    }

    #[test]
    fn rejects_foreign_lines() {
        assert_eq!(
            "PAYMENT|1".parse::<Response>(),
            Err(ResponseParseError::MissingPrefix)
        );
        assert_eq!(
            "RESPONSE|MAYBE|x".parse::<Response>(),
            Err(ResponseParseError::UnknownStatus("MAYBE".into()))
        );
        assert_eq!(
            "RESPONSE|ACCEPTED".parse::<Response>(),
            Err(ResponseParseError::MissingReason)
        );
    }

    #[test]
    fn capitalize_first_character_only() {
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("a"), "A");
        assert_eq!(capitalize("service failure"), "Service failure");
        assert_eq!(capitalize("Already"), "Already");
        assert_eq!(capitalize("éclair"), "Éclair");
    }
}
