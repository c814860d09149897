//! User-visible status messages (footer line).
//!
//! A message has a main text and a right-aligned detail (typically which
//! backend/session it concerns). Session failures are reported here rather
//! than escalated.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageLevel {
    #[default]
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusMessage {
    pub level: MessageLevel,
    pub text: String,
    pub detail: String,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            text: text.into(),
            detail: detail.into(),
        }
    }

    pub fn warning(text: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            text: text.into(),
            detail: detail.into(),
        }
    }

    pub fn error(text: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            text: text.into(),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.detail.is_empty() {
            f.write_str(&self.text)
        } else {
            write!(f, "{} [{}]", self.text, self.detail)
        }
    }
}
