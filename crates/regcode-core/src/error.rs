// SPDX-FileCopyrightText: 2026 Regcode Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for regcode.

use thiserror::Error;

/// The primary error type shared by the platform boundary, the code client,
/// and the audit sinks.
#[derive(Debug, Error)]
pub enum RegcodeError {
    /// Configuration errors (missing API URL, invalid values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Chat platform errors (closed DMs, missing permissions, unknown channel).
    #[error("platform error: {message}")]
    Platform {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Errors talking to the code-generation backend.
    #[error("http error: {message}")]
    Http {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An audit sink could not accept an event.
    #[error("log sink error: {message}")]
    Sink {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RegcodeError {
    /// Shorthand for a platform error without an underlying cause.
    pub fn platform(message: impl Into<String>) -> Self {
        Self::Platform {
            message: message.into(),
            source: None,
        }
    }

    /// Renders the error together with its `source()` chain, one cause per line.
    ///
    /// Used as the "stack" of audit events, since Rust errors carry no
    /// backtrace by default.
    pub fn chain(&self) -> String {
        let mut out = self.to_string();
        let mut current = std::error::Error::source(self);
        while let Some(cause) = current {
            out.push_str("\ncaused by: ");
            out.push_str(&cause.to_string());
            current = cause.source();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_includes_sources() {
        let err = RegcodeError::Http {
            message: "connect failed".into(),
            source: Some(Box::new(std::io::Error::other("connection refused"))),
        };
        let chain = err.chain();
        assert!(chain.starts_with("http error: connect failed"));
        assert!(chain.contains("caused by: connection refused"));
    }

    #[test]
    fn chain_without_source_is_display() {
        let err = RegcodeError::platform("dm closed");
        assert_eq!(err.chain(), "platform error: dm closed");
    }
}
