// SPDX-FileCopyrightText: 2026 Regcode Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The audit event data model.

use std::fmt;

use regcode_core::types::{Request, RequestId, UserRef};
use strum::{Display, EnumString};

/// Severity of an audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// What happened. Serialized as the snake_case tag operators grep for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum Action {
    /// The service came online.
    BotStarted,
    /// A trigger was accepted for processing.
    GenerateCodeStart,
    /// The trigger was rejected by the cooldown guard.
    CooldownHit,
    /// The transport failed even after the nested retry.
    ApiFetchError,
    /// The backend answered with a non-success status other than 429.
    ApiError,
    /// The backend answered 429.
    #[strum(to_string = "api_429")]
    Api429,
    /// A success status without a usable code.
    ApiMissingCode,
    /// A code whose expiry is already in the past (or unreadable).
    ApiReturnedExpiredCode,
    /// The attempt produced a valid code.
    Success,
    /// Terminal: upstream rate limiting.
    RateLimited,
    /// Terminal: every attempt failed.
    Failed,
    /// The code reached the user's DMs.
    DmSent,
    /// The DM could not be delivered.
    DmFailed,
    /// Terminal: code delivered.
    Complete,
    /// Terminal: code generated but not received.
    DeliveryFailed,
    /// Terminal: the handler itself failed.
    UnexpectedHandlerError,
}

/// Outcome of one backend call as seen by the audit log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiSummary {
    /// `None` when no response arrived (transport failure).
    pub status: Option<u16>,
    pub latency_ms: u64,
    /// Raw response body; truncated by the renderer, not here.
    pub body: Option<String>,
}

/// One correlated audit event. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub level: LogLevel,
    pub action: Action,
    pub request_id: Option<RequestId>,
    pub user: Option<String>,
    pub user_id: Option<String>,
    pub code: Option<String>,
    pub reused: bool,
    pub api: Option<ApiSummary>,
    pub dm_sent: Option<bool>,
    pub dm_error: Option<String>,
    pub deleted_message: Option<bool>,
    pub attempts: Option<u32>,
    pub extra: Option<String>,
    pub error_stack: Option<String>,
}

impl LogEvent {
    pub fn new(level: LogLevel, action: Action) -> Self {
        Self {
            level,
            action,
            request_id: None,
            user: None,
            user_id: None,
            code: None,
            reused: false,
            api: None,
            dm_sent: None,
            dm_error: None,
            deleted_message: None,
            attempts: None,
            extra: None,
            error_stack: None,
        }
    }

    pub fn info(action: Action) -> Self {
        Self::new(LogLevel::Info, action)
    }

    pub fn warn(action: Action) -> Self {
        Self::new(LogLevel::Warn, action)
    }

    pub fn error(action: Action) -> Self {
        Self::new(LogLevel::Error, action)
    }

    /// Tags the event with the request's correlation id and user.
    pub fn for_request(self, request: &Request) -> Self {
        self.request(request.id.clone()).user(&request.user)
    }

    pub fn request(mut self, id: RequestId) -> Self {
        self.request_id = Some(id);
        self
    }

    pub fn user(mut self, user: &UserRef) -> Self {
        self.user = Some(user.display_name.clone());
        self.user_id = Some(user.id.to_string());
        self
    }

    pub fn code(mut self, code: impl Into<String>, reused: bool) -> Self {
        self.code = Some(code.into());
        self.reused = reused;
        self
    }

    pub fn api(mut self, api: ApiSummary) -> Self {
        self.api = Some(api);
        self
    }

    pub fn dm_sent(mut self, sent: bool) -> Self {
        self.dm_sent = Some(sent);
        self
    }

    pub fn dm_error(mut self, error: impl fmt::Display) -> Self {
        self.dm_error = Some(error.to_string());
        self
    }

    pub fn deleted_message(mut self, deleted: Option<bool>) -> Self {
        self.deleted_message = deleted;
        self
    }

    pub fn attempts(mut self, attempts: u32) -> Self {
        self.attempts = Some(attempts);
        self
    }

    pub fn extra(mut self, extra: impl Into<String>) -> Self {
        self.extra = Some(extra.into());
        self
    }

    pub fn stack(mut self, stack: impl Into<String>) -> Self {
        self.error_stack = Some(stack.into());
        self
    }
}
