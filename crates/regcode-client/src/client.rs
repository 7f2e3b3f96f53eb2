// SPDX-FileCopyrightText: 2026 Regcode Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the code-generation backend.
//!
//! Two retry layers: the attempt loop in [`CodeClient::request_code`]
//! reacts to what the backend said, while [`CodeClient::send_with_retry`]
//! only absorbs connection-level failures of a single call.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use regcode_audit::{Action, ApiSummary, AuditLogger, LogEvent};
use regcode_config::RegcodeConfig;
use regcode_core::error::RegcodeError;
use regcode_core::types::{CodeResult, Request};
use reqwest::StatusCode;
use thiserror::Error;
use tracing::debug;

use crate::policy::RetryPolicy;
use crate::types::{GenerateCodeRequest, GenerateCodeResponse};
use crate::validator::{InvalidResponse, validate};

/// Path appended to the configured base URL.
const GENERATE_PATH: &str = "/generate-code";

/// Why one attempt did not yield a code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttemptError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("API status {0}")]
    Status(u16),

    #[error(transparent)]
    Invalid(#[from] InvalidResponse),
}

/// Result of the whole attempt loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeOutcome {
    /// A validated code.
    Issued { result: CodeResult, attempts: u32 },
    /// The backend answered 429; no further attempts were made.
    RateLimited { attempts: u32 },
    /// Every attempt failed.
    Exhausted { attempts: u32, last_error: AttemptError },
}

/// Client for `POST {api_url}/generate-code`.
#[derive(Clone)]
pub struct CodeClient {
    http: reqwest::Client,
    endpoint: String,
    policy: RetryPolicy,
    audit: Arc<AuditLogger>,
}

impl CodeClient {
    /// Creates a client for `base_url` (a trailing slash is ignored).
    pub fn new(
        base_url: &str,
        timeout: Duration,
        policy: RetryPolicy,
        audit: Arc<AuditLogger>,
    ) -> Result<Self, RegcodeError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RegcodeError::Http {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            http,
            endpoint: format!("{}{GENERATE_PATH}", base_url.trim_end_matches('/')),
            policy,
            audit,
        })
    }

    pub fn from_config(config: &RegcodeConfig, audit: Arc<AuditLogger>) -> Result<Self, RegcodeError> {
        let base_url = config
            .api
            .url
            .as_deref()
            .ok_or_else(|| RegcodeError::Config("api.url is required".into()))?;
        Self::new(
            base_url,
            Duration::from_secs(config.api.timeout_secs),
            RetryPolicy::from(&config.retry),
            audit,
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Runs the attempt loop for one request.
    ///
    /// Returns `Err` only when the HTTP request cannot even be built; every
    /// backend or network problem ends up in [`CodeOutcome`].
    pub async fn request_code(&self, request: &Request) -> Result<CodeOutcome, RegcodeError> {
        let body = GenerateCodeRequest {
            discord_id: &request.user.id.0,
            username: &request.user.username,
            request_id: request.id.as_str(),
        };
        let http_request = self
            .http
            .post(&self.endpoint)
            .header("x-request-id", request.id.as_str())
            .json(&body)
            .build()
            .map_err(|e| RegcodeError::Http {
                message: format!("failed to build request for {}: {e}", self.endpoint),
                source: Some(Box::new(e)),
            })?;

        let max_attempts = self.policy.max_attempts;
        let mut last_error = AttemptError::Transport("no attempt made".into());

        for attempt in 1..=max_attempts {
            let started = Instant::now();
            let (error, delay) = match self.send_with_retry(&http_request).await {
                Err(e) => {
                    self.audit
                        .emit(
                            LogEvent::warn(Action::ApiFetchError)
                                .for_request(request)
                                .api(ApiSummary {
                                    status: None,
                                    latency_ms: elapsed_ms(started),
                                    body: None,
                                })
                                .attempts(attempt)
                                .extra(e.to_string())
                                .stack(e.chain()),
                        )
                        .await;
                    (
                        AttemptError::Transport(e.to_string()),
                        self.policy.failure_delay(attempt),
                    )
                }
                Ok(response) => {
                    let status = response.status();
                    let text = response.text().await.unwrap_or_default();
                    let api = ApiSummary {
                        status: Some(status.as_u16()),
                        latency_ms: elapsed_ms(started),
                        body: Some(text.clone()),
                    };

                    if status == StatusCode::TOO_MANY_REQUESTS {
                        self.audit
                            .emit(
                                LogEvent::warn(Action::Api429)
                                    .for_request(request)
                                    .api(api)
                                    .attempts(attempt),
                            )
                            .await;
                        return Ok(CodeOutcome::RateLimited { attempts: attempt });
                    }

                    if !status.is_success() {
                        self.audit
                            .emit(
                                LogEvent::warn(Action::ApiError)
                                    .for_request(request)
                                    .api(api)
                                    .attempts(attempt),
                            )
                            .await;
                        (
                            AttemptError::Status(status.as_u16()),
                            self.policy.upstream_delay(attempt),
                        )
                    } else {
                        let parsed = GenerateCodeResponse::parse_lenient(&text);
                        match validate(&parsed, Utc::now()) {
                            Ok(result) => {
                                self.audit
                                    .emit(
                                        LogEvent::info(Action::Success)
                                            .for_request(request)
                                            .code(result.code.clone(), result.reused)
                                            .api(api)
                                            .attempts(attempt),
                                    )
                                    .await;
                                return Ok(CodeOutcome::Issued {
                                    result,
                                    attempts: attempt,
                                });
                            }
                            Err(invalid @ InvalidResponse::MissingCode) => {
                                self.audit
                                    .emit(
                                        LogEvent::warn(Action::ApiMissingCode)
                                            .for_request(request)
                                            .api(api)
                                            .attempts(attempt),
                                    )
                                    .await;
                                (invalid.into(), self.policy.upstream_delay(attempt))
                            }
                            Err(invalid @ InvalidResponse::Expired { .. }) => {
                                let mut event = LogEvent::warn(Action::ApiReturnedExpiredCode)
                                    .for_request(request)
                                    .api(api)
                                    .attempts(attempt)
                                    .extra(invalid.to_string());
                                if let Some(code) = parsed.code {
                                    event = event.code(code, parsed.reused.unwrap_or(false));
                                }
                                self.audit.emit(event).await;
                                (invalid.into(), self.policy.failure_delay(attempt))
                            }
                        }
                    }
                }
            };

            last_error = error;
            if attempt < max_attempts {
                debug!(request_id = %request.id, attempt, delay_ms = delay.as_millis() as u64, error = %last_error, "backing off before next attempt");
                tokio::time::sleep(delay).await;
            }
        }

        Ok(CodeOutcome::Exhausted {
            attempts: max_attempts,
            last_error,
        })
    }

    /// Executes one call, retrying connection-level failures with a
    /// doubling delay. HTTP error statuses are returned as responses.
    async fn send_with_retry(
        &self,
        request: &reqwest::Request,
    ) -> Result<reqwest::Response, RegcodeError> {
        let mut delay = self.policy.transport_backoff;
        let mut call = 1;
        loop {
            let attempt = request
                .try_clone()
                .ok_or_else(|| RegcodeError::Internal("request body cannot be cloned".into()))?;
            match self.http.execute(attempt).await {
                Ok(response) => return Ok(response),
                Err(e) if call < self.policy.transport_attempts => {
                    debug!(call, error = %e, "transport error, retrying call");
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                    call += 1;
                }
                Err(e) => {
                    return Err(RegcodeError::Http {
                        message: format!("POST {} failed after {call} calls", self.endpoint),
                        source: Some(Box::new(e)),
                    });
                }
            }
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use regcode_audit::ProcessIdentity;

    use super::*;

    fn audit() -> Arc<AuditLogger> {
        Arc::new(AuditLogger::new(ProcessIdentity::new("test", None)))
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = CodeClient::new(
            "https://codes.example.com/",
            Duration::from_secs(1),
            RetryPolicy::default(),
            audit(),
        )
        .expect("client");
        assert_eq!(client.endpoint(), "https://codes.example.com/generate-code");
    }

    #[test]
    fn from_config_requires_url() {
        let err = CodeClient::from_config(&RegcodeConfig::default(), audit())
            .err()
            .expect("missing url should fail");
        assert!(matches!(err, RegcodeError::Config(_)));
    }

    #[test]
    fn attempt_errors_read_like_the_audit_log() {
        assert_eq!(AttemptError::Status(500).to_string(), "API status 500");
        assert_eq!(
            AttemptError::from(InvalidResponse::MissingCode).to_string(),
            "API no devolvió código"
        );
    }
}
