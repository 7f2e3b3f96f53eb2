// SPDX-FileCopyrightText: 2026 Regcode Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One trigger, start to finish.
//!
//! ```text
//! Idle -> CooldownCheck -> Requesting -> Delivering -> Completed
//!              |               |              |
//!              v               v              v
//!       CooldownRejected  RateLimited /   DeliveryFailed
//!                         GenerationFailed
//! ```
//!
//! Every run gets a fresh request id, emits `generate_code_start` and
//! exactly one terminal event. Errors and panics raised anywhere in the run
//! become `unexpected_handler_error` instead of escaping the task.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use regcode_audit::{
    Action, AuditLogger, ChannelSink, LogEvent, ProcessIdentity, TextRenderer, TracingSink,
};
use regcode_client::{CodeClient, CodeOutcome};
use regcode_config::RegcodeConfig;
use regcode_core::error::RegcodeError;
use regcode_core::traits::ChatPlatform;
use regcode_core::types::{ChannelId, Request, RequestId, TriggerEvent};
use strum::Display;
use tracing::{error, info};

use crate::cooldown::{CooldownDecision, CooldownGuard};
use crate::delivery::DeliveryDispatcher;

/// Terminal state of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Outcome {
    Completed,
    CooldownRejected,
    UpstreamRateLimited,
    GenerationFailed,
    DeliveryFailed,
    InternalError,
}

pub struct Orchestrator {
    cooldown: CooldownGuard,
    client: CodeClient,
    dispatcher: DeliveryDispatcher,
    audit: Arc<AuditLogger>,
}

impl Orchestrator {
    pub fn new(
        cooldown: CooldownGuard,
        client: CodeClient,
        dispatcher: DeliveryDispatcher,
        audit: Arc<AuditLogger>,
    ) -> Self {
        Self {
            cooldown,
            client,
            dispatcher,
            audit,
        }
    }

    pub fn from_config(
        config: &RegcodeConfig,
        platform: Arc<dyn ChatPlatform>,
        audit: Arc<AuditLogger>,
    ) -> Result<Self, RegcodeError> {
        let client = CodeClient::from_config(config, Arc::clone(&audit))?;
        let dispatcher = DeliveryDispatcher::new(platform, Arc::clone(&audit), &config.bot);
        Ok(Self::new(
            CooldownGuard::from_config(&config.cooldown),
            client,
            dispatcher,
            audit,
        ))
    }

    pub fn cooldown(&self) -> &CooldownGuard {
        &self.cooldown
    }

    /// Emits `bot_started`. Called once when the service comes online.
    pub async fn announce_start(&self) {
        info!(platform = self.dispatcher.platform_name(), "regcode online");
        self.audit
            .emit(
                LogEvent::info(Action::BotStarted)
                    .extra(format!("platform={}", self.dispatcher.platform_name())),
            )
            .await;
    }

    /// Handles one trigger. Never fails and never panics.
    pub async fn handle(&self, trigger: TriggerEvent) -> Outcome {
        let run = AssertUnwindSafe(self.run(&trigger)).catch_unwind().await;
        match run {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                self.report_unexpected(&trigger, e.to_string(), e.chain())
                    .await
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                let stack = format!("panic: {message}");
                self.report_unexpected(&trigger, message, stack).await
            }
        }
    }

    /// Stops background cooldown maintenance.
    pub fn shutdown(&self) {
        self.cooldown.shutdown();
    }

    async fn run(&self, trigger: &TriggerEvent) -> Result<Outcome, RegcodeError> {
        let mut request = Request::new(trigger.user.clone());
        self.audit
            .emit(
                LogEvent::info(Action::GenerateCodeStart)
                    .for_request(&request)
                    .extra(format!("trigger={}", trigger.source.kind())),
            )
            .await;

        if let CooldownDecision::Rejected { remaining } =
            self.cooldown.check_and_reserve(&trigger.user.id)
        {
            self.dispatcher.notify_cooldown(trigger).await;
            self.audit
                .emit(
                    LogEvent::warn(Action::CooldownHit)
                        .for_request(&request)
                        .extra(format!("remaining_ms={}", remaining.as_millis())),
                )
                .await;
            return Ok(Outcome::CooldownRejected);
        }

        let deleted = self.dispatcher.delete_trigger(trigger).await;

        match self.client.request_code(&request).await? {
            CodeOutcome::RateLimited { attempts } => {
                request.attempt_count = attempts;
                self.dispatcher.notify_rate_limited(trigger).await;
                self.audit
                    .emit(
                        LogEvent::warn(Action::RateLimited)
                            .for_request(&request)
                            .attempts(attempts)
                            .deleted_message(deleted),
                    )
                    .await;
                Ok(Outcome::UpstreamRateLimited)
            }
            CodeOutcome::Exhausted {
                attempts,
                last_error,
            } => {
                request.attempt_count = attempts;
                self.audit
                    .emit(
                        LogEvent::error(Action::Failed)
                            .for_request(&request)
                            .attempts(attempts)
                            .deleted_message(deleted)
                            .extra(last_error.to_string()),
                    )
                    .await;
                self.dispatcher.notify_failure(trigger).await;
                Ok(Outcome::GenerationFailed)
            }
            CodeOutcome::Issued { result, attempts } => {
                request.attempt_count = attempts;
                let delivery = self.dispatcher.deliver(trigger, &result, &request).await;

                let event = if delivery.dm_sent() {
                    LogEvent::info(Action::Complete)
                } else {
                    LogEvent::warn(Action::DeliveryFailed).extra(format!("{delivery:?}"))
                };
                self.audit
                    .emit(
                        event
                            .for_request(&request)
                            .code(result.code.clone(), result.reused)
                            .dm_sent(delivery.dm_sent())
                            .deleted_message(deleted)
                            .attempts(attempts),
                    )
                    .await;

                Ok(if delivery.dm_sent() {
                    Outcome::Completed
                } else {
                    Outcome::DeliveryFailed
                })
            }
        }
    }

    async fn report_unexpected(
        &self,
        trigger: &TriggerEvent,
        message: String,
        stack: String,
    ) -> Outcome {
        let request_id = RequestId::generate();
        error!(%request_id, user_id = %trigger.user.id, error = %message, "unexpected handler error");
        self.audit
            .emit(
                LogEvent::error(Action::UnexpectedHandlerError)
                    .request(request_id)
                    .user(&trigger.user)
                    .extra(message)
                    .stack(stack),
            )
            .await;
        Outcome::InternalError
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Audit logger for a running service: always the process log, plus the
/// operations channel when `audit.log_channel_id` is set.
pub fn build_audit_logger(config: &RegcodeConfig, platform: Arc<dyn ChatPlatform>) -> AuditLogger {
    let logger = AuditLogger::new(ProcessIdentity::from_config(&config.audit))
        .with_sink(Arc::new(TracingSink));

    match &config.audit.log_channel_id {
        Some(channel) => logger.with_sink(Arc::new(ChannelSink::new(
            platform,
            ChannelId(channel.clone()),
            TextRenderer::from_config(&config.audit),
        ))),
        None => logger,
    }
}
