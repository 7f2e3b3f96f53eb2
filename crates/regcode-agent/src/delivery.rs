// SPDX-FileCopyrightText: 2026 Regcode Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery of codes and user notices through the chat platform.
//!
//! Only the private code message is audited here (`dm_sent` / `dm_failed`).
//! Every other send is best-effort: failures are traced and swallowed.

use std::sync::Arc;

use regcode_audit::{Action, AuditLogger, LogEvent};
use regcode_config::model::BotConfig;
use regcode_core::traits::ChatPlatform;
use regcode_core::types::{CodeResult, Request, TriggerEvent, TriggerSource};
use tracing::{debug, warn};

use crate::messages;

/// How a generated code reached (or failed to reach) the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The private message went through.
    Delivered { confirmation_posted: bool },
    /// The private message failed; a public notice asks the user to open DMs.
    DeliveredWithChannelFallback,
    /// Neither the private message nor the public notice went through.
    Failed,
}

impl DeliveryOutcome {
    /// Whether the user actually holds the code.
    pub fn dm_sent(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered { .. })
    }
}

pub struct DeliveryDispatcher {
    platform: Arc<dyn ChatPlatform>,
    audit: Arc<AuditLogger>,
    text_command: String,
    register_command: String,
}

impl DeliveryDispatcher {
    pub fn new(platform: Arc<dyn ChatPlatform>, audit: Arc<AuditLogger>, bot: &BotConfig) -> Self {
        Self {
            platform,
            audit,
            text_command: bot.command.clone(),
            register_command: bot.register_command.clone(),
        }
    }

    pub fn platform_name(&self) -> &str {
        self.platform.name()
    }

    /// Sends the code privately, then a public confirmation. The private
    /// send is never retried.
    pub async fn deliver(
        &self,
        trigger: &TriggerEvent,
        result: &CodeResult,
        request: &Request,
    ) -> DeliveryOutcome {
        let text = messages::code_message(result, &self.register_command);

        match self.platform.send_private(&trigger.user, &text).await {
            Ok(_) => {
                self.audit
                    .emit(
                        LogEvent::info(Action::DmSent)
                            .for_request(request)
                            .code(result.code.clone(), result.reused)
                            .dm_sent(true),
                    )
                    .await;

                let confirmation = messages::confirmation(&trigger.user);
                let confirmation_posted =
                    match self.platform.send_channel(&trigger.channel, &confirmation).await {
                        Ok(_) => true,
                        Err(e) => {
                            debug!(request_id = %request.id, error = %e, "confirmation not posted");
                            false
                        }
                    };
                DeliveryOutcome::Delivered {
                    confirmation_posted,
                }
            }
            Err(e) => {
                self.audit
                    .emit(
                        LogEvent::warn(Action::DmFailed)
                            .for_request(request)
                            .code(result.code.clone(), result.reused)
                            .dm_sent(false)
                            .dm_error(&e)
                            .stack(e.chain()),
                    )
                    .await;

                let hint = messages::retry_hint(&trigger.source, &self.text_command);
                let notice = messages::dm_closed_notice(&trigger.user, &hint);
                match self.platform.send_channel(&trigger.channel, &notice).await {
                    Ok(_) => DeliveryOutcome::DeliveredWithChannelFallback,
                    Err(e) => {
                        warn!(request_id = %request.id, error = %e, "fallback notice not posted");
                        DeliveryOutcome::Failed
                    }
                }
            }
        }
    }

    /// Removes the trigger message from the channel.
    ///
    /// Returns `None` for triggers that leave no message behind.
    pub async fn delete_trigger(&self, trigger: &TriggerEvent) -> Option<bool> {
        let TriggerSource::TextCommand { message_id } = &trigger.source else {
            return None;
        };
        match self
            .platform
            .delete_message(&trigger.channel, message_id)
            .await
        {
            Ok(()) => Some(true),
            Err(e) => {
                debug!(channel = %trigger.channel, error = %e, "trigger message not deleted");
                Some(false)
            }
        }
    }

    /// Generic failure message: private first, public channel as fallback.
    /// Returns whether the user was told.
    pub async fn notify_failure(&self, trigger: &TriggerEvent) -> bool {
        if self
            .platform
            .send_private(&trigger.user, messages::GENERATION_FAILED)
            .await
            .is_ok()
        {
            return true;
        }
        let notice = messages::failure_notice(&trigger.user);
        match self.platform.send_channel(&trigger.channel, &notice).await {
            Ok(_) => true,
            Err(e) => {
                warn!(user_id = %trigger.user.id, error = %e, "failure notice not delivered");
                false
            }
        }
    }

    /// Upstream rate-limit message, private only.
    pub async fn notify_rate_limited(&self, trigger: &TriggerEvent) -> bool {
        match self
            .platform
            .send_private(&trigger.user, messages::RATE_LIMITED)
            .await
        {
            Ok(_) => true,
            Err(e) => {
                debug!(user_id = %trigger.user.id, error = %e, "rate limit notice not delivered");
                false
            }
        }
    }

    /// Short "wait a moment" reply in the trigger's channel.
    pub async fn notify_cooldown(&self, trigger: &TriggerEvent) -> bool {
        let notice = messages::cooldown_notice(&trigger.user);
        match self.platform.send_channel(&trigger.channel, &notice).await {
            Ok(_) => true,
            Err(e) => {
                debug!(user_id = %trigger.user.id, error = %e, "cooldown notice not delivered");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use regcode_core::types::{ChannelId, MessageId, UserRef};
    use regcode_test_utils::{MemorySink, MockPlatform};

    use super::*;

    fn setup() -> (Arc<MockPlatform>, Arc<MemorySink>, DeliveryDispatcher) {
        let platform = Arc::new(MockPlatform::new());
        let sink = MemorySink::new();
        let dispatcher = DeliveryDispatcher::new(
            platform.clone(),
            MemorySink::logger(&sink),
            &BotConfig::default(),
        );
        (platform, sink, dispatcher)
    }

    fn trigger() -> TriggerEvent {
        TriggerEvent::from_text(
            UserRef::new("5", "eve"),
            ChannelId("general".into()),
            MessageId("m-1".into()),
            "!codigo",
            "!codigo",
        )
        .expect("matches command")
    }

    fn code() -> CodeResult {
        CodeResult {
            code: "ZZ9".into(),
            expires_at: None,
            reused: true,
        }
    }

    #[tokio::test]
    async fn delivers_privately_and_confirms_publicly() {
        let (platform, sink, dispatcher) = setup();
        let trigger = trigger();
        let request = Request::new(trigger.user.clone());

        let outcome = dispatcher.deliver(&trigger, &code(), &request).await;
        assert_eq!(
            outcome,
            DeliveryOutcome::Delivered {
                confirmation_posted: true
            }
        );
        assert!(outcome.dm_sent());

        let private = platform.private_messages().await;
        assert_eq!(private.len(), 1);
        assert!(private[0].contains("`!registrarse ZZ9`"));
        assert_eq!(
            platform.channel_messages().await,
            vec!["📩 <@5>, te envié el código por mensaje privado.".to_string()]
        );

        let event = sink.find(Action::DmSent).await.expect("dm_sent event");
        assert_eq!(event.dm_sent, Some(true));
        assert!(event.reused);
    }

    #[tokio::test]
    async fn confirmation_failure_does_not_change_outcome() {
        let (platform, _sink, dispatcher) = setup();
        platform.fail_channel(true);
        let trigger = trigger();
        let request = Request::new(trigger.user.clone());

        let outcome = dispatcher.deliver(&trigger, &code(), &request).await;
        assert_eq!(
            outcome,
            DeliveryOutcome::Delivered {
                confirmation_posted: false
            }
        );
    }

    #[tokio::test]
    async fn closed_dms_fall_back_to_channel_notice() {
        let (platform, sink, dispatcher) = setup();
        platform.fail_private(true);
        let trigger = trigger();
        let request = Request::new(trigger.user.clone());

        let outcome = dispatcher.deliver(&trigger, &code(), &request).await;
        assert_eq!(outcome, DeliveryOutcome::DeliveredWithChannelFallback);
        assert!(!outcome.dm_sent());

        let public = platform.channel_messages().await;
        assert_eq!(public.len(), 1);
        assert!(public[0].contains("mensajes privados cerrados"));
        assert!(!public[0].contains("ZZ9"));

        let event = sink.find(Action::DmFailed).await.expect("dm_failed event");
        assert_eq!(event.dm_sent, Some(false));
        assert!(event.dm_error.is_some());
    }

    #[tokio::test]
    async fn delivery_fails_when_both_paths_fail() {
        let (platform, _sink, dispatcher) = setup();
        platform.fail_private(true);
        platform.fail_channel(true);
        let trigger = trigger();
        let request = Request::new(trigger.user.clone());

        assert_eq!(
            dispatcher.deliver(&trigger, &code(), &request).await,
            DeliveryOutcome::Failed
        );
    }

    #[tokio::test]
    async fn delete_only_applies_to_text_commands() {
        let (platform, _sink, dispatcher) = setup();
        assert_eq!(dispatcher.delete_trigger(&trigger()).await, Some(true));
        assert_eq!(platform.deleted_messages().await.len(), 1);

        let slash = TriggerEvent::from_interaction(
            UserRef::new("5", "eve"),
            ChannelId("general".into()),
            "codigo",
        );
        assert_eq!(dispatcher.delete_trigger(&slash).await, None);

        platform.fail_delete(true);
        assert_eq!(dispatcher.delete_trigger(&trigger()).await, Some(false));
    }

    #[tokio::test]
    async fn failure_notice_falls_back_to_channel() {
        let (platform, _sink, dispatcher) = setup();
        platform.fail_private(true);

        assert!(dispatcher.notify_failure(&trigger()).await);
        assert_eq!(
            platform.channel_messages().await,
            vec![
                "<@5>, no pude enviarte el código por privado. Abrí tus DMs y volvé a pedirlo."
                    .to_string()
            ]
        );
    }
}
