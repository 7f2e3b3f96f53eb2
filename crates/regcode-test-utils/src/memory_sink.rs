// SPDX-FileCopyrightText: 2026 Regcode Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory audit sink.

use std::sync::Arc;

use async_trait::async_trait;
use regcode_audit::{Action, AuditLogger, LogEvent, LogSink, ProcessIdentity};
use regcode_core::error::RegcodeError;
use tokio::sync::Mutex;

/// Captures every published event for later inspection.
#[derive(Default)]
pub struct MemorySink {
    events: Mutex<Vec<LogEvent>>,
}

impl MemorySink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// An [`AuditLogger`] whose only sink is `sink`.
    pub fn logger(sink: &Arc<Self>) -> Arc<AuditLogger> {
        let identity = ProcessIdentity::new("test", Some("testsha".into()));
        Arc::new(AuditLogger::new(identity).with_sink(sink.clone()))
    }

    pub async fn events(&self) -> Vec<LogEvent> {
        self.events.lock().await.clone()
    }

    /// Actions in emission order.
    pub async fn actions(&self) -> Vec<Action> {
        self.events.lock().await.iter().map(|e| e.action).collect()
    }

    pub async fn count(&self, action: Action) -> usize {
        self.events
            .lock()
            .await
            .iter()
            .filter(|e| e.action == action)
            .count()
    }

    /// The first event with `action`, if any.
    pub async fn find(&self, action: Action) -> Option<LogEvent> {
        self.events
            .lock()
            .await
            .iter()
            .find(|e| e.action == action)
            .cloned()
    }

    pub async fn clear(&self) {
        self.events.lock().await.clear();
    }
}

#[async_trait]
impl LogSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    async fn publish(
        &self,
        event: &LogEvent,
        _identity: &ProcessIdentity,
    ) -> Result<(), RegcodeError> {
        self.events.lock().await.push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn logger_routes_events_into_the_sink() {
        let sink = MemorySink::new();
        let logger = MemorySink::logger(&sink);

        logger.emit(LogEvent::info(Action::BotStarted)).await;
        logger.emit(LogEvent::warn(Action::CooldownHit)).await;

        assert_eq!(
            sink.actions().await,
            vec![Action::BotStarted, Action::CooldownHit]
        );
        assert_eq!(sink.count(Action::CooldownHit).await, 1);
        assert!(sink.find(Action::Complete).await.is_none());
    }
}
