// SPDX-FileCopyrightText: 2026 Regcode Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fan-out audit logger that never fails its caller.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{error, warn};

use crate::event::LogEvent;
use crate::identity::ProcessIdentity;
use crate::sink::LogSink;

/// Delivers each event to every configured sink, in order.
///
/// `emit` returns nothing: sink errors and sink panics are reported through
/// `tracing` and dropped.
pub struct AuditLogger {
    sinks: Vec<Arc<dyn LogSink>>,
    identity: ProcessIdentity,
}

impl AuditLogger {
    /// Creates a logger without sinks. Events are discarded until one is added.
    pub fn new(identity: ProcessIdentity) -> Self {
        Self {
            sinks: Vec::new(),
            identity,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn identity(&self) -> &ProcessIdentity {
        &self.identity
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    pub async fn emit(&self, event: LogEvent) {
        for sink in &self.sinks {
            let published = AssertUnwindSafe(sink.publish(&event, &self.identity))
                .catch_unwind()
                .await;
            match published {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!(sink = sink.name(), action = %event.action, error = %e, "audit sink rejected event");
                }
                Err(_) => {
                    error!(sink = sink.name(), action = %event.action, "audit sink panicked");
                }
            }
        }
    }
}
