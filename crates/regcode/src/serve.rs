// SPDX-FileCopyrightText: 2026 Regcode Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `regcode serve` and `regcode request` command implementations.
//!
//! Both wire the console platform, the audit logger and the orchestrator
//! from the validated configuration. `serve` reads trigger lines from stdin
//! and runs each one on its own task until EOF or a shutdown signal.

use std::sync::Arc;
use std::time::Duration;

use regcode_agent::{Orchestrator, Outcome, build_audit_logger, shutdown};
use regcode_config::model::RegcodeConfig;
use regcode_core::error::RegcodeError;
use regcode_core::traits::ChatPlatform;
use regcode_core::types::{ChannelId, MessageId, TriggerEvent, UserRef};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use crate::console::ConsolePlatform;

/// Channel every console trigger is posted in.
const CONSOLE_CHANNEL: &str = "console";

/// How long in-flight requests get to finish after shutdown.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

fn build_orchestrator(config: &RegcodeConfig) -> Result<Arc<Orchestrator>, RegcodeError> {
    let platform: Arc<dyn ChatPlatform> = Arc::new(ConsolePlatform::new());
    let audit = Arc::new(build_audit_logger(config, Arc::clone(&platform)));
    Ok(Arc::new(Orchestrator::from_config(config, platform, audit)?))
}

/// Runs the `regcode serve` command.
pub async fn run_serve(config: RegcodeConfig) -> Result<(), RegcodeError> {
    init_tracing(&config.bot.log_level);

    let orchestrator = build_orchestrator(&config)?;
    orchestrator.announce_start().await;
    info!(command = %config.bot.command, "reading triggers from stdin");

    let cancel = shutdown::install_signal_handler();
    let tracker = TaskTracker::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut line_no: u64 = 0;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("shutdown requested, no longer accepting triggers");
                break;
            }
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        info!("stdin closed");
                        break;
                    }
                    Err(e) => {
                        warn!(error = %e, "failed to read stdin");
                        break;
                    }
                };
                line_no += 1;

                let Some(trigger) = parse_trigger_line(&line, line_no, &config.bot.command) else {
                    debug!(line_no, "line is not a trigger");
                    continue;
                };
                let orchestrator = Arc::clone(&orchestrator);
                tracker.spawn(async move {
                    let user_id = trigger.user.id.clone();
                    let outcome = orchestrator.handle(trigger).await;
                    info!(%user_id, %outcome, "trigger handled");
                });
            }
        }
    }

    shutdown::drain_in_flight(&tracker, DRAIN_TIMEOUT).await;
    orchestrator.shutdown();
    cancel.cancel();
    Ok(())
}

/// Runs the `regcode request` command: one orchestration for one user.
pub async fn run_request(
    config: RegcodeConfig,
    user_id: String,
    username: String,
) -> Result<Outcome, RegcodeError> {
    init_tracing(&config.bot.log_level);

    let orchestrator = build_orchestrator(&config)?;
    let command = config.bot.command.trim_start_matches(['!', '/']).to_string();
    let trigger = TriggerEvent::from_interaction(
        UserRef::new(user_id, username),
        ChannelId(CONSOLE_CHANNEL.into()),
        command,
    );

    let outcome = orchestrator.handle(trigger).await;
    orchestrator.shutdown();
    Ok(outcome)
}

/// Parses `<user_id> <username> <content>` into a trigger.
///
/// Returns `None` for malformed lines and for content that is not the
/// command.
pub fn parse_trigger_line(line: &str, line_no: u64, command: &str) -> Option<TriggerEvent> {
    let mut parts = line.trim().splitn(3, char::is_whitespace);
    let user_id = parts.next().filter(|s| !s.is_empty())?;
    let username = parts.next().filter(|s| !s.is_empty())?;
    let content = parts.next().unwrap_or_default();

    TriggerEvent::from_text(
        UserRef::new(user_id, username),
        ChannelId(CONSOLE_CHANNEL.into()),
        MessageId(format!("line-{line_no}")),
        content,
        command,
    )
}

/// Initializes the tracing subscriber. `RUST_LOG` wins over `log_level`.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("regcode={log_level},warn")));

    // Audit events go to stderr so stdout carries only platform output.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use regcode_core::types::TriggerSource;

    use super::*;

    #[test]
    fn parses_a_trigger_line() {
        let trigger = parse_trigger_line("42 alice !codigo", 7, "!codigo").expect("trigger");
        assert_eq!(trigger.user.id.0, "42");
        assert_eq!(trigger.user.username, "alice");
        assert_eq!(trigger.channel, ChannelId("console".into()));
        assert_eq!(
            trigger.source,
            TriggerSource::TextCommand {
                message_id: MessageId("line-7".into())
            }
        );
    }

    #[test]
    fn content_match_ignores_case_and_padding() {
        assert!(parse_trigger_line("  42 alice   !CODIGO  ", 1, "!codigo").is_some());
    }

    #[test]
    fn other_lines_are_ignored() {
        assert!(parse_trigger_line("", 1, "!codigo").is_none());
        assert!(parse_trigger_line("42", 1, "!codigo").is_none());
        assert!(parse_trigger_line("42 alice", 1, "!codigo").is_none());
        assert!(parse_trigger_line("42 alice hola", 1, "!codigo").is_none());
    }
}
