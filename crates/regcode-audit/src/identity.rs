// SPDX-FileCopyrightText: 2026 Regcode Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process identity footer appended to every rendered event.

use regcode_config::model::AuditConfig;

/// Identifies which running instance produced an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessIdentity {
    pub pid: u32,
    pub environment: String,
    pub build_sha: Option<String>,
}

impl ProcessIdentity {
    pub fn new(environment: impl Into<String>, build_sha: Option<String>) -> Self {
        Self {
            pid: std::process::id(),
            environment: environment.into(),
            build_sha,
        }
    }

    pub fn from_config(config: &AuditConfig) -> Self {
        Self::new(config.environment.clone(), config.build_sha.clone())
    }

    /// `pid=<pid> env=<env>[ commit=<sha>]`
    pub fn footer(&self) -> String {
        let mut footer = format!("pid={} env={}", self.pid, self.environment);
        if let Some(sha) = &self.build_sha {
            footer.push_str(" commit=");
            footer.push_str(sha);
        }
        footer
    }
}
