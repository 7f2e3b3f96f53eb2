// SPDX-FileCopyrightText: 2026 Regcode Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order: `./regcode.toml` > `~/.config/regcode/regcode.toml` >
//! `/etc/regcode/regcode.toml`, then `REGCODE_*` environment variables, then
//! the bare deployment variables (`API_URL`, `LOG_CHANNEL_ID`, `DEPLOY_SHA`,
//! `APP_ENV`, with `NODE_ENV` as a fallback for the environment name).

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::RegcodeConfig;

/// Config sections that `REGCODE_<SECTION>_<KEY>` variables map into.
const SECTIONS: &[&str] = &["api", "retry", "cooldown", "audit", "bot"];

/// Bare variables and the keys they override.
const DEPLOYMENT_VARS: &[(&str, &str)] = &[
    ("API_URL", "api.url"),
    ("LOG_CHANNEL_ID", "audit.log_channel_id"),
    ("DEPLOY_SHA", "audit.build_sha"),
    ("APP_ENV", "audit.environment"),
];

/// Environment name read by older deployments; `APP_ENV` wins when both are set.
const LEGACY_ENVIRONMENT_VAR: &str = "NODE_ENV";

/// Config files in increasing precedence order.
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/regcode/regcode.toml")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("regcode").join("regcode.toml"));
    }
    paths.push(PathBuf::from("regcode.toml"));
    paths
}

/// Load configuration from the file hierarchy with env var overrides.
pub fn load_config() -> Result<RegcodeConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no environment).
pub fn load_config_from_str(toml_content: &str) -> Result<RegcodeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RegcodeConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<RegcodeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RegcodeConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .merge(legacy_environment_provider())
        .merge(deployment_env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    let mut figment = Figment::new().merge(Serialized::defaults(RegcodeConfig::default()));
    for path in config_paths() {
        figment = figment.merge(Toml::file(path));
    }
    figment
        .merge(env_provider())
        .merge(legacy_environment_provider())
        .merge(deployment_env_provider())
}

/// `REGCODE_*` provider with explicit section mapping.
///
/// `Env::split("_")` would turn `REGCODE_API_TIMEOUT_SECS` into
/// `api.timeout.secs`; only the first segment names the section.
fn env_provider() -> Env {
    Env::prefixed("REGCODE_").map(|key| {
        let key = key.as_str().to_ascii_lowercase();
        SECTIONS
            .iter()
            .find_map(|section| {
                key.strip_prefix(section)
                    .and_then(|rest| rest.strip_prefix('_'))
                    .map(|rest| format!("{section}.{rest}"))
            })
            .unwrap_or(key)
            .into()
    })
}

/// Provider for the bare variables set by existing deployments.
fn deployment_env_provider() -> Env {
    let names: Vec<&str> = DEPLOYMENT_VARS.iter().map(|(var, _)| *var).collect();
    Env::raw().only(&names).map(|key| {
        DEPLOYMENT_VARS
            .iter()
            .find(|(var, _)| key.as_str().eq_ignore_ascii_case(var))
            .map(|(_, target)| (*target).to_string())
            .unwrap_or_else(|| key.as_str().to_ascii_lowercase())
            .into()
    })
}

/// `NODE_ENV` as `audit.environment`, merged below [`deployment_env_provider`].
fn legacy_environment_provider() -> Env {
    Env::raw()
        .only(&[LEGACY_ENVIRONMENT_VAR])
        .map(|_| "audit.environment".into())
}
