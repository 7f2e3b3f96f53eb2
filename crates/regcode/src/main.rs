// SPDX-FileCopyrightText: 2026 Regcode Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! regcode - hands out one-time registration codes by private message.
//!
//! This is the binary entry point.

mod console;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use regcode_agent::Outcome;
use regcode_config::RegcodeConfig;

/// regcode - registration code bot.
#[derive(Parser, Debug)]
#[command(name = "regcode", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the lookup hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Read `<user_id> <username> <message>` lines from stdin and answer triggers.
    Serve,
    /// Request and deliver one code for a single user.
    Request {
        /// Platform id of the requesting user.
        #[arg(long)]
        user_id: String,
        /// Account name sent to the backend.
        #[arg(long)]
        username: String,
    },
    /// Print the effective configuration.
    Config,
}

fn load_config(path: Option<&PathBuf>) -> RegcodeConfig {
    let loaded = match path {
        Some(path) => regcode_config::load_and_validate_path(path),
        None => regcode_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            regcode_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref());

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("error: {}", e.chain());
                std::process::exit(1);
            }
        }
        Some(Commands::Request { user_id, username }) => {
            match serve::run_request(config, user_id, username).await {
                Ok(Outcome::Completed) => {}
                Ok(outcome) => {
                    eprintln!("regcode: request ended with {outcome}");
                    std::process::exit(2);
                }
                Err(e) => {
                    eprintln!("error: {}", e.chain());
                    std::process::exit(1);
                }
            }
        }
        Some(Commands::Config) => match toml::to_string_pretty(&config) {
            Ok(text) => print!("{text}"),
            Err(e) => {
                eprintln!("error: failed to render configuration: {e}");
                std::process::exit(1);
            }
        },
        None => {
            println!("regcode: use --help for available commands");
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn request_takes_user_arguments() {
        let cli = Cli::parse_from([
            "regcode",
            "request",
            "--user-id",
            "42",
            "--username",
            "alice",
        ]);
        match cli.command {
            Some(Commands::Request { user_id, username }) => {
                assert_eq!(user_id, "42");
                assert_eq!(username, "alice");
            }
            other => panic!("expected request, got {other:?}"),
        }
    }

    #[test]
    fn config_path_is_global() {
        let cli = Cli::parse_from(["regcode", "serve", "--config", "/tmp/regcode.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/regcode.toml")));
        assert!(matches!(cli.command, Some(Commands::Serve)));
    }

    #[test]
    fn binary_loads_inline_config() {
        let config = regcode_config::load_and_validate_str("[api]\nurl = \"http://localhost:9\"\n")
            .expect("minimal config should be valid");
        assert_eq!(config.bot.command, "!codigo");
    }
}
