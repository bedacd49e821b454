// SPDX-FileCopyrightText: 2026 Trellis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trellis - a plugin application host.
//!
//! This is the binary entry point.

mod builtin;
mod env_init;
mod serve;
mod tracing_logger;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Trellis - a plugin application host.
#[derive(Parser, Debug)]
#[command(name = "trellis", version, about, long_about = None)]
struct Cli {
    /// Configuration file layered above the standard locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Host log level. `RUST_LOG` takes precedence.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Bootstrap, activate, and run until SIGINT or SIGTERM.
    Serve,
    /// Inspect the configuration.
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Print the effective configuration as JSON.
    Dump,
    /// Validate configuration files without starting anything.
    Check,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve) => {
            serve::init_tracing(&cli.log_level);
            if let Err(e) = serve::run_serve(cli.config).await {
                eprintln!("trellis: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Config { action }) => match action {
            ConfigCommands::Dump => match serve::dump_config(cli.config).await {
                Ok(dumped) => println!("{dumped}"),
                Err(e) => {
                    eprintln!("trellis: {e}");
                    std::process::exit(1);
                }
            },
            ConfigCommands::Check => match serve::check_config(cli.config).await {
                Ok(_) => println!("trellis: configuration OK"),
                Err(e) => {
                    trellis_config::render_errors(&[e]);
                    std::process::exit(1);
                }
            },
        },
        None => {
            println!("trellis: use --help for available commands");
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
    fn global_flags_follow_subcommands() {
        let cli = Cli::parse_from(["trellis", "config", "check", "--config", "/etc/t.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/t.toml")));
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                action: ConfigCommands::Check
            })
        ));
        assert_eq!(cli.log_level, "info");
    }
}
