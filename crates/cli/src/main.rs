// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! dockhand - ephemeral container build agents

mod commands;
mod config;
mod env;
mod exit_error;
mod interrupt;
mod logging;
mod stdio;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands::{launch, reap};
use crate::config::Config;
use crate::exit_error::ExitError;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "+", env!("BUILD_GIT_HASH"));

#[derive(Parser, Debug)]
#[command(name = "dockhand", version = VERSION, about = "Run build agents in throwaway containers")]
struct Cli {
    /// Config file (default: $DOCKHAND_CONFIG, else built-in defaults)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Pull an image, start an agent in it, and bridge the agent to stdin/stdout
    Launch(launch::LaunchArgs),
    /// Stop and remove a container left behind by a dead launch
    Reap(reap::ReapArgs),
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let _log_guard = logging::init(&config)?;

    match cli.command {
        Command::Launch(args) => launch::handle(args, &config).await,
        Command::Reap(args) => reap::handle(args, &config).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let code = match run(cli).await {
        Ok(()) => 0,
        Err(e) => {
            let (code, message) = ExitError::report(&e);
            eprintln!("dockhand: {message}");
            code
        }
    };
    // Exit directly: a blocked stdin reader would otherwise hold runtime shutdown
    std::process::exit(code);
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
