// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Trellis - a template precompiler
//!
//! This is the main entry point for the trellis CLI.
//!
//! ## Features
//!
//! - Parallel precompilation of template AST files
//! - Wire-format debugging output
//! - Lowering to VM instructions against a configured resolver

mod cli;
mod commands;
mod config;

use std::process::ExitCode;

use clap::Parser;
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Commands};
use config::Config;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{}: {error:#}", "Error".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    init_tracing(cli.verbose, &config.loglevel);

    match &cli.command {
        Commands::Precompile(args) => commands::precompile_files(args, &config),
        Commands::Debug(args) => commands::debug_file(args, &config),
        Commands::Lower(args) => commands::lower_file(args, &config),
    }
}

/// Logs to stderr. `RUST_LOG` overrides the configured level.
fn init_tracing(verbose: bool, loglevel: &str) {
    let filter = if verbose {
        EnvFilter::new("trellis=debug,trellis_compiler=debug,trellis_opcode=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(loglevel))
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
