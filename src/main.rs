mod cli;
mod config;
mod connection;
mod module;
mod reconcile;
mod resource;
mod schema;

use anyhow::{Context as _, Result};
use clap::Parser;
use cli::Cli;
use connection::HttpConnector;
use module::ModuleResult;
use std::io::{self, Write};

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub check_mode: bool,
    pub diff_mode: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    // stdout carries the result document, so logs go to stderr
    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .init();

    if cli.describe {
        let mut out = io::stdout().lock();
        serde_json::to_writer_pretty(&mut out, &schema::MODULE_DOC)
            .context("Failed to write module documentation")?;
        writeln!(out)?;
        return Ok(());
    }

    let result = execute(&cli);
    result
        .emit(io::stdout().lock())
        .context("Failed to write result")?;

    if result.failed {
        std::process::exit(result.exit_code());
    }
    Ok(())
}

fn execute(cli: &Cli) -> ModuleResult {
    if let Err(e) = connection::check_capabilities() {
        log::error!("{e}");
        return e.into();
    }

    let invocation = match config::load(cli.args_file.as_deref()) {
        Ok(invocation) => invocation,
        Err(e) => {
            log::error!("{e:#}");
            return ModuleResult::fail(format!("{e:#}"));
        }
    };

    let ctx = Context {
        verbose: cli.verbose,
        check_mode: cli.check || invocation.check_mode,
        diff_mode: cli.diff || invocation.diff_mode,
    };
    if ctx.check_mode {
        log::info!("Running in check mode");
    }

    match reconcile::run(&HttpConnector::default(), &invocation.args, &ctx) {
        Ok(result) => result,
        Err(e) => {
            log::error!("{e}");
            e.into()
        }
    }
}
