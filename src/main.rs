//! Betslip OCR
//!
//! Discord bot and batch CLI that read sports-betting slip screenshots with
//! Tesseract and turn the recognized text into a readable summary.

mod batch;
mod bot;
mod config;
mod error;
mod ocr;
mod paths;
mod progress;
mod slip;
mod tools;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::load_config;

/// Betting slip OCR bot and batch tools
#[derive(Parser, Debug)]
#[command(name = "betslip-ocr", version)]
#[command(about = "OCR sports-betting slip screenshots from Discord or local files")]
struct Args {
    /// Path to config.json (default: working directory, then next to the executable)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the Discord bot
    Bot,
    /// OCR every image under the configured image locations
    Batch,
    /// Register slash commands for the configured guild
    DeployCommands,
    /// Check that the Discord environment values are set
    CheckConfig,
    /// Summarize saved batch reports
    ViewResults,
}

fn install_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        let msg = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        let location = panic_info
            .location()
            .map(|loc| format!(" at {}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_default();
        tracing::error!("[PANIC]{} {}", location, msg);
    }));
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,serenity=warn".into()),
        )
        .init();
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logging();
    install_panic_hook();

    let args = Args::parse();

    match args.command {
        Command::CheckConfig => {
            tools::run_check_config();
            Ok(())
        }
        Command::ViewResults => {
            let config = load_config(args.config.as_deref());
            tools::run_view_results(&config.output_dir)
        }
        Command::Batch => {
            let config = load_config(args.config.as_deref());
            paths::ensure_directories(&config)?;
            tracing::info!("Batch OCR starting");
            batch::run_batch(&config)?;
            tracing::info!("Batch OCR complete");
            Ok(())
        }
        Command::Bot => {
            let config = load_config(args.config.as_deref());
            runtime()?.block_on(bot::run_bot(config))
        }
        Command::DeployCommands => {
            let config = load_config(args.config.as_deref());
            runtime()?.block_on(tools::deploy_commands(&config))
        }
    }
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}
