//! MindMeld - rewrite the readable text of web pages through a local model.
//!
//! Main entry point for the MindMeld CLI.

mod app;
mod cli;
mod cmd_page;
mod cmd_prefs;
mod cmd_serve;

use std::path::Path;

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{Cli, Commands};

/// Initialize tracing on stderr, plus `log_file` when given.
///
/// Stdout stays reserved for command output. The returned guard flushes the
/// file writer on drop.
fn init_tracing(log_file: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
            std::fs::create_dir_all(dir)?;
            let name = path.file_name().unwrap_or(path.as_os_str());
            let appender = tracing_appender::rolling::never(dir, name);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(non_blocking).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_tracing(cli.log_file.as_deref())?;

    let config = app::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Rewrite {
            input,
            output,
            profile,
            theme,
        } => {
            cmd_page::rewrite(&config, &input, output.as_deref(), profile, theme.as_deref()).await
        }
        Commands::Restore { input, output } => cmd_page::restore(&input, output.as_deref()).await,
        Commands::Extract { input } => cmd_page::extract(&config, &input).await,
        Commands::Compare { pages } => cmd_page::compare(&config, &pages).await,
        Commands::Serve { input, output } => cmd_serve::serve(&config, &input, output.as_deref()).await,
        Commands::Prompts => cmd_prefs::prompts(),
        Commands::Themes => cmd_prefs::themes(),
        Commands::Prefs { action } => cmd_prefs::handle_prefs_command(&config, action).await,
    }
}
