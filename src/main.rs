mod api;
mod cleanup;
mod config;
mod error;
mod fs;
mod json;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;
use crate::api::BrowserStackApi;
use crate::config::{CliOverrides, Config, FileConfig};
use crate::error::CleanupError;

/// Delete BrowserStack App Live uploads tagged with a custom id.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Custom id the uploads were tagged with
    custom_id: String,

    /// List what would be deleted without deleting anything
    #[arg(long)]
    dry_run: bool,

    /// BrowserStack App Live API base URL
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Path to a TOML config file
    #[arg(long, value_name = "PATH")]
    config: Option<String>,
}

fn parse_cli<I, T>(args: I) -> std::result::Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}

async fn run(cli: Cli) -> Result<()> {
    if cli.custom_id.trim().is_empty() {
        return Err(CleanupError::Usage("custom id must not be empty".to_string()).into());
    }
    let file_config = FileConfig::load(cli.config.as_deref())?;
    let overrides = CliOverrides { api_url: cli.api_url };
    let config = Config::from_env(&overrides, file_config)?;

    let api = BrowserStackApi::new(&config);
    let report = cleanup::run(&api, &cli.custom_id, cli.dry_run).await?;
    report.display();
    Ok(())
}

fn exit_code(error: &anyhow::Error) -> i32 {
    error
        .downcast_ref::<CleanupError>()
        .map(CleanupError::exit_code)
        .unwrap_or(1)
}

#[tokio::main]
async fn main() {
    let cli = match parse_cli(std::env::args_os()) {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let usage = CleanupError::Usage(e.kind().as_str().unwrap_or("invalid arguments").to_string());
            cleanup::print_error(&usage.to_string());
            eprintln!("{}", e.render());
            std::process::exit(usage.exit_code());
        }
    };

    if let Err(error) = run(cli).await {
        cleanup::print_error(&format!("{:#}", error));
        std::process::exit(exit_code(&error));
    }
}
