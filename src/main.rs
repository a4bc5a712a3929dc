use anyhow::{Context as _, Result};
use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, warn, Level};
use tracing_subscriber::FmtSubscriber;
use vidtranscribe::cli::{self, Args};
use vidtranscribe::config::Config;
use vidtranscribe::pipeline::Context;

/// Exit status used when interrupted with Ctrl+C.
const INTERRUPTED_EXIT_CODE: i32 = 130;

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

async fn run(args: Args) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    debug!("Configuration: {:?}", Config { openai_api_key: None, ..config.clone() });

    let ctx = Context::new(config).with_progress(!args.quiet);

    // Unlocked handles: spinners draw to stderr from their own thread.
    cli::run(
        args.command,
        &ctx,
        &mut std::io::stdout(),
        &mut std::io::stderr(),
    )
    .await?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    init_logging(args.verbose);

    if let Err(e) = ctrlc::set_handler(|| {
        warn!("Interrupted, stopping");
        std::process::exit(INTERRUPTED_EXIT_CODE);
    }) {
        warn!("Could not install Ctrl+C handler: {e}");
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
