//! featx - Extract product features from text descriptions with an LLM.

use clap::Parser;
use featx_cli::{
    console_level, init_logging, progress_bar, progress_callback, run, Cli, Config, Formatter,
};
use featx_llm::ProviderFactory;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let env_loaded = dotenvy::dotenv_override();
    let cli = Cli::parse();

    let level = console_level(cli.verbose, cli.quiet);
    if let Err(e) = init_logging(level, cli.log_file().map(|p| p.as_path())) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    if let Err(e) = env_loaded {
        if !e.not_found() {
            warn!(error = %e, "Could not load .env file");
        }
    }

    let formatter = Formatter::new(!cli.no_color);
    let bar = progress_bar(cli.quiet);
    let outcome = execute(&cli, progress_callback(bar.clone())).await;
    bar.finish_and_clear();

    match outcome {
        Ok(summary) => {
            info!(
                total = summary.total,
                succeeded = summary.succeeded,
                partial = summary.partial,
                failed = summary.failed,
                "Feature extraction completed"
            );
            if !cli.quiet {
                println!("{}", formatter.format_reports(&summary.per_file));
                println!("{}", formatter.format_totals(&summary));
            }
        }
        Err(e) => {
            error!("{}", e);
            if !cli.quiet {
                eprintln!("{}", formatter.error(&e.to_string()));
            }
            std::process::exit(1);
        }
    }
}

async fn execute(
    cli: &Cli,
    progress: featx_batch::ProgressCallback,
) -> featx_cli::Result<featx_batch::RunSummary> {
    let config = Config::load(cli.config.as_deref())?;
    let factory = ProviderFactory::from_env().with_request_timeout(config.request_timeout());

    let cancel = CancellationToken::new();
    let watcher = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, finishing in-flight files");
            watcher.cancel();
        }
    });

    run(&config, &factory, cancel, Some(progress)).await
}
