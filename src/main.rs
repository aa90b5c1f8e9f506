use std::time::Duration;

use clap::Parser;
use design_qa::cli::commands::{RenderedInput, cmd_compare, cmd_raster, cmd_tokens};
use design_qa::cli::config::{Cli, Commands, EmbeddingOverrides, build_comparator, load_config};
use design_qa::error::QaError;
use design_qa::model::result_model::Readiness;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = load_config(cli.config.as_deref());

    match cli.command {
        Commands::Compare {
            design,
            rendered,
            url,
            script,
            format,
            output,
            embedder,
            timeout_secs,
        } => {
            // Resolve settings: CLI > config > defaults
            let comparator = build_comparator(
                &config,
                &EmbeddingOverrides {
                    provider: embedder,
                    endpoint: cli.ollama_endpoint.as_deref(),
                    model: cli.ollama_model.as_deref(),
                },
            );
            let timeout = Duration::from_secs(timeout_secs.unwrap_or(config.timeout_secs));

            let input = match (rendered, url) {
                (_, Some(url)) => RenderedInput::Live { url, script },
                (Some(path), None) => RenderedInput::Snapshot(path),
                (None, None) => return Err("either --rendered or --url is required".into()),
            };

            match cmd_compare(&comparator, &design, input, format, output.as_deref(), timeout).await
            {
                Ok(Readiness::NeedsMajorFixes) => std::process::exit(1),
                Ok(_) => {}
                Err(e) if e.downcast_ref::<QaError>().is_some_and(QaError::is_timeout) => {
                    eprintln!("Timed out: {}", e);
                    std::process::exit(2);
                }
                Err(e) => return Err(e),
            }
        }
        Commands::Raster {
            design,
            live,
            threshold,
            diff_output,
        } => {
            cmd_raster(&design, &live, threshold, diff_output.as_deref())?;
        }
        Commands::Tokens { design } => {
            cmd_tokens(&design)?;
        }
    }

    Ok(())
}
