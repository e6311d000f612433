use clap::Parser;
use logfold::{Config, RunMode};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "logfold", about = "Fold gzip log exports into ranked per-level summaries")]
struct Cli {
    /// Which stages to run.
    #[arg(value_enum)]
    mode: RunMode,

    /// Directory searched recursively for compressed export files.
    #[arg(long)]
    source: Option<PathBuf>,

    /// Working directory; reset on every unpack.
    #[arg(long)]
    destination: Option<PathBuf>,

    /// Maximum number of files processed at the same time.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    concurrency: Option<u64>,

    /// TOML config file (defaults to ./logfold.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log progress for every file.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(source) = cli.source {
        config.pipeline.source = source;
    }
    if let Some(destination) = cli.destination {
        config.pipeline.destination = destination;
    }
    if let Some(concurrency) = cli.concurrency {
        config.pipeline.concurrency = usize::try_from(concurrency)?;
    }

    tracing::debug!(?config, mode = ?cli.mode, "starting run");
    let outcome = logfold::run(cli.mode, &config).await?;

    for path in &outcome.written {
        println!("{}", path.display());
    }
    Ok(())
}
