use anyhow::Context;
use clap::Parser;
use feed_snapshot::{
    load_sources, Cli, DomainLimiter, Fetcher, GoogleTranslateClient, HttpFeedClient,
    SnapshotPipeline, Translator,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let sources = load_sources(&cli.sources)
        .with_context(|| format!("Failed to read sources file {}", cli.sources.display()))?;

    let fetch_config = cli.fetch_config();
    let client = HttpFeedClient::new(&fetch_config).context("Failed to build HTTP client")?;
    let limiter = Arc::new(DomainLimiter::new(fetch_config.domain_concurrency));
    let fetcher = Fetcher::new(Arc::new(client), limiter, fetch_config);

    let translator = if cli.skip_translation {
        info!("Translation disabled");
        None
    } else {
        let translate_config = cli.translate_config();
        let client = GoogleTranslateClient::new(&translate_config)
            .context("Failed to build translation client")?;
        Some(Translator::new(Arc::new(client), translate_config))
    };

    let pipeline = SnapshotPipeline::new(fetcher, translator);
    let report = pipeline.run(&sources.categories).await;

    report
        .snapshot
        .write_atomic(&cli.output)
        .with_context(|| format!("Failed to write snapshot to {}", cli.output.display()))?;

    println!(
        "Done! Total: {} items, {} errors",
        report.total_items, report.total_errors
    );
    println!("Output: {}", cli.output.display());

    Ok(())
}
