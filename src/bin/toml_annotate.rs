use clap::Parser;
use snpedia_etl::core::ConfigProvider;
use snpedia_etl::utils::{logger, validation::Validate};
use snpedia_etl::{AnnotationPipeline, EtlEngine, LocalStorage, MediaWikiClient, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-annotate")]
#[command(about = "Annotate SNPedia pages using a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "snpedia-etl.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Override strict diversity tables from config
    #[arg(long)]
    strict_tables: Option<bool>,

    /// Dry run - show what would be fetched without executing
    #[arg(long)]
    dry_run: bool,
}

fn display_config_summary(config: &TomlConfig) {
    tracing::info!("📋 Pipeline: {}", config.pipeline.name);
    if let Some(description) = &config.pipeline.description {
        tracing::info!("   {}", description);
    }
    tracing::info!("🌐 Endpoint: {}", config.api_endpoint());
    tracing::info!(
        "🧬 Accessions: {} ({} concurrent requests)",
        config.accessions().len(),
        config.concurrent_requests()
    );
    tracing::info!(
        "📦 Output: {}/{} [{}]",
        config.output_path(),
        config.bundle_filename(),
        config.output_formats().join(", ")
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    logger::init_logger(args.verbose, args.json_logs);

    tracing::info!("📁 Loading configuration from: {}", args.config);

    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if let Some(strict) = args.strict_tables {
        config.extract.strict_tables = Some(strict);
        tracing::info!("🔧 Strict tables overridden to: {}", strict);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No pages will be fetched");
        for accession in config.accessions() {
            println!("would fetch {}", accession);
        }
        return Ok(());
    }

    let fetcher = MediaWikiClient::new(config.fetch_settings())?;
    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = AnnotationPipeline::new(storage, config, fetcher);
    let engine = EtlEngine::new(pipeline);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Annotation run completed");
            println!("✅ Annotations saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Annotation run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            std::process::exit(e.severity().exit_code());
        }
    }

    Ok(())
}
