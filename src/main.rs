use clap::Parser;
use snpedia_etl::utils::{logger, validation::Validate};
use snpedia_etl::{AnnotationPipeline, CliConfig, EtlEngine, LocalStorage, MediaWikiClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    logger::init_logger(config.verbose, config.json_logs);

    tracing::info!("Starting snpedia-etl");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let fetcher = match MediaWikiClient::new(config.fetch_settings()) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            eprintln!("❌ Could not create HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    let storage = LocalStorage::new(config.output_path.clone());
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
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            std::process::exit(e.severity().exit_code());
        }
    }

    Ok(())
}
