#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::adapters::mediawiki::{FetchSettings, SNPEDIA_ENDPOINT, USER_AGENT};
#[cfg(feature = "cli")]
use crate::domain::ports::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "cli")]
use std::time::Duration;

pub const DEFAULT_BUNDLE_FILENAME: &str = "snpedia_annotations.zip";

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "snpedia-etl")]
#[command(about = "Fetch SNPedia pages and extract citations, diversity tables and cross-references")]
pub struct CliConfig {
    /// Accessions to annotate, e.g. rs737865,rs1800497
    #[arg(long, value_delimiter = ',', required = true)]
    pub accessions: Vec<String>,

    #[arg(long, default_value = SNPEDIA_ENDPOINT)]
    pub api_endpoint: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, default_value = DEFAULT_BUNDLE_FILENAME)]
    pub bundle_filename: String,

    #[arg(long, value_delimiter = ',', default_value = "json,csv,tsv")]
    pub output_formats: Vec<String>,

    #[arg(long, default_value = "5")]
    pub concurrent_requests: usize,

    #[arg(long, default_value = USER_AGENT)]
    pub user_agent: String,

    #[arg(long, default_value = "30")]
    pub timeout_seconds: u64,

    #[arg(long, default_value = "2")]
    pub retry_attempts: u32,

    #[arg(long, default_value = "1")]
    pub retry_delay_seconds: u64,

    #[arg(long, help = "Treat a diversity table with a partial trailing row as an error")]
    pub strict_tables: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            endpoint: self.api_endpoint.clone(),
            user_agent: self.user_agent.clone(),
            timeout: Duration::from_secs(self.timeout_seconds),
            retry_attempts: self.retry_attempts,
            retry_delay: Duration::from_secs(self.retry_delay_seconds),
        }
    }
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn accessions(&self) -> &[String] {
        &self.accessions
    }

    fn concurrent_requests(&self) -> usize {
        self.concurrent_requests
    }

    fn strict_tables(&self) -> bool {
        self.strict_tables
    }

    fn output_formats(&self) -> &[String] {
        &self.output_formats
    }

    fn bundle_filename(&self) -> &str {
        &self.bundle_filename
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("api_endpoint", &self.api_endpoint)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_path("bundle_filename", &self.bundle_filename)?;
        validation::validate_accessions("accessions", &self.accessions)?;
        validation::validate_output_formats("output_formats", &self.output_formats)?;
        validation::validate_positive_number("concurrent_requests", self.concurrent_requests, 1)?;
        validation::validate_range("timeout_seconds", self.timeout_seconds, 1, 600)?;
        validation::validate_non_empty_string("user_agent", &self.user_agent)?;
        Ok(())
    }
}
