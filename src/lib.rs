pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod markup;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{cli::LocalStorage, CliConfig};

pub use adapters::mediawiki::{FetchSettings, MediaWikiClient};
pub use config::toml_config::TomlConfig;
pub use core::{etl::EtlEngine, pipeline::AnnotationPipeline};
pub use domain::model::{DiversityTable, Extracted, SnpAnnotation, WikiPage};
pub use utils::error::{EtlError, Result};
