// Adapters layer: concrete implementations for external systems.

pub mod genotype_db;
pub mod mediawiki;
