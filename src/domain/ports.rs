use crate::domain::model::{AnnotationBatch, WikiPage};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn output_path(&self) -> &str;
    fn accessions(&self) -> &[String];
    fn concurrent_requests(&self) -> usize;
    fn strict_tables(&self) -> bool;
    fn output_formats(&self) -> &[String];
    fn bundle_filename(&self) -> &str;
}

/// Source of raw page markup for a variant accession.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, accession: &str) -> Result<String>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<WikiPage>>;
    async fn transform(&self, pages: Vec<WikiPage>) -> Result<AnnotationBatch>;
    async fn load(&self, batch: AnnotationBatch) -> Result<String>;
}
