use crate::core::Pipeline;
use crate::utils::error::Result;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting annotation run");

        let pages = self.pipeline.extract().await?;
        tracing::info!("Fetched {} pages", pages.len());

        let batch = self.pipeline.transform(pages).await?;
        let with_tables = batch
            .annotations
            .iter()
            .filter(|a| a.diversity.is_some())
            .count();
        tracing::info!(
            "Annotated {} pages ({} with population diversity tables)",
            batch.annotations.len(),
            with_tables
        );

        let output_path = self.pipeline.load(batch).await?;
        tracing::info!("Output saved to: {}", output_path);

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AnnotationBatch, WikiPage};
    use crate::utils::error::EtlError;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Default)]
    struct RecordingPipeline {
        fail_extract: bool,
        loaded: AtomicBool,
    }

    #[async_trait::async_trait]
    impl Pipeline for RecordingPipeline {
        async fn extract(&self) -> Result<Vec<WikiPage>> {
            if self.fail_extract {
                return Err(EtlError::ProcessingError {
                    message: "All 1 page fetches failed".to_string(),
                });
            }
            Ok(vec![WikiPage {
                accession: "rs1".to_string(),
                markup: "{{Rsnum|rs1}}".to_string(),
            }])
        }

        async fn transform(&self, pages: Vec<WikiPage>) -> Result<AnnotationBatch> {
            assert_eq!(pages.len(), 1);
            Ok(AnnotationBatch {
                annotations: vec![],
                citations_csv: String::new(),
                diversity_tsv: String::new(),
            })
        }

        async fn load(&self, _batch: AnnotationBatch) -> Result<String> {
            self.loaded.store(true, Ordering::SeqCst);
            Ok("out/bundle.zip".to_string())
        }
    }

    #[test]
    fn test_run_drives_all_phases() {
        let engine = EtlEngine::new(RecordingPipeline::default());
        let path = tokio_test::block_on(engine.run()).unwrap();
        assert_eq!(path, "out/bundle.zip");
        assert!(engine.pipeline.loaded.load(Ordering::SeqCst));
    }

    #[test]
    fn test_run_stops_on_extract_error() {
        let engine = EtlEngine::new(RecordingPipeline {
            fail_extract: true,
            ..Default::default()
        });
        assert!(tokio_test::block_on(engine.run()).is_err());
        assert!(!engine.pipeline.loaded.load(Ordering::SeqCst));
    }
}
