use crate::core::{AnnotationBatch, ConfigProvider, PageFetcher, Pipeline, SnpAnnotation, Storage, WikiPage};
use crate::markup::annotate;
use crate::utils::error::{EtlError, Result};
use chrono::Utc;
use std::io::Write;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use zip::write::{FileOptions, ZipWriter};

/// Fetches the configured accessions, annotates each page and bundles the
/// results into a ZIP archive.
pub struct AnnotationPipeline<S: Storage, C: ConfigProvider, F: PageFetcher> {
    storage: S,
    config: C,
    fetcher: Arc<F>,
}

impl<S: Storage, C: ConfigProvider, F: PageFetcher> AnnotationPipeline<S, C, F> {
    pub fn new(storage: S, config: C, fetcher: F) -> Self {
        Self {
            storage,
            config,
            fetcher: Arc::new(fetcher),
        }
    }
}

fn csv_bytes_to_string(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| EtlError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| EtlError::ProcessingError {
        message: format!("Generated output is not UTF-8: {}", e),
    })
}

/// `accession,pmid`, one row per citation.
pub fn render_citations_csv(annotations: &[SnpAnnotation]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(["accession", "pmid"])?;
    for annotation in annotations {
        for pmid in &annotation.citations {
            wtr.write_record([annotation.accession.as_str(), pmid.as_str()])?;
        }
    }
    csv_bytes_to_string(wtr)
}

/// One row per (accession, population, genotype) frequency.
pub fn render_diversity_tsv(annotations: &[SnpAnnotation]) -> Result<String> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(Vec::new());
    wtr.write_record(["accession", "population", "genotype_label", "genotype", "frequency"])?;

    for annotation in annotations {
        let Some(table) = &annotation.diversity else {
            continue;
        };
        for row in &table.populations {
            for (declaration, frequency) in table.genotypes.iter().zip(&row.frequencies) {
                wtr.write_record([
                    annotation.accession.as_str(),
                    row.population.as_str(),
                    declaration.label.as_str(),
                    declaration.genotype.as_str(),
                    frequency.as_str(),
                ])?;
            }
        }
    }
    csv_bytes_to_string(wtr)
}

#[async_trait::async_trait]
impl<S, C, F> Pipeline for AnnotationPipeline<S, C, F>
where
    S: Storage,
    C: ConfigProvider,
    F: PageFetcher + 'static,
{
    async fn extract(&self) -> Result<Vec<WikiPage>> {
        let accessions = self.config.accessions().to_vec();
        let requested = accessions.len();
        let semaphore = Arc::new(Semaphore::new(self.config.concurrent_requests().max(1)));
        let mut tasks = JoinSet::new();

        tracing::debug!(
            "Fetching {} pages from {} ({} at a time)",
            requested,
            self.config.api_endpoint(),
            self.config.concurrent_requests()
        );

        for (index, accession) in accessions.into_iter().enumerate() {
            let fetcher = Arc::clone(&self.fetcher);
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let result = fetcher.fetch(&accession).await;
                (index, accession, result)
            });
        }

        let mut fetched = Vec::with_capacity(requested);
        let mut failures = 0;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, accession, Ok(markup))) => {
                    tracing::debug!("Fetched {} ({} bytes)", accession, markup.len());
                    fetched.push((index, WikiPage { accession, markup }));
                }
                Ok((_, accession, Err(e))) => {
                    failures += 1;
                    tracing::warn!("Skipping {}: {}", accession, e);
                }
                Err(e) => {
                    failures += 1;
                    tracing::error!("Fetch task failed: {}", e);
                }
            }
        }

        if fetched.is_empty() && failures > 0 {
            return Err(EtlError::ProcessingError {
                message: format!("All {} page fetches failed", failures),
            });
        }

        fetched.sort_by_key(|(index, _)| *index);
        Ok(fetched.into_iter().map(|(_, page)| page).collect())
    }

    async fn transform(&self, pages: Vec<WikiPage>) -> Result<AnnotationBatch> {
        let fetched_at = Utc::now();
        let strict = self.config.strict_tables();

        let annotations: Vec<SnpAnnotation> = pages
            .iter()
            .map(|page| {
                let annotation = annotate(page, strict, fetched_at);
                for note in &annotation.notes {
                    tracing::debug!("{}: {}", annotation.accession, note);
                }
                annotation
            })
            .collect();

        Ok(AnnotationBatch {
            citations_csv: render_citations_csv(&annotations)?,
            diversity_tsv: render_diversity_tsv(&annotations)?,
            annotations,
        })
    }

    async fn load(&self, batch: AnnotationBatch) -> Result<String> {
        let filename = self.config.bundle_filename();
        let output_path = format!("{}/{}", self.config.output_path(), filename);

        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

            for format in self.config.output_formats() {
                match format.as_str() {
                    "json" => {
                        zip.start_file::<_, ()>("annotations.json", FileOptions::default())?;
                        let json_data = serde_json::to_string_pretty(&batch.annotations)?;
                        zip.write_all(json_data.as_bytes())?;
                    }
                    "csv" => {
                        zip.start_file::<_, ()>("citations.csv", FileOptions::default())?;
                        zip.write_all(batch.citations_csv.as_bytes())?;
                    }
                    "tsv" => {
                        zip.start_file::<_, ()>("diversity.tsv", FileOptions::default())?;
                        zip.write_all(batch.diversity_tsv.as_bytes())?;
                    }
                    other => tracing::warn!("Ignoring unknown output format: {}", other),
                }
            }

            let cursor = zip.finish()?;
            cursor.into_inner()
        };

        tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
        self.storage.write_file(filename, &zip_data).await?;

        Ok(output_path)
    }
}
