pub mod etl;
pub mod pipeline;

pub use crate::domain::model::{AnnotationBatch, SnpAnnotation, WikiPage};
pub use crate::domain::ports::{ConfigProvider, PageFetcher, Pipeline, Storage};
pub use crate::utils::error::Result;
