use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw markup of one annotation page, as returned by a [`PageFetcher`].
///
/// [`PageFetcher`]: crate::domain::ports::PageFetcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WikiPage {
    pub accession: String,
    pub markup: String,
}

/// An extractor result together with the diagnostic it produced, if any.
///
/// Absence of data is never an error: extractors return an empty or `None`
/// value and explain it in `note`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted<T> {
    pub value: T,
    pub note: Option<String>,
}

impl<T> Extracted<T> {
    pub fn found(value: T) -> Self {
        Self { value, note: None }
    }

    pub fn with_note(value: T, note: impl Into<String>) -> Self {
        Self {
            value,
            note: Some(note.into()),
        }
    }

    pub fn into_parts(self) -> (T, Option<String>) {
        (self.value, self.note)
    }
}

impl<T> Extracted<Option<T>> {
    pub fn absent(note: impl Into<String>) -> Self {
        Self::with_note(None, note)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenotypeDeclaration {
    pub label: String,
    pub genotype: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationFrequencies {
    pub population: String,
    pub frequencies: Vec<String>,
}

/// Genotype declarations and per-population frequencies from one
/// `population diversity` block.
///
/// `frequencies[i]` of every population belongs to `genotypes[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiversityTable {
    pub genotypes: Vec<GenotypeDeclaration>,
    pub populations: Vec<PopulationFrequencies>,
}

impl DiversityTable {
    pub fn genotype(&self, label: &str) -> Option<&str> {
        self.genotypes
            .iter()
            .find(|g| g.label == label)
            .map(|g| g.genotype.as_str())
    }

    pub fn frequencies(&self, population: &str) -> Option<&[String]> {
        self.populations
            .iter()
            .find(|p| p.population == population)
            .map(|p| p.frequencies.as_slice())
    }

    /// Declares a genotype column. Redeclaring a label replaces its genotype
    /// and keeps the original column.
    pub fn declare_genotype(&mut self, label: String, genotype: String) {
        match self.genotypes.iter_mut().find(|g| g.label == label) {
            Some(existing) => existing.genotype = genotype,
            None => self.genotypes.push(GenotypeDeclaration { label, genotype }),
        }
    }

    /// Inserts a row, replacing an earlier row for the same population.
    pub fn insert_population(&mut self, population: String, frequencies: Vec<String>) {
        match self
            .populations
            .iter_mut()
            .find(|p| p.population == population)
        {
            Some(existing) => existing.frequencies = frequencies,
            None => self.populations.push(PopulationFrequencies {
                population,
                frequencies,
            }),
        }
    }
}

/// Everything mined from one annotation page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnpAnnotation {
    pub accession: String,
    pub canonical_accession: Option<String>,
    pub citations: Vec<String>,
    pub diversity: Option<DiversityTable>,
    pub omim: Vec<String>,
    pub pharmgkb: Vec<String>,
    pub summary: String,
    pub notes: Vec<String>,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct AnnotationBatch {
    pub annotations: Vec<SnpAnnotation>,
    pub citations_csv: String,
    pub diversity_tsv: String,
}

/// One row of a tab-delimited genotyping file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenotypeCall {
    pub rsid: String,
    pub chromosome: String,
    pub position: i64,
    pub genotype: String,
}
