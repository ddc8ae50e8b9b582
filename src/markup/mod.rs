//! Fact extraction from SNPedia page markup.
//!
//! Pages are MediaWiki text built from `{{Name|field|key=value}}` templates.
//! Every function here is a pure pass over one page; absence of a template
//! is reported through [`Extracted::note`], never as an error.

pub mod cleaner;
pub mod extractors;
pub mod fields;
pub mod scanner;

use chrono::{DateTime, Utc};

use crate::domain::model::{Extracted, SnpAnnotation, WikiPage};

pub use cleaner::clean_markup;
pub use extractors::{
    extract_canonical_accession, extract_citations, extract_cross_references, extract_omim,
    extract_pharmgkb, extract_population_diversity, extract_population_diversity_strict,
};
pub use fields::{decode_fields, Field, FieldList};
pub use scanner::{scan_blocks, scan_nested_blocks};

fn take<T>(extracted: Extracted<T>, notes: &mut Vec<String>) -> T {
    let (value, note) = extracted.into_parts();
    notes.extend(note);
    value
}

/// Runs the cleaner and every extractor over one page.
///
/// With `strict_tables`, a malformed diversity table leaves `diversity`
/// empty and records the error as a note; the rest of the page is still
/// annotated.
pub fn annotate(page: &WikiPage, strict_tables: bool, fetched_at: DateTime<Utc>) -> SnpAnnotation {
    let markup = page.markup.as_str();
    let mut notes = Vec::new();

    let canonical_accession = take(extract_canonical_accession(markup), &mut notes);
    let citations = take(extract_citations(markup), &mut notes);
    let diversity = if strict_tables {
        match extract_population_diversity_strict(markup) {
            Ok(extracted) => take(extracted, &mut notes),
            Err(e) => {
                notes.push(e.to_string());
                None
            }
        }
    } else {
        take(extract_population_diversity(markup), &mut notes)
    };
    let omim = take(extract_omim(markup), &mut notes);
    let pharmgkb = take(extract_pharmgkb(markup), &mut notes);

    SnpAnnotation {
        accession: page.accession.clone(),
        canonical_accession,
        citations,
        diversity,
        omim,
        pharmgkb,
        summary: clean_markup(markup),
        notes,
        fetched_at,
    }
}
