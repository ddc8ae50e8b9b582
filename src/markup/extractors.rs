use std::sync::LazyLock;

use regex::Regex;

use crate::domain::model::{DiversityTable, Extracted};
use crate::markup::fields::{decode_fields, Field};
use crate::markup::scanner::{scan_blocks, strip_newlines};
use crate::utils::error::{EtlError, Result};

pub const PMID_TEMPLATE: &str = "PMID";
pub const PMID_AUTO_TEMPLATE: &str = "PMID Auto";
pub const OMIM_TEMPLATE: &str = "omim";
pub const PHARMGKB_TEMPLATE: &str = "PharmGKB";
pub const RSNUM_TEMPLATE: &str = "Rsnum";

static DIVERSITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\spopulation\sdiversity\|\s(.*?)HapMap").unwrap()
});

const GENOTYPE_PREFIX: &str = "geno";

fn is_accession_number(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

/// PubMed accessions cited on a page.
///
/// `{{PMID|n}}` blocks come first, then the `PMID=n` fields of
/// `{{PMID Auto|...}}` blocks. Repeats are kept.
pub fn extract_citations(markup: &str) -> Extracted<Vec<String>> {
    let mut accessions: Vec<String> = scan_blocks(markup, PMID_TEMPLATE)
        .into_iter()
        .filter(|payload| is_accession_number(payload))
        .collect();

    for payload in scan_blocks(markup, PMID_AUTO_TEMPLATE) {
        let fields = decode_fields(&payload);
        accessions.extend(fields.iter().filter_map(|field| match field {
            Field::Keyed { key, value } if key == "PMID" && is_accession_number(value) => {
                Some(value.clone())
            }
            _ => None,
        }));
    }

    if accessions.is_empty() {
        Extracted::with_note(accessions, "No PMID citations found")
    } else {
        Extracted::found(accessions)
    }
}

fn diversity_region(markup: &str) -> Option<String> {
    let flat = strip_newlines(markup);
    DIVERSITY_RE
        .captures(&flat)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Decodes the flat field list in two passes: genotype declarations first,
/// then rows of `population, freq_1..freq_k` where k is the number of
/// distinct genotype labels. Row values keep their trimmed source text.
/// Returns the table, the row width and the number of row fields decoded.
/// Fields past the last full row are dropped.
fn decode_diversity(region: &str) -> (DiversityTable, usize, usize) {
    let mut table = DiversityTable::default();
    let mut rows: Vec<String> = Vec::new();

    for text in region.split('|').map(str::trim).filter(|t| !t.is_empty()) {
        match Field::parse(text) {
            Field::Keyed { key, value } if key.starts_with(GENOTYPE_PREFIX) => {
                table.declare_genotype(key, value);
            }
            Field::Positional(label) if label.starts_with(GENOTYPE_PREFIX) => {
                table.declare_genotype(label, String::new());
            }
            _ => rows.push(text.to_string()),
        }
    }

    let width = table.genotypes.len() + 1;
    for row in rows.chunks_exact(width) {
        table.insert_population(row[0].clone(), row[1..].to_vec());
    }

    (table, width, rows.len())
}

/// Genotype frequencies by population from the `population diversity`
/// block. A trailing row with too few values is dropped and reported in the
/// note.
pub fn extract_population_diversity(markup: &str) -> Extracted<Option<DiversityTable>> {
    let Some(region) = diversity_region(markup) else {
        return Extracted::absent("Did not find population diversity data");
    };

    let (table, width, field_count) = decode_diversity(&region);
    let leftover = field_count % width;
    if leftover > 0 {
        Extracted::with_note(
            Some(table),
            format!(
                "Dropped {} trailing population diversity field(s) that did not fill a row of {}",
                leftover, width
            ),
        )
    } else {
        Extracted::found(Some(table))
    }
}

/// Like [`extract_population_diversity`], but a trailing partial row is a
/// [`EtlError::MalformedTableError`].
pub fn extract_population_diversity_strict(
    markup: &str,
) -> Result<Extracted<Option<DiversityTable>>> {
    let Some(region) = diversity_region(markup) else {
        return Ok(Extracted::absent("Did not find population diversity data"));
    };

    let (table, width, field_count) = decode_diversity(&region);
    if field_count % width > 0 {
        return Err(EtlError::MalformedTableError {
            expected_width: width,
            field_count,
        });
    }
    Ok(Extracted::found(Some(table)))
}

/// Raw payloads of every `{{template|...}}` block.
pub fn extract_cross_references(markup: &str, template: &str) -> Extracted<Vec<String>> {
    let payloads = scan_blocks(markup, template);
    if payloads.is_empty() {
        Extracted::with_note(payloads, format!("Did not find {} data", template))
    } else {
        Extracted::found(payloads)
    }
}

pub fn extract_omim(markup: &str) -> Extracted<Vec<String>> {
    extract_cross_references(markup, OMIM_TEMPLATE)
}

pub fn extract_pharmgkb(markup: &str) -> Extracted<Vec<String>> {
    extract_cross_references(markup, PHARMGKB_TEMPLATE)
}

/// Payload of the first `{{Rsnum|...}}` block. Later blocks are ignored.
pub fn extract_canonical_accession(markup: &str) -> Extracted<Option<String>> {
    match scan_blocks(markup, RSNUM_TEMPLATE).into_iter().next() {
        Some(rsnum) => Extracted::found(Some(rsnum)),
        None => Extracted::absent("Did not find Rsnum data"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIVERSITY: &str = "{{ population diversity| geno1=(A;A) | geno2=(A;G) | CEU | 40% | 60% | HapMap ...}}";

    #[test]
    fn test_single_pmid() {
        let result = extract_citations("Study {{PMID|12345}} shows");
        assert_eq!(result.value, vec!["12345"]);
        assert!(result.note.is_none());
    }

    #[test]
    fn test_pmid_conventions_are_concatenated_in_order() {
        let markup = "{{PMID Auto|PMID=2|Title=B}} then {{PMID|1}} and {{PMID Auto|PMID=1|Title=A}}";
        let result = extract_citations(markup);
        assert_eq!(result.value, vec!["1", "2", "1"]);
    }

    #[test]
    fn test_pmid_requires_digits() {
        let result = extract_citations("{{PMID|}} {{PMID|abc}} {{PMID Auto|PMID=|x}}");
        assert!(result.value.is_empty());
        assert_eq!(result.note.as_deref(), Some("No PMID citations found"));
    }

    #[test]
    fn test_diversity_table() {
        let result = extract_population_diversity(DIVERSITY);
        let table = result.value.unwrap();
        assert_eq!(table.genotype("geno1"), Some("(A;A)"));
        assert_eq!(table.genotype("geno2"), Some("(A;G)"));
        assert_eq!(table.genotypes.len(), 2);
        assert_eq!(
            table.frequencies("CEU"),
            Some(&["40%".to_string(), "60%".to_string()][..])
        );
        assert_eq!(table.populations.len(), 1);
        assert!(result.note.is_none());
    }

    #[test]
    fn test_diversity_missing() {
        let result = extract_population_diversity("{{Rsnum|rs1}} no table here");
        assert!(result.value.is_none());
        assert!(result.note.is_some());
        assert!(extract_population_diversity_strict("plain").unwrap().value.is_none());
    }

    #[test]
    fn test_diversity_without_hapmap_marker_is_not_found() {
        let markup = "{{ population diversity| geno1=(A;A) | CEU | 40% }}";
        let result = extract_population_diversity(markup);
        assert!(result.value.is_none());
        assert_eq!(
            result.note.as_deref(),
            Some("Did not find population diversity data")
        );
    }

    #[test]
    fn test_diversity_row_values_keep_source_text() {
        let markup = "{{ population diversity| geno1=(A;A) | CEU | n = 5 | HapMap}}";
        let table = extract_population_diversity(markup).value.unwrap();
        assert_eq!(table.frequencies("CEU"), Some(&["n = 5".to_string()][..]));
    }

    #[test]
    fn test_diversity_without_genotypes_has_empty_rows() {
        let markup = "{{ population diversity| CEU | YRI | HapMap}}";
        let result = extract_population_diversity(markup);
        let table = result.value.unwrap();
        assert!(table.genotypes.is_empty());
        assert_eq!(table.populations.len(), 2);
        assert_eq!(table.frequencies("CEU"), Some(&[] as &[String]));
        assert_eq!(table.frequencies("YRI"), Some(&[] as &[String]));
        assert!(result.note.is_none());
    }

    #[test]
    fn test_repeated_genotype_label_counts_once() {
        let markup = "{{ population diversity| geno1=(A;A) | geno1=(G;G) | geno2=(A;G) | CEU | 40% | 60% | HapMap}}";
        let result = extract_population_diversity(markup);
        let table = result.value.unwrap();
        assert_eq!(table.genotypes.len(), 2);
        assert_eq!(table.genotype("geno1"), Some("(G;G)"));
        assert_eq!(
            table.frequencies("CEU"),
            Some(&["40%".to_string(), "60%".to_string()][..])
        );
        assert!(result.note.is_none());
    }

    #[test]
    fn test_diversity_partial_row_is_dropped() {
        let markup = "{{ population diversity| geno1=(A;A) | geno2=(A;G) | CEU | 40% | 60% | YRI | 10% | HapMap}}";
        let result = extract_population_diversity(markup);
        let table = result.value.unwrap();
        assert_eq!(table.populations.len(), 1);
        assert!(table.frequencies("YRI").is_none());
        assert!(result.note.unwrap().contains("Dropped 2"));
    }

    #[test]
    fn test_diversity_strict_rejects_partial_row() {
        let markup = "{{ population diversity| geno1=(A;A) | geno2=(A;G) | CEU | 40% | 60% | YRI | 10% | HapMap}}";
        match extract_population_diversity_strict(markup) {
            Err(EtlError::MalformedTableError {
                expected_width,
                field_count,
            }) => {
                assert_eq!(expected_width, 3);
                assert_eq!(field_count, 5);
            }
            other => panic!("expected MalformedTableError, got {:?}", other),
        }
        assert!(extract_population_diversity_strict(DIVERSITY).is_ok());
    }

    #[test]
    fn test_cross_references() {
        let markup = "{{omim|601894.0001}}\n{{PharmGKB|PA166153\n}}";
        assert_eq!(extract_omim(markup).value, vec!["601894.0001"]);
        assert_eq!(extract_pharmgkb(markup).value, vec!["PA166153"]);

        let none = extract_cross_references("nothing", "omim");
        assert!(none.value.is_empty());
        assert_eq!(none.note.as_deref(), Some("Did not find omim data"));
    }

    #[test]
    fn test_canonical_accession() {
        assert_eq!(
            extract_canonical_accession("{{Rsnum|rs737865}}").value.as_deref(),
            Some("rs737865")
        );
        assert_eq!(
            extract_canonical_accession("{{Rsnum|rs1}} {{Rsnum|rs2}}")
                .value
                .as_deref(),
            Some("rs1")
        );
        let absent = extract_canonical_accession("no block");
        assert!(absent.value.is_none());
        assert!(absent.note.is_some());
    }
}
