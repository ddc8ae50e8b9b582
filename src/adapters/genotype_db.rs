use crate::domain::model::GenotypeCall;
use crate::utils::error::Result;
use rusqlite::{params, Connection};
use serde::Serialize;
use std::io::Read;
use std::path::Path;

const SCHEMA: &str = "
    DROP VIEW IF EXISTS snp_counts;
    DROP TABLE IF EXISTS person_gtype;
    DROP TABLE IF EXISTS genotypes;
    DROP TABLE IF EXISTS person;
    DROP TABLE IF EXISTS snp;

    CREATE TABLE snp (
        snp_id     TEXT PRIMARY KEY,
        chromosome TEXT NOT NULL,
        position   INTEGER NOT NULL
    );

    CREATE TABLE genotypes (
        snp_id   TEXT NOT NULL REFERENCES snp(snp_id) ON DELETE CASCADE,
        genotype TEXT NOT NULL,
        PRIMARY KEY (snp_id, genotype)
    );

    CREATE TABLE person (
        person_id INTEGER PRIMARY KEY AUTOINCREMENT,
        name      TEXT NOT NULL
    );

    CREATE TABLE person_gtype (
        person_id INTEGER NOT NULL REFERENCES person(person_id) ON DELETE CASCADE,
        snp_id    TEXT NOT NULL,
        genotype  TEXT NOT NULL,
        PRIMARY KEY (person_id, snp_id, genotype),
        FOREIGN KEY (snp_id, genotype) REFERENCES genotypes(snp_id, genotype) ON DELETE CASCADE
    );

    CREATE VIEW snp_counts AS
        SELECT snp_id, COUNT(*) AS count FROM genotypes GROUP BY snp_id;
";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub person_id: i64,
    pub calls_read: usize,
    pub new_genotypes: usize,
    pub duplicate_genotypes: usize,
    pub links: usize,
}

pub fn connect<P: AsRef<Path>>(path: P) -> Result<Connection> {
    tracing::info!("Connecting to database: {}", path.as_ref().display());
    Ok(Connection::open(path)?)
}

/// Drops and recreates every table and view. Existing data is lost.
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    tracing::info!("Created tables snp, genotypes, person, person_gtype and view snp_counts");
    Ok(())
}

/// Parses a tab-delimited genotyping export: `rsid, chromosome, position,
/// genotype` per line, `#` lines being comments.
pub fn read_genotype_calls<R: Read>(reader: R) -> Result<Vec<GenotypeCall>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut calls: Vec<GenotypeCall> = Vec::new();
    for row in rdr.deserialize::<GenotypeCall>() {
        calls.push(row?);
    }
    Ok(calls)
}

/// Adds `person` and their genotype calls in one transaction.
///
/// With `new_db`, each SNP is also recorded in `snp`. Without it, calls for
/// SNPs missing from `snp` are still loaded. A genotype already known for a SNP is kept and
/// counted as a duplicate.
pub fn populate(
    conn: &mut Connection,
    person: &str,
    calls: &[GenotypeCall],
    new_db: bool,
) -> Result<LoadSummary> {
    let tx = conn.transaction()?;
    tx.execute("INSERT INTO person(name) VALUES (?1)", params![person])?;

    let mut summary = LoadSummary {
        person_id: tx.last_insert_rowid(),
        calls_read: calls.len(),
        ..Default::default()
    };

    {
        let mut insert_snp = tx.prepare(
            "INSERT OR IGNORE INTO snp(snp_id, chromosome, position) VALUES (?1, ?2, ?3)",
        )?;
        let mut insert_genotype =
            tx.prepare("INSERT OR IGNORE INTO genotypes(snp_id, genotype) VALUES (?1, ?2)")?;
        let mut link = tx.prepare(
            "INSERT INTO person_gtype(person_id, snp_id, genotype) VALUES (?1, ?2, ?3)",
        )?;

        for call in calls {
            if new_db {
                insert_snp.execute(params![call.rsid, call.chromosome, call.position])?;
            }

            if insert_genotype.execute(params![call.rsid, call.genotype])? == 0 {
                tracing::warn!(
                    "Genotype {} already present for SNP {}",
                    call.genotype,
                    call.rsid
                );
                summary.duplicate_genotypes += 1;
            } else {
                summary.new_genotypes += 1;
            }

            link.execute(params![summary.person_id, call.rsid, call.genotype])?;
            summary.links += 1;
        }
    }

    tx.commit()?;
    Ok(summary)
}

pub fn load_genotype_file<P: AsRef<Path>>(
    conn: &mut Connection,
    person: &str,
    snpfile: P,
    new_db: bool,
) -> Result<LoadSummary> {
    tracing::info!("Processing {}", snpfile.as_ref().display());
    let file = std::fs::File::open(snpfile)?;
    let calls = read_genotype_calls(file)?;
    populate(conn, person, &calls, new_db)
}
