use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use snpedia_etl::adapters::genotype_db;
use snpedia_etl::utils::logger;
use snpedia_etl::utils::validation::{validate_file_extensions, GENOTYPE_FILE_EXTENSIONS};

#[derive(Parser)]
#[command(name = "genotype-db")]
#[command(about = "Create a genotype database and load personal genotyping files into it")]
struct Args {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create (or recreate) the tables and views
    Setup {
        database: String,
    },
    /// Load one person's genotyping file
    Load {
        name: String,
        snpfile: String,
        database: String,

        /// Also record every SNP; use for the first file loaded into a database
        #[arg(short, long)]
        newdb: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    match args.command {
        Command::Setup { database } => {
            let conn = genotype_db::connect(&database)
                .with_context(|| format!("Failed to connect to SQLite db {}", database))?;
            genotype_db::init_schema(&conn)?;
            println!("✅ Created genotype database {}", database);
        }
        Command::Load {
            name,
            snpfile,
            database,
            newdb,
        } => {
            validate_file_extensions(
                "snpfile",
                std::slice::from_ref(&snpfile),
                &GENOTYPE_FILE_EXTENSIONS,
            )?;
            let mut conn = genotype_db::connect(&database)
                .with_context(|| format!("Failed to connect to SQLite db {}", database))?;
            let summary = genotype_db::load_genotype_file(&mut conn, &name, &snpfile, newdb)
                .with_context(|| format!("Problem loading SNP file {}", snpfile))?;

            tracing::info!(
                "Loaded {} calls for {} (person {}): {} new genotypes, {} already present",
                summary.calls_read,
                name,
                summary.person_id,
                summary.new_genotypes,
                summary.duplicate_genotypes
            );
            println!("✅ Loaded {} genotype calls for {}", summary.links, name);
        }
    }

    Ok(())
}
