//! geotree - command-line front end for the nested-set place store
//!
//! Usage:
//!   geotree seed [COUNTRY] [--append] [--chunk N] [--cleanup]
//!   geotree rebuild
//!   geotree import-json FILE
//!   geotree build-ppl-tree --countries GR,US
//!   geotree clear [--force]
//!
//! Global flags: --config FILE, --data-dir DIR, --store FILE.
//! Log verbosity follows RUST_LOG (default "info").

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use geotree::seed::{SeedOptions, Seeder};
use geotree::store::{FileStore, GeoStore};
use geotree::{hierarchy, json_import, rebuild_tree, GeoConfig};

#[derive(Parser)]
#[command(name = "geotree", version, about = "Nested-set place tree over the geonames dump")]
struct Cli {
    /// JSON config file; absent fields fall back to built-in defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured storage root directory.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Override the configured store snapshot file.
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest a geonames dump and build the labeled tree.
    Seed {
        /// 2-letter country code; omit to import allCountries.txt.
        country: Option<String>,

        /// Keep existing records and extend the interval space.
        #[arg(long)]
        append: bool,

        /// Records per batch (default from config).
        #[arg(long)]
        chunk: Option<usize>,

        /// Delete the consumed source files after a successful run.
        #[arg(long)]
        cleanup: bool,
    },

    /// Relabel the whole tree from the stored parent references.
    Rebuild,

    /// Restore records from a JSON array file.
    ImportJson {
        /// Path to the JSON file.
        file: PathBuf,
    },

    /// Derive admin1 → PPL hierarchy edges and merge them into the
    /// per-country hierarchy file.
    BuildPplTree {
        /// Comma-separated country codes, e.g. GR,US.
        #[arg(long, value_delimiter = ',', required = true)]
        countries: Vec<String>,
    },

    /// Delete every stored record.
    Clear {
        /// Skip the confirmation prompt.
        #[arg(long)]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => GeoConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => GeoConfig::default(),
    };
    if let Some(dir) = cli.data_dir {
        config.storage_root = dir;
    }
    if let Some(store_file) = cli.store {
        config.store_file = store_file;
    }

    let store_path = config.store_path();
    if let Some(parent) = store_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut store = FileStore::open(&store_path)
        .with_context(|| format!("opening store {}", store_path.display()))?;

    match cli.command {
        Command::Seed {
            country,
            append,
            chunk,
            cleanup,
        } => {
            let opts = SeedOptions {
                country,
                append,
                chunk_size: chunk,
                cleanup,
            };
            let report = Seeder::new(&mut store, &config).run(&opts)?;
            println!(
                "seeded {} records in {} batches ({} countries, {} orphans skipped, {} malformed lines)",
                report.written,
                report.batches,
                report.countries,
                report.orphans,
                report.malformed_lines,
            );
        }

        Command::Rebuild => {
            let report = rebuild_tree(&mut store)?;
            println!(
                "rebuilt {} records ({} countries, {} orphans)",
                report.records, report.countries, report.orphans
            );
        }

        Command::ImportJson { file } => {
            let report = json_import::import_json(&mut store, &file)
                .with_context(|| format!("importing {}", file.display()))?;
            println!(
                "imported: {} updated, {} inserted",
                report.updated, report.inserted
            );
            if let Some(rebuild) = report.rebuild {
                println!("tree rebuilt over {} records", rebuild.records);
            }
        }

        Command::BuildPplTree { countries } => {
            let admin1 = hierarchy::map_admin1_codes(&config.admin1_codes_path())?;
            info!(entries = admin1.len(), "loaded admin1 code table");
            for country in countries {
                let country = country.to_uppercase();
                let edges = hierarchy::build_ppl_hierarchy(&config.storage_root, &country, &admin1)?;
                let merged = hierarchy::merge_hierarchies(&config.storage_root, &country)?;
                println!(
                    "{}: {} ppl edges, merged into {}",
                    country,
                    edges,
                    merged.display()
                );
            }
        }

        Command::Clear { force } => {
            let count = store.count()?;
            if count == 0 {
                println!("store is already empty");
                return Ok(());
            }
            if !force && !confirm(&format!("Delete all {} records?", count))? {
                bail!("aborted");
            }
            store.truncate()?;
            println!("deleted {} records", count);
        }
    }

    Ok(())
}

/// y/N prompt on stdin.
fn confirm(question: &str) -> anyhow::Result<bool> {
    print!("{} [y/N] ", question);
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
