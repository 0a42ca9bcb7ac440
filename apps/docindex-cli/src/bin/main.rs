use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use indicatif::ProgressBar;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use docindex_core::config::Config;
use docindex_core::docs::read_local_doc;
use docindex_core::types::Content;
use docindex_vector::{BuildOutcome, DocIndex};

#[derive(Parser)]
#[command(name = "docindex", about = "Local semantic search over documentation files")]
struct Cli {
    /// Configuration file (defaults to ./docindex.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rebuild the index from the documentation root
    Build,
    /// Rank indexed chunks against a query
    Search {
        query: String,
        /// Number of hits (defaults to search.default_k)
        #[arg(short)]
        k: Option<usize>,
        /// Print hits as JSON instead of markdown
        #[arg(long)]
        json: bool,
    },
    /// Print a documentation file page by page
    Read { file: String },
    /// Show whether the index exists and matches the corpus
    Status,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::WARN.into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load_from(cli.config.as_deref()).context("loading configuration")?;
    let settings = config.settings();
    let engine = DocIndex::from_settings(settings)?;

    match cli.command {
        Command::Build => {
            println!("Indexing {}", engine.scanner().root().display());
            match engine.build(&ProgressBar::new(0))? {
                BuildOutcome::Built(stats) => println!(
                    "Indexed {} chunks from {} files ({} terms) into {}",
                    stats.rows,
                    stats.files,
                    stats.terms,
                    engine.store().dir().display()
                ),
                BuildOutcome::EmptyCorpus => eprintln!("No indexable documents found; existing index left unchanged"),
            }
        }
        Command::Search { query, k, json } => {
            let k = k.unwrap_or(settings.search.default_k);
            if k == 0 || k > settings.search.max_k {
                bail!("-k must be between 1 and {}, got {k}", settings.search.max_k);
            }
            let hits = engine.semantic_search(&query, k)?;
            if json {
                println!("{}", Content::hits_as_json(&hits)?);
            } else if hits.is_empty() {
                println!("No results.");
            } else {
                for content in Content::from_hits(&hits) {
                    print!("{content}");
                }
            }
        }
        Command::Read { file } => {
            let pages = read_local_doc(engine.scanner(), &file, settings.reader.page_chars)?;
            if pages.is_empty() {
                bail!("{file} is empty");
            }
            let total = pages.len();
            for (i, page) in pages.iter().enumerate() {
                println!("--- {file} (page {}/{total}) ---\n{page}", i + 1);
            }
        }
        Command::Status => {
            print!("{}", engine.status()?);
        }
    }
    Ok(())
}
