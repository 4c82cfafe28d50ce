//! CLI binary for scrubber.

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use scrubber::{Report, Scrubber, ScrubberConfig};
use scrubber_search::sanitize::retain_web_snippets;
use scrubber_search::{RerankOptions, SearchEngine, SearchSnippet};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Scrubber: web search without API keys.
#[derive(Parser)]
#[command(name = "scrubber", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Search the web and capture the top pages.
    Search {
        /// The query.
        query: String,

        /// Print the full report as JSON.
        #[arg(long)]
        json: bool,

        /// Number of top results to capture as documents.
        #[arg(long, value_name = "N")]
        documents: Option<usize>,

        /// Keep at most K results per hostname.
        #[arg(long, value_name = "K")]
        keep_per_host: Option<usize>,

        /// Do not use the query as the BM25 question.
        #[arg(long)]
        no_bm25: bool,

        /// Skip an engine (repeatable).
        #[arg(long = "disable", value_name = "ENGINE", value_parser = parse_engine)]
        disabled: Vec<SearchEngine>,
    },

    /// Rank a JSON array of snippets read from FILE or stdin.
    Rank {
        /// Snippets file; stdin when omitted.
        file: Option<PathBuf>,

        /// Question to score snippet text against.
        #[arg(long)]
        question: Option<String>,

        /// Keep at most K results per hostname.
        #[arg(long, value_name = "K")]
        keep_per_host: Option<usize>,
    },

    /// List the supported search engines.
    Engines,

    /// Write a default configuration file.
    InitConfig {
        /// Destination; the default config path when omitted.
        path: Option<PathBuf>,
    },
}

fn parse_engine(id: &str) -> Result<SearchEngine, String> {
    SearchEngine::from_id(id).ok_or_else(|| {
        let known: Vec<&str> = SearchEngine::all().iter().map(SearchEngine::id).collect();
        format!("unknown engine `{id}` (expected one of: {})", known.join(", "))
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("scrubber=info,scrubber_search=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Search {
            query,
            json,
            documents,
            keep_per_host,
            no_bm25,
            disabled,
        } => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(n) = documents {
                config.documents.fetch_top = n;
            }
            if let Some(k) = keep_per_host {
                config.search.rerank.keep_k_per_hostname = Some(k);
            }
            if no_bm25 {
                config.search.bm25_rerank = false;
            }
            for engine in disabled {
                if !config.search.disabled_engines.contains(&engine) {
                    config.search.disabled_engines.push(engine);
                }
            }
            run_search(config, &query, json).await
        }
        Command::Rank {
            file,
            question,
            keep_per_host,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let mut options = config.search.rerank;
            if let Some(q) = question {
                options = options.with_question(q);
            }
            if let Some(k) = keep_per_host {
                options = options.with_keep_k_per_hostname(k);
            }
            rank_snippets(file.as_deref(), &options)
        }
        Command::Engines => {
            list_engines();
            Ok(())
        }
        Command::InitConfig { path } => {
            let path = path
                .or(cli.config)
                .unwrap_or_else(ScrubberConfig::default_config_path);
            if path.exists() {
                anyhow::bail!("{} already exists", path.display());
            }
            ScrubberConfig::default().save_to_file(&path)?;
            println!("Wrote {}", path.display());
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ScrubberConfig> {
    let config = match path {
        Some(path) => ScrubberConfig::from_file(path)?,
        None => ScrubberConfig::load_or_default(&ScrubberConfig::default_config_path())?,
    };
    Ok(config)
}

async fn run_search(config: ScrubberConfig, query: &str, json: bool) -> anyhow::Result<()> {
    let scrubber = Scrubber::new(config)?;

    let cancel = scrubber.cancel_token().clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupted, cancelling remaining fetches");
            cancel.cancel();
        }
    });

    let report = scrubber.run(query).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &Report) {
    if report.results.is_empty() {
        println!("No results for \"{}\"", report.query);
        return;
    }
    for (i, result) in report.results.iter().enumerate() {
        let title = result.snippet.title.as_deref().unwrap_or_else(|| result.hostname());
        println!("{:>2}. [{:.3}] {title}", i + 1, result.final_score);
        println!("    {}", result.url());
        if let Some(doc) = report.document_for(result) {
            let preview: String = doc.text_document.chars().take(200).collect();
            println!("    {}", preview.replace('\n', " "));
        }
    }
}

fn rank_snippets(file: Option<&Path>, options: &RerankOptions) -> anyhow::Result<()> {
    let input = match file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let snippets = parse_snippets(&input)?;
    let ranked = scrubber_search::rank(&snippets, options);
    println!("{}", serde_json::to_string_pretty(&ranked)?);
    Ok(())
}

/// Parse a JSON array of snippets, dropping any without a web URL.
fn parse_snippets(input: &str) -> anyhow::Result<Vec<SearchSnippet>> {
    let snippets: Vec<SearchSnippet> = serde_json::from_str(input)?;
    Ok(retain_web_snippets(snippets))
}

fn list_engines() {
    for engine in SearchEngine::all() {
        println!("{:<12} {:<12} weight {:.1}", engine.id(), engine.name(), engine.weight());
    }
}
