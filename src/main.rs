mod assets;
mod config;
mod crawl;
mod export;
mod markdown;
mod scraper;
mod structure;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};

use config::{BackendKind, KeyStore, ScrapeConfig};

#[derive(Parser)]
#[command(name = "webcopy", about = "Copy a web page into an explorable file tree")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape one page and display its generated file tree
    Scrape {
        url: String,
        /// Backend used to fetch the page
        #[arg(long, value_enum, default_value_t = BackendKind::Api)]
        backend: BackendKind,
        /// Surface fetch errors instead of substituting the demo document
        #[arg(long)]
        no_fallback: bool,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
        /// Write the generated files into this directory
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Start a multi-page crawl job and wait for it to finish
    Crawl {
        url: String,
        /// Max pages to crawl
        #[arg(short = 'n', long, default_value = "50")]
        limit: u32,
    },
    /// Check a crawl job once
    Status { job_id: String },
    /// Manage the stored API key
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
}

#[derive(Subcommand)]
enum KeyAction {
    /// Store an API key
    Set { value: String },
    /// Show whether a key is configured
    Show,
    /// Remove the stored key
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let store = KeyStore::new(KeyStore::default_path());

    let result = match cli.command {
        Commands::Scrape {
            url,
            backend,
            no_fallback,
            json,
            out,
        } => {
            let mut cfg = ScrapeConfig::from_env(&store);
            cfg.backend = backend;
            cfg.demo_fallback = !no_fallback;

            let result = scraper::Scraper::new(cfg).scrape(&url).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
                Ok(())
            } else if let Some(nodes) = &result.file_structure {
                println!("{}", structure::render_tree(nodes));
                if let Some(dir) = out {
                    let written = export::export_tree(nodes, &dir)?;
                    println!("\nWrote {} files to {}", written, dir.display());
                }
                Ok(())
            } else {
                Err(anyhow::anyhow!(
                    "Scrape failed: {}",
                    result.error.unwrap_or_else(|| "unknown error".into())
                ))
            }
        }
        Commands::Crawl { url, limit } => {
            let cfg = ScrapeConfig::from_env(&store);
            let http = reqwest::Client::new();
            let job = crawl::start_crawl(&http, &cfg, &url, limit).await?;
            println!("Crawl job started: {}", job.job_id);

            let status = crawl::wait_for_completion(&http, &cfg, &job.job_id).await?;
            println!(
                "Crawl {}: {}/{} pages, {} credits used",
                status.status, status.completed, status.total, status.credits_used
            );
            if let Some(pages) = status.data.as_ref().and_then(|d| d.as_array()) {
                for page in pages {
                    if let Some(u) = page.get("url").and_then(|u| u.as_str()) {
                        println!("  {}", u);
                    }
                }
            }
            Ok(())
        }
        Commands::Status { job_id } => {
            let cfg = ScrapeConfig::from_env(&store);
            let http = reqwest::Client::new();
            let status = crawl::check_status(&http, &cfg, &job_id).await?;
            println!("Status:       {}", status.status);
            println!("Completed:    {}/{}", status.completed, status.total);
            println!("Credits used: {}", status.credits_used);
            Ok(())
        }
        Commands::Key { action } => match action {
            KeyAction::Set { value } => {
                if !config::looks_valid(&value) {
                    println!("Warning: key does not look like a valid API key");
                }
                store.save(&value)?;
                println!("API key saved");
                Ok(())
            }
            KeyAction::Show => {
                match ScrapeConfig::from_env(&store).api_key {
                    Some(key) => println!("API key configured ({}...)", mask(&key)),
                    None => println!(
                        "No API key. Set one with 'webcopy key set <key>' or {}",
                        config::KEY_ENV_VAR
                    ),
                }
                Ok(())
            }
            KeyAction::Clear => {
                store.clear()?;
                println!("API key removed");
                Ok(())
            }
        },
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }

    result
}

fn mask(key: &str) -> String {
    key.chars().take(5).collect()
}
