//! NewsBrief CLI - topic news digests
//!
//! The application logic is contained in lib.rs, and this file is responsible
//! for parsing arguments and handling top-level errors.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use newsbrief::config::ConfigError;
use newsbrief::logging::{self, LogTarget};
use newsbrief::{ui, Briefing, Config, DigestEntry};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "newsbrief")]
#[command(author, version, about = "TUI for topic news digests with summaries", long_about = None)]
struct Cli {
    /// Path to a config file (defaults to newsbrief.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, summarize and print the news for a topic
    Digest {
        /// Topic to search for
        topic: String,
        /// Print the digest as JSON
        #[arg(long)]
        json: bool,
        /// Maximum number of articles
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut stdout = std::io::stdout();
            clap_complete::generate(shell, &mut Cli::command(), "newsbrief", &mut stdout);
        }
        Some(Commands::Digest { topic, json, limit }) => {
            let mut config = load_config(cli.config.as_deref())?;
            logging::init(&config.log.level, LogTarget::Stderr)?;
            if let Some(limit) = limit {
                config.news.max_articles = limit.max(1);
            }

            let briefing = Briefing::from_config(&config)?;
            if !json {
                println!(
                    "Fetching and summarizing news about {}...\n",
                    topic.as_str().bold()
                );
            }
            let digest = briefing.digest(&topic).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&digest)?);
            } else {
                print_digest(&digest);
            }
        }
        None => {
            let config = load_config(cli.config.as_deref())?;
            let target = match &config.log.file {
                Some(path) => LogTarget::File(path),
                None => LogTarget::Discard,
            };
            logging::init(&config.log.level, target)?;

            // Default: Launch the TUI
            let briefing = Briefing::from_config(&config)?;
            ui::run(&briefing).await?;
        }
    }

    Ok(())
}

/// Load the config from `--config` or the standard locations
fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

fn print_digest(digest: &[DigestEntry]) {
    if digest.is_empty() {
        println!("{}", "No articles found. Try a different topic.".red());
        return;
    }

    println!("{}\n", format!("Found {} articles!", digest.len()).green());
    for (i, entry) in digest.iter().enumerate() {
        println!(
            "{}. {} ({}, {})",
            i + 1,
            entry.title.bold(),
            entry.source,
            entry.date
        );

        let summary = if entry.summary_status.is_placeholder() {
            entry.summary.dimmed()
        } else {
            entry.summary.normal()
        };
        println!("   📝 Summary: {}", summary);
        println!("   💡 Why it matters: {}", entry.why_it_matters);
        println!("   🔗 {}\n", entry.url.cyan());
    }
}
