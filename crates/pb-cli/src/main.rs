//! Personal Blocklist CLI
//!
//! CLI tool for checking result links against a blocklist and replaying
//! scripted sessions.

mod blocklist_file;
mod replay;

use std::path::Path;

use clap::{Parser, Subcommand};
use log::LevelFilter;

use pb_core::{DomainResolver, MatchResult, ResolverConfig};

use crate::blocklist_file::read_blocklist;
use crate::replay::{run_replay, ReplayOptions};

#[derive(Parser)]
#[command(name = "pb-cli")]
#[command(about = "Personal Blocklist matching and replay tools")]
struct Cli {
    /// Log engine decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve result links and match them against a blocklist
    Check {
        /// Blocklist file, one pattern per line
        #[arg(short, long)]
        blocklist: String,

        /// Search service label used for redirect unwrapping
        #[arg(long, default_value = pb_core::url::DEFAULT_SERVICE_LABEL)]
        service: String,

        /// Result links
        #[arg(required = true)]
        links: Vec<String>,
    },

    /// Replay a JSON session fixture against an in-memory page
    Replay {
        /// Fixture file
        #[arg(short, long)]
        fixture: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let result = match cli.command {
        Commands::Check {
            blocklist,
            service,
            links,
        } => cmd_check(&blocklist, &service, &links),
        Commands::Replay { fixture } => run_replay(ReplayOptions {
            fixture,
            verbose: cli.verbose,
        }),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logger(verbose: bool) {
    let level = if verbose { LevelFilter::Trace } else { LevelFilter::Warn };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .init();
}

fn cmd_check(blocklist_path: &str, service: &str, links: &[String]) -> Result<(), String> {
    let blocklist = read_blocklist(Path::new(blocklist_path))?;
    if blocklist.is_empty() {
        return Err(format!("No patterns found in '{}'", blocklist_path));
    }

    let resolver = DomainResolver::new(ResolverConfig {
        service_label: service.to_string(),
        ..ResolverConfig::default()
    });

    println!("Loaded {} patterns from '{}'", blocklist.len(), blocklist_path);
    println!();

    let mut blocked = 0usize;
    for link in links {
        match resolver.resolve(link) {
            Ok(host) => match blocklist.match_host(&host) {
                MatchResult::Matched(pattern) => {
                    blocked += 1;
                    println!("  BLOCK  {:<32} by {}", host, pattern);
                }
                MatchResult::NoMatch => println!("  allow  {}", host),
            },
            Err(e) => println!("  skip   {} ({})", link, e),
        }
    }

    println!();
    println!("{} of {} links blocked", blocked, links.len());
    Ok(())
}
