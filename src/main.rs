//! Lexi 命令行入口

use std::error::Error;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lexi::config::{find_config_file, ConfigManager, LexiConfig};
use lexi::env::{core::LogLevel, generate_env_docs, EnvConfig, EnvVar};
use lexi::text::classifier::{classify, HighlightMode};
use lexi::text::wordlists::WordlistStore;
use lexi::{annotate_html, AnnotateOptions};

#[derive(Parser, Debug)]
#[command(name = "lexi", about = "Highlight vocabulary worth learning in HTML pages", version)]
struct Cli {
    /// Configuration file (defaults to the usual search paths)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Annotate an HTML file and write the result
    Annotate {
        /// Input HTML file
        input: PathBuf,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Highlight mode: basic, exam-only
        #[arg(long)]
        mode: Option<HighlightMode>,
        /// Directory containing the wordlist files
        #[arg(long)]
        wordlists: Option<PathBuf>,
        /// Input encoding (detected from the document when omitted)
        #[arg(long)]
        encoding: Option<String>,
        /// Do not inject the marker stylesheet
        #[arg(long)]
        no_style: bool,
    },
    /// Print whether each word would be highlighted
    Classify {
        #[arg(required = true)]
        words: Vec<String>,
        #[arg(long)]
        mode: Option<HighlightMode>,
        #[arg(long)]
        wordlists: Option<PathBuf>,
    },
    /// Write an example configuration file
    InitConfig {
        #[arg(default_value = "lexi.toml")]
        path: PathBuf,
    },
    /// Show the LEXI_* environment settings and the config file in use
    Env {
        /// Print documentation for every variable instead
        #[arg(long)]
        docs: bool,
    },
}

fn init_tracing() {
    let level = LogLevel::get().unwrap_or_else(|_| "info".to_string());
    let env_filter = EnvFilter::try_new(format!("lexi={}", level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<LexiConfig, Box<dyn Error>> {
    let manager = match path {
        Some(path) => ConfigManager::from_path(path)?,
        None => ConfigManager::new()?,
    };
    Ok(manager.into_config())
}

fn wordlist_store(config: &LexiConfig, dir: Option<PathBuf>) -> WordlistStore {
    WordlistStore::from_dir(dir.unwrap_or_else(|| PathBuf::from(config.wordlist_path())))
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Command::Env { docs } => {
            if docs {
                print!("{}", generate_env_docs());
                return Ok(());
            }

            EnvConfig::from_env()?.print_summary();
            match find_config_file() {
                Some(path) => println!("  Config File: {}", path.display()),
                None => println!("  Config File: none (defaults)"),
            }
            Ok(())
        }
        Command::InitConfig { path } => {
            ConfigManager::generate_example_config(&path)?;
            println!("Wrote example configuration to {}", path.display());
            Ok(())
        }
        Command::Classify {
            words,
            mode,
            wordlists,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let store = wordlist_store(&config, wordlists);
            let snapshot = store.ensure_loaded().await;
            let mode = mode.unwrap_or(config.highlight_mode);

            let stdout = io::stdout();
            let mut out = stdout.lock();
            for word in &words {
                writeln!(out, "{}\t{}", word, classify(word, mode, &snapshot))?;
            }
            Ok(())
        }
        Command::Annotate {
            input,
            output,
            mode,
            wordlists,
            encoding,
            no_style,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let store = wordlist_store(&config, wordlists);
            let data = fs::read(&input)
                .map_err(|e| format!("could not read {}: {}", input.display(), e))?;

            let options = AnnotateOptions {
                highlight_mode: mode.unwrap_or(config.highlight_mode),
                encoding,
                inject_style: !no_style,
            };
            let annotated = annotate_html(&data, &store, &options).await?;

            match output {
                Some(path) => fs::write(&path, &annotated.html)?,
                None => io::stdout().write_all(&annotated.html)?,
            }
            Ok(())
        }
    }
}
