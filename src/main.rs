//! Command line host for the glyphcut loader.
//!
//! Stands in for a build tool: hand it the same module identifiers a bundler
//! would resolve and it prints what the loader returns.

mod error;

use crate::error::{ErrorKind, Result};
use clap::{ArgAction, Parser, Subcommand, ValueHint};
use exn::ResultExt;
use glyphcut_config::Config;
use glyphcut_css::extract_font_sources;
use glyphcut_loader::FontSubsetPlugin;
use glyphcut_subset::{AllsortsSubsetter, SubsetKey};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::fs;
use tracing_subscriber::EnvFilter;

/// Exit status for identifiers the loader doesn't handle.
const NOT_HANDLED: u8 = 2;

#[derive(Debug, Parser)]
#[command(name = "glyphcut", version, about = "Subset the fonts of stylesheets requested with a `subset` query")]
struct Cli {
    /// Project root; defaults to the current directory
    #[arg(long, global = true, value_hint = ValueHint::DirPath)]
    root: Option<PathBuf>,

    /// Extra configuration file (TOML, YAML or JSON), relative to the root
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Log more (-v for debug, -vv for trace); overrides RUST_LOG
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load a module identifier and print the rewritten stylesheet
    Load {
        /// Module identifier, e.g. `src/styles/fonts.css?subset=abc`
        id: String,
    },
    /// Print the subset key for a set of characters
    Key {
        subset: String,
        /// Key length; defaults to the configured `key_length`
        #[arg(short, long)]
        length: Option<usize>,
    },
    /// List the font sources referenced by a stylesheet
    Sources {
        #[arg(value_hint = ValueHint::FilePath)]
        css: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:?}");
            ExitCode::FAILURE
        },
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir().or_raise(|| ErrorKind::Io(PathBuf::from(".")))?,
    };
    let root = fs::canonicalize(&root).await.or_raise(|| ErrorKind::Io(root.clone()))?;
    tracing::debug!(root = %root.display(), "Resolved project root");

    match cli.command {
        Command::Load { id } => {
            let config = Config::load(&root, cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
            let plugin = FontSubsetPlugin::new(&root, config, Arc::new(AllsortsSubsetter::new()))
                .or_raise(|| ErrorKind::Load)?;
            match plugin.load(&id).await.or_raise(|| ErrorKind::Load)? {
                Some(css) => print!("{css}"),
                None => {
                    tracing::warn!(id = id.as_str(), "Identifier not handled");
                    return Ok(ExitCode::from(NOT_HANDLED));
                },
            }
        },
        Command::Key { subset, length } => {
            let length = match length {
                Some(length) => length,
                None => Config::load(&root, cli.config.as_deref()).or_raise(|| ErrorKind::Config)?.key_length,
            };
            println!("{}", SubsetKey::derive(&subset, length));
        },
        Command::Sources { css } => {
            let path = root.join(css);
            let css = fs::read_to_string(&path).await.or_raise(|| ErrorKind::Io(path.clone()))?;
            for source in extract_font_sources(&css) {
                println!("{source}");
            }
        },
    }
    Ok(ExitCode::SUCCESS)
}
