//! Brandflow - staged brand-consulting generation from the terminal.
//!
//! Every `invoke` runs exactly one stage and prints the JSON response the
//! next step needs.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use brandflow::core::{Config, FileStore, MemoryStore, ResultStore};
use brandflow::workflow::{route, WorkflowRunner};
use brandflow::GenerationManager;

/// Staged brand-consulting generation workflow
#[derive(Parser)]
#[command(name = "brandflow")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Read configuration from this file
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Keep results in memory only
    #[arg(long, global = true)]
    no_store: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one workflow stage
    Invoke {
        /// Step to run (1-5; anything else runs diagnosis)
        #[arg(short, long, allow_negative_numbers = true)]
        step: i64,

        /// Request body file (reads stdin when omitted)
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,
    },

    /// Show which stage a step number runs
    Route {
        /// Step number
        #[arg(allow_negative_numbers = true)]
        step: i64,
    },

    /// Show stored results for an output id
    History {
        /// Output id, e.g. output_01
        output_id: String,

        /// Last step to include
        #[arg(long, default_value_t = 5)]
        up_to: u8,
    },

    /// Show configuration
    Config {
        /// Show config file path
        #[arg(long)]
        path: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose { EnvFilter::new("debug") } else { EnvFilter::new("warn") };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Invoke { step, ref input } => {
            let config = load_config(cli.config.as_deref())?;
            cmd_invoke(&config, cli.no_store, step, input.as_deref())?;
        }
        Commands::Route { step } => {
            let stage = route(step);
            println!("{step} -> {stage} (step {})", stage.step());
        }
        Commands::History { ref output_id, up_to } => {
            let config = load_config(cli.config.as_deref())?;
            cmd_history(&config, output_id, up_to)?;
        }
        Commands::Config { path } => {
            cmd_config(cli.config.as_deref(), path)?;
        }
        Commands::Completions { shell } => {
            cmd_completions(shell);
        }
    }

    Ok(())
}

/// Load configuration from an explicit file, else the default locations.
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from_file(path),
        None => Config::load(),
    }
}

/// Pick the result store for this run.
fn open_store(config: &Config, no_store: bool) -> Arc<dyn ResultStore> {
    if no_store || !config.storage.enabled {
        return Arc::new(MemoryStore::new());
    }
    match config.outputs_dir() {
        Some(dir) => {
            let store = FileStore::new(dir);
            tracing::debug!(dir = %store.root().display(), "Saving results to disk");
            Arc::new(store)
        }
        None => {
            tracing::warn!("No data directory available, results will not be saved");
            Arc::new(MemoryStore::new())
        }
    }
}

/// Read the request body from a file or stdin. Blank input is an empty object.
fn read_body(input: Option<&Path>) -> Result<serde_json::Value> {
    let raw = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    if raw.trim().is_empty() {
        return Ok(serde_json::json!({}));
    }
    serde_json::from_str(&raw).context("Request body is not valid JSON")
}

/// Run one stage and print its response.
fn cmd_invoke(config: &Config, no_store: bool, step: i64, input: Option<&Path>) -> Result<()> {
    let body = read_body(input)?;

    let generator = GenerationManager::from_config(&config.generation);
    if generator.is_available() {
        tracing::debug!(providers = ?generator.provider_names(), "Generation providers ready");
    } else {
        tracing::warn!("No generation provider configured, stages will use fallbacks");
    }
    let runner = WorkflowRunner::new(Arc::new(generator), open_store(config, no_store));

    // Create tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new()?;
    let outcome = rt.block_on(runner.invoke(step, &body));

    let mut stdout = io::stdout().lock();
    match outcome {
        Ok(response) => {
            writeln!(stdout, "{}", serde_json::to_string_pretty(&response)?)?;
            Ok(())
        }
        Err(e) => {
            writeln!(stdout, "{}", serde_json::to_string_pretty(&e.to_json())?)?;
            stdout.flush()?;
            std::process::exit(1);
        }
    }
}

/// Print stored results for an output id.
fn cmd_history(config: &Config, output_id: &str, up_to: u8) -> Result<()> {
    let dir = config
        .outputs_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine the outputs directory"))?;
    let results = FileStore::new(dir).load(output_id, up_to)?;

    if results.is_empty() {
        anyhow::bail!("No stored results for {output_id}");
    }
    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

/// Show configuration.
fn cmd_config(explicit: Option<&Path>, show_path: bool) -> Result<()> {
    if show_path {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(Config::locate)
            .or_else(|| Config::config_dir().map(|d| d.join("config.toml")));
        if let Some(path) = path {
            println!("{}", path.display());
        }
        return Ok(());
    }

    let config = load_config(explicit)?;
    let toml = toml::to_string_pretty(&config)?;
    println!("{toml}");

    Ok(())
}

/// Generate shell completions.
fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "brandflow", &mut io::stdout());
}
