//! pyreview CLI tool.
//!
//! Usage:
//! ```bash
//! pyreview file [OPTIONS] <PATH>
//! pyreview dir [OPTIONS] [PATH]
//! pyreview reports list|show|stats
//! pyreview config show|get|set|reset|path
//! pyreview list-rules
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod home_resolver;

/// Review Python source for style, performance and security problems
#[derive(Parser)]
#[command(name = "pyreview")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// State directory holding config.toml and saved reports
    #[arg(long, global = true, env = "PYREVIEW_HOME")]
    home: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Review a single file
    File {
        /// File to review
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Save the report to the state directory
        #[arg(long)]
        save: bool,
    },

    /// Review every Python file below a directory
    Dir {
        /// Directory to review (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Save the report to the state directory
        #[arg(long)]
        save: bool,

        /// Worker threads (1 = sequential, default: one per core)
        #[arg(short, long)]
        jobs: Option<usize>,
    },

    /// Inspect saved reports
    Reports {
        #[command(subcommand)]
        command: ReportsCommand,
    },

    /// Inspect or change the configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// List available rules
    ListRules,
}

#[derive(Subcommand)]
enum ReportsCommand {
    /// List saved reports, newest first
    List,

    /// Print a saved report
    Show {
        /// Report id (YYYYMMDDHHMMSS)
        id: String,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Print issue counts for a saved report
    Stats {
        /// Report id (YYYYMMDDHHMMSS)
        id: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the whole configuration
    Show,

    /// Print one value by dotted key
    Get {
        /// Key, e.g. `style.max_line_length`
        key: String,
    },

    /// Change one value by dotted key
    Set {
        /// Key, e.g. `style.max_line_length`
        key: String,

        /// TOML literal (`100`, `true`, `["eval"]`) or plain string
        value: String,
    },

    /// Restore the default configuration
    Reset,

    /// Print the config file path
    Path,
}

/// Output format for review results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// The report as JSON.
    Json,
    /// One-line-per-issue compact format.
    Compact,
    /// Source snippets rendered with miette.
    Pretty,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let state = home_resolver::resolve(cli.home.as_deref())
        .context("Cannot determine the home directory; pass --home or set PYREVIEW_HOME")?;

    match cli.command {
        Commands::File { path, format, save } => {
            commands::review::file(&state, &path, format, save)
        }
        Commands::Dir {
            path,
            format,
            save,
            jobs,
        } => commands::review::dir(&state, &path, format, save, jobs),
        Commands::Reports { command } => match command {
            ReportsCommand::List => commands::reports::list(&state),
            ReportsCommand::Show { id, format } => commands::reports::show(&state, &id, format),
            ReportsCommand::Stats { id, json } => commands::reports::stats(&state, &id, json),
        },
        Commands::Config { command } => match command {
            ConfigCommand::Show => commands::config::show(&state),
            ConfigCommand::Get { key } => commands::config::get(&state, &key),
            ConfigCommand::Set { key, value } => commands::config::set(&state, &key, &value),
            ConfigCommand::Reset => commands::config::reset(&state),
            ConfigCommand::Path => {
                commands::config::path(&state);
                Ok(())
            }
        },
        Commands::ListRules => {
            commands::list_rules::run();
            Ok(())
        }
    }
}
