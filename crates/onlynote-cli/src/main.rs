// SPDX-License-Identifier: AGPL-3.0-or-later
//! `onlynote` - rich-text notes from the command line

mod commands;
mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use onlynote_core::ExportFormat;
use onlynote_store::FileStore;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::commands::{is_rejection, App, ExportTarget, ThemeAction};
use crate::config::Config;

#[derive(Debug, Parser)]
#[command(name = "onlynote", version, about = "Rich-text notes with ODT, HTML and text export")]
struct Cli {
    /// Config file (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Autosave store file, overriding the config
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Export a note file, or the current note, to another format
    Export {
        /// Note to export (.on, .txt or .html); the current note if omitted
        input: Option<PathBuf>,

        #[arg(long, value_enum)]
        to: FormatArg,

        /// Output path, `-` for stdout (default: document.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Open a note file as the current note
    Open { file: PathBuf },
    /// Start a new, empty note
    New,
    /// Save the current note as a .on file
    Save {
        /// Save under a new name (.on is appended when missing)
        #[arg(long = "as")]
        name: Option<String>,

        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// Append stdin lines to the current note, autosaving as they arrive
    Write,
    /// Show or change the theme
    Theme {
        #[arg(value_enum, default_value_t = ThemeAction::Show)]
        action: ThemeAction,
    },
    /// Summarise the current note
    Status,
    /// Print the parsed tree of a note file as JSON
    Tree { input: PathBuf },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    On,
    Txt,
    Html,
    Odt,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::On => ExportFormat::Native,
            FormatArg::Txt => ExportFormat::PlainText,
            FormatArg::Html => ExportFormat::Html,
            FormatArg::Odt => ExportFormat::Odt,
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", error_message(&err));
            ExitCode::FAILURE
        }
    }
}

/// The single stderr line for a failed command
fn error_message(err: &anyhow::Error) -> String {
    if is_rejection(err) {
        err.to_string()
    } else {
        format!("error: {err:#}")
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let store_path = cli
        .store
        .clone()
        .or_else(|| config.resolve_store_path())
        .context("no location for the autosave store; pass --store")?;
    debug!(store = %store_path.display(), "using store");

    let store = FileStore::open(&store_path)
        .with_context(|| format!("opening store {}", store_path.display()))?;
    let app = App::new(config, Arc::new(store));

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Export { input, to, output } => {
            match app.export(input.as_deref(), to.into(), output.as_deref(), &mut out)? {
                ExportTarget::File(path) => writeln!(out, "Exported {}", path.display())?,
                ExportTarget::Stdout => out.flush()?,
            }
        }
        Command::Open { file } => {
            let session = app.open(&file)?;
            writeln!(
                out,
                "Opened {} ({} words)",
                file.display(),
                session.document().word_count()
            )?;
        }
        Command::New => {
            app.new_note()?;
            writeln!(out, "Started a new note")?;
        }
        Command::Save { name, dir } => match app.save(name.as_deref(), &dir)? {
            Some(path) => writeln!(out, "Saved {}", path.display())?,
            None => writeln!(out, "Save cancelled")?,
        },
        Command::Write => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let session = app.write_lines(stdin).await?;
            writeln!(out, "Saved ✔ ({} bytes)", session.content.len())?;
        }
        Command::Theme { action } => {
            let theme = app.theme(action)?;
            writeln!(out, "{} (toggle: {})", theme.as_str(), theme.toggle_label())?;
        }
        Command::Status => writeln!(out, "{}", app.status()?)?,
        Command::Tree { input } => writeln!(out, "{}", app.tree(&input)?)?,
    }

    Ok(())
}
