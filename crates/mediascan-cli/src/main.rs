//! mediascan binary.
//!
//! Reads `mediascan.toml` (or the path given with `--config`), loads every
//! subject from the SQLite snapshot, and checks that each subject's media
//! artifact sits in the storage location its category calls for.
//!
//! Ctrl-C stops the scan between subjects; the partial report is still
//! printed.

mod settings;

use std::{collections::BTreeSet, path::PathBuf};

use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use mediascan_core::{classify::Category, location::LocationTable, source::SubjectSource};
use mediascan_engine::{Scanner, TokioThrottle, render::render, select_subjects};
use mediascan_storage_http::HttpExistenceChecker;
use mediascan_store_sqlite::SqliteSubjectSource;
use tokio_util::sync::CancellationToken;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::Settings;

/// Conventional exit status for a process ended by SIGINT.
const INTERRUPTED_EXIT_CODE: i32 = 130;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
  Text,
  Json,
}

#[derive(Parser)]
#[command(author, version, about = "Media placement audit")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "mediascan.toml")]
  config: PathBuf,

  /// How to print the report.
  #[arg(long, value_enum, default_value_t = Format::Text)]
  format: Format,

  /// Also write the full report (every row, no preview cap) as JSON here.
  #[arg(short, long)]
  output: Option<PathBuf>,

  /// Only scan subjects in these categories. Overrides `only` from config.
  #[arg(long, value_delimiter = ',', num_args = 1..)]
  only: Vec<Category>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Logs go to stderr so stdout carries only the report.
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = Settings::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  let checker = HttpExistenceChecker::new(settings.storage_config())
    .context("failed to set up storage client")?;
  let scanner = Scanner::new(
    checker,
    TokioThrottle,
    LocationTable::standard(),
    settings.scan_config(),
  )
  .context("invalid scan configuration")?;

  let cancel = CancellationToken::new();
  tokio::spawn({
    let cancel = cancel.clone();
    async move {
      while tokio::signal::ctrl_c().await.is_ok() {
        match on_interrupt(&cancel) {
          Interrupt::Stop => tracing::warn!(
            "interrupt received; stopping after the current subject (Ctrl-C again exits now)"
          ),
          Interrupt::Exit => {
            tracing::warn!("second interrupt; exiting without a report");
            std::process::exit(INTERRUPTED_EXIT_CODE);
          }
        }
      }
    }
  });

  let source = SqliteSubjectSource::open_read_only(&settings.database_path)
    .await
    .with_context(|| format!("failed to open subject database at {:?}", settings.database_path))?;

  let subjects = tokio::select! {
    read = source.read_all_subjects() => read.context("failed to read subjects")?,
    () = cancel.cancelled() => anyhow::bail!("interrupted before the scan started"),
  };

  let only: BTreeSet<Category> = if cli.only.is_empty() {
    settings.only.iter().copied().collect()
  } else {
    cli.only.iter().copied().collect()
  };
  let loaded = subjects.len();
  let subjects = select_subjects(subjects, &only);
  if !only.is_empty() {
    tracing::info!(loaded, selected = subjects.len(), ?only, "filtered subjects by category");
  }

  let report = scanner.run(&subjects, &cancel).await;

  if let Some(path) = &cli.output {
    let json = serde_json::to_vec_pretty(&report).context("failed to serialise report")?;
    tokio::fs::write(path, json)
      .await
      .with_context(|| format!("failed to write report to {path:?}"))?;
    tracing::info!(?path, "wrote full report");
  }

  let rendered = render(&report, settings.preview_limit);
  match cli.format {
    Format::Text => print!("{rendered}"),
    Format::Json => println!(
      "{}",
      serde_json::to_string_pretty(&rendered).context("failed to serialise report")?
    ),
  }

  Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum Interrupt {
  /// Stop gracefully and still print the partial report.
  Stop,
  /// The run was already stopping; leave immediately.
  Exit,
}

/// React to one Ctrl-C: the first cancels the run, any later one exits.
fn on_interrupt(cancel: &CancellationToken) -> Interrupt {
  if cancel.is_cancelled() {
    Interrupt::Exit
  } else {
    cancel.cancel();
    Interrupt::Stop
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn first_interrupt_cancels_and_second_exits() {
    let cancel = CancellationToken::new();

    assert_eq!(on_interrupt(&cancel), Interrupt::Stop);
    assert!(cancel.is_cancelled());
    assert_eq!(on_interrupt(&cancel), Interrupt::Exit);
    assert_eq!(on_interrupt(&cancel), Interrupt::Exit);
  }

  #[test]
  fn only_accepts_comma_separated_categories() {
    let cli = Cli::try_parse_from(["mediascan", "--only", "club,agent"]).unwrap();
    assert_eq!(cli.only, [Category::Club, Category::Agent]);
    assert!(Cli::try_parse_from(["mediascan", "--only", "coach"]).is_err());
  }
}
