//! Command-line front end for the traduka pipeline.
//!
//! All pipeline mechanics live in `traduka-sync`; this binary only parses
//! flags, renders progress, and turns the aggregate report into an exit code.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;
use traduka_sync::{
    DownloadOptions, Downloader, Outcome, RecordEvent, SyncConfig, select_by_architecture,
};

const PB_STYLE: &str =
    "{spinner:.blue} [{elapsed_precise}] {wide_bar:.cyan/blue} {pos}/{len} {wide_msg}";
const PB_CHARS: &str = "█▓▒░  ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Arch {
    /// Memory-optimized models, the default for amd64 servers.
    #[value(name = "base-memory")]
    BaseMemory,
    /// Balanced size and quality.
    Base,
    /// Smallest models, for constrained environments.
    Tiny,
}

impl Arch {
    fn tag(self) -> &'static str {
        match self {
            Arch::BaseMemory => "base-memory",
            Arch::Base => "base",
            Arch::Tiny => "tiny",
        }
    }
}

impl std::fmt::Display for Arch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Parser)]
#[command(
    name = "traduka",
    about = "Fetch Bergamot translation models from the Mozilla catalog",
    version
)]
struct Cli {
    /// Directory the models are stored under.
    #[arg(short, long, default_value = "./models")]
    model_dir: PathBuf,

    /// Model architecture to download.
    #[arg(short, long = "arch", value_enum, default_value_t = Arch::BaseMemory)]
    arch: Arch,

    /// Number of concurrent downloads.
    #[arg(short, long, default_value_t = 4)]
    workers: usize,

    /// Override the catalog endpoint.
    #[arg(long, hide = true)]
    records_url: Option<String>,

    /// Override the attachment CDN base.
    #[arg(long, hide = true)]
    cdn_base: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {err:#}", style("error:").red().bold());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = SyncConfig::default();
    if let Some(url) = cli.records_url {
        config.records_url = url;
    }
    if let Some(base) = cli.cdn_base {
        config.cdn_base = base;
    }

    let downloader = Downloader::new(config).context("failed to set up the downloader")?;
    let records = downloader
        .fetch_catalog()
        .await
        .context("failed to fetch the model catalog")?;
    println!(
        "{} {} records in catalog",
        style("✓").green(),
        records.len()
    );

    let selected = select_by_architecture(&records, cli.arch.tag());
    if selected.is_empty() {
        println!(
            "{} no models match architecture '{}'",
            style("!").yellow(),
            cli.arch.tag()
        );
        return Ok(ExitCode::SUCCESS);
    }
    println!(
        "downloading {} '{}' files to {}",
        selected.len(),
        cli.arch.tag(),
        cli.model_dir.display()
    );

    let bar = ProgressBar::new(selected.len() as u64);
    if let Ok(pb_style) = ProgressStyle::with_template(PB_STYLE) {
        bar.set_style(pb_style.progress_chars(PB_CHARS));
    }

    let progress = bar.clone();
    let options = DownloadOptions::new(cli.model_dir)
        .concurrency(cli.workers.max(1))
        .on_event(Arc::new(move |event| match event {
            RecordEvent::Started { record } => {
                progress.set_message(record.name.clone());
            }
            RecordEvent::Finished { record, outcome } => {
                if let Outcome::Failed(err) = outcome {
                    progress.println(format!(
                        "{} {}: {err}",
                        style("✗").red(),
                        record.name
                    ));
                }
                progress.inc(1);
            }
        }));

    let report = downloader
        .download_all(selected, &options)
        .await
        .context("could not create the model directory")?;
    bar.finish_and_clear();

    println!(
        "{} downloaded {}, skipped {}, failed {}",
        if report.has_failures() {
            style("✗").red()
        } else {
            style("✓").green()
        },
        style(report.downloaded).green(),
        style(report.skipped).cyan(),
        style(report.failed).red()
    );

    Ok(if report.has_failures() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
