//! `strata-cli`: a thin binary wiring the built-in generic examiners
//! onto a bundled demonstration excavation, driving it to fixpoint, and
//! rendering the result as an HTML report.
//!
//! Format-specific examiners and the BitStore fetcher are out of
//! scope, so this binary ships a couple of small, self-contained
//! demonstration byte blobs ("topics") rather than reading arbitrary
//! recovered media.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::Parser;

use strata_core::{Excavation, ExcavationConfig};
use strata_examine::{ExaminationDriver, RecordSplitExaminer, SameSameExaminer};
use strata_report::render_excavation;

/// Run a bundled demonstration excavation and render its report as HTML.
#[derive(Parser, Debug)]
#[command(name = "strata", version, about)]
struct Cli {
    /// Which bundled demonstration topic to excavate.
    #[arg(value_enum)]
    topic: Topic,

    /// Directory to write the HTML report into.
    #[arg(long, default_value = "./strata-report-out")]
    html_dir: PathBuf,

    /// Prefix prepended to every intra-report link.
    #[arg(long, default_value = "")]
    link_prefix: String,

    /// Maximum number of bytes a hexdump renders before truncating.
    #[arg(long, default_value_t = 256)]
    hexdump_limit: usize,

    /// Abort the run once the arena exceeds this many artifacts.
    #[arg(long)]
    max_artifacts: Option<usize>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum Topic {
    /// A short greeting, small enough to pass through untouched.
    Greeting,
    /// A longer, repetitive digit run — exercises record splitting and
    /// dedup via `SameSameExaminer`.
    Digits,
}

impl Topic {
    fn bytes(self) -> Vec<u8> {
        match self {
            Self::Greeting => b"Hello from the excavation floor.".to_vec(),
            Self::Digits => {
                let mut out = Vec::new();
                for _ in 0..8 {
                    out.extend_from_slice(b"0123456789");
                }
                out
            }
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("strata: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ExcavationConfig {
        hexdump_limit: cli.hexdump_limit,
        max_artifacts: cli.max_artifacts,
        ..ExcavationConfig::default()
    };
    let excavation = Excavation::new(config);
    excavation.add_examiner(Box::new(SameSameExaminer));
    excavation.add_examiner(Box::new(RecordSplitExaminer::new(10)));

    excavation
        .ingest(&cli.topic.bytes())
        .context("ingesting the bundled demonstration topic")?;

    let driver = ExaminationDriver::new();
    if let Err(e) = driver.run(&excavation) {
        bail!("{e}");
    }

    render_excavation(&excavation, &cli.html_dir, &cli.link_prefix)
        .context("rendering the excavation report")?;

    println!(
        "wrote {} artifact page(s) to {}",
        excavation.artifact_count(),
        cli.html_dir.display()
    );
    Ok(())
}
