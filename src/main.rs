//! lego-classify CLI: compile Lego documents to EL axioms and classify them.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use lego_classifier::batch::AxiomBatch;
use lego_classifier::config::CompilerConfig;
use lego_classifier::dl::AxiomSet;
use lego_classifier::error::DocumentError;
use lego_classifier::lego::LegoList;
use lego_classifier::reasoner::{Reasoner, StructuralReasoner};

#[derive(Parser)]
#[command(name = "lego-classify", version, about = "Lego assertion classifier")]
struct Cli {
    /// Compiler configuration file (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Compile assertions on all cores.
    #[arg(long, global = true)]
    parallel: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a lego document and print the resulting axioms.
    Compile {
        /// Path to a JSON lego list.
        file: PathBuf,

        /// Print the axioms as JSON instead of functional syntax.
        #[arg(long)]
        json: bool,
    },

    /// Compile a lego document, classify it, and print the JSON report.
    Classify {
        /// Path to a JSON lego list.
        file: PathBuf,

        /// JSON axiom set classified before the document (e.g. a terminology extract).
        #[arg(long)]
        base: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => CompilerConfig::from_path(path)?,
        None => CompilerConfig::default(),
    };
    let mut batch = AxiomBatch::new(config)?;

    match cli.command {
        Commands::Compile { file, json } => {
            compile(&mut batch, &file, cli.parallel)?;
            if json {
                let out = serde_json::to_string_pretty(batch.axioms()).into_diagnostic()?;
                println!("{out}");
            } else {
                println!("Converted axioms ({}):", batch.axioms().len());
                for axiom in batch.axioms() {
                    println!("  {axiom}");
                }
            }
            if !batch.failures().is_empty() {
                println!("Skipped assertions ({}):", batch.failures().len());
                for failure in batch.failures() {
                    println!("  {} #{}: {}", failure.lego, failure.index, failure.error);
                }
            }
        }

        Commands::Classify { file, base } => {
            let mut reasoner = StructuralReasoner::new();
            if let Some(base) = base {
                let axioms = load_axioms(&base)?;
                tracing::info!(
                    axioms = axioms.len(),
                    path = %base.display(),
                    "classifying base axioms"
                );
                reasoner.classify(&axioms)?;
            }
            compile(&mut batch, &file, cli.parallel)?;
            let report = batch.submit(&mut reasoner)?;
            let out = serde_json::to_string_pretty(&report).into_diagnostic()?;
            println!("{out}");
        }
    }

    Ok(())
}

fn compile(batch: &mut AxiomBatch, file: &Path, parallel: bool) -> Result<()> {
    let list = LegoList::from_path(file)?;
    tracing::info!(
        legos = list.legos.len(),
        assertions = list.assertion_count(),
        path = %file.display(),
        "loaded lego document"
    );
    if parallel {
        batch.compile_legos_parallel(&list.legos)?;
    } else {
        batch.compile_legos(&list.legos)?;
    }
    Ok(())
}

fn load_axioms(path: &Path) -> Result<AxiomSet, DocumentError> {
    let json = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&json).map_err(|e| DocumentError::Parse {
        message: e.to_string(),
    })
}
