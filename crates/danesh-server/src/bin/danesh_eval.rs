//! danesh-eval - measure retrieval accuracy over a labelled question set.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use danesh_core::retrieval::{load_dataset, RetrievalEvaluator};
use danesh_server::{create_orchestrator, load_config, logging};

#[derive(Debug, Parser)]
#[command(name = "danesh-eval", version, about)]
struct Args {
    /// Dataset: JSON array of {question, source_chunk, ground_truth_answer}.
    #[arg(short, long)]
    dataset: PathBuf,

    /// Where to write the report.
    #[arg(short, long, default_value = "evaluation_report.json")]
    output: PathBuf,

    /// Configuration file (TOML, JSON or YAML).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only measure retrieval; skip answer generation.
    #[arg(long)]
    retrieval_only: bool,

    /// Evaluate only the first N items.
    #[arg(long)]
    limit: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init("danesh_core=info");

    let args = Args::parse();

    let config = load_config(args.config.as_deref()).context("loading configuration")?;
    let orchestrator = create_orchestrator(&config)
        .await
        .context("building the retrieval pipeline")?;

    let mut items = load_dataset(&args.dataset)
        .with_context(|| format!("reading dataset {}", args.dataset.display()))?;
    if let Some(limit) = args.limit {
        items.truncate(limit);
    }

    let mut evaluator = RetrievalEvaluator::new(&orchestrator);
    if args.retrieval_only {
        evaluator = evaluator.retrieval_only();
    }
    let report = evaluator.evaluate(&items).await;

    let json = serde_json::to_string_pretty(&report)?;
    std::fs::write(&args.output, json)
        .with_context(|| format!("writing report {}", args.output.display()))?;

    println!(
        "Retrieval accuracy: {} ({}/{})",
        report.retrieval_accuracy, report.retrieval_hits, report.total_questions
    );
    println!("Report saved to {}", args.output.display());
    Ok(())
}
