//! Evaluate extracted tables against ground truth.
//!
//! Both inputs may be any saved extraction form: the full output written by
//! an extractor, a bare array of table records, or `{"tables": [grid, ...]}`.
//!
//! Usage:
//!   cargo run --bin evaluate_tables -- predicted.json ground_truth.json
//!   cargo run --bin evaluate_tables -- out/q3_camelot.json gt/q3.json --method camelot
//!   cargo run --bin evaluate_tables -- pred.json gt.json --output results/pred_results.json
//!   cargo run --bin evaluate_tables -- pred.json gt.json --ragged-rows mismatch

use clap::Parser;
use pdf_table_bench::config::{EvaluationConfig, RaggedRowPolicy};
use pdf_table_bench::evaluation::{print_results, save_results, Evaluator};
use pdf_table_bench::ExtractionOutput;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "evaluate_tables", version, about = "Score extracted tables against ground truth")]
struct Args {
    /// Extraction output to score
    predicted: PathBuf,

    /// Ground-truth tables
    ground_truth: PathBuf,

    /// Method name for the report (default: from the predicted file)
    #[arg(long)]
    method: Option<String>,

    /// Write the result as JSON to this path
    #[arg(long)]
    output: Option<PathBuf>,

    /// Treatment of rows shorter than the longest row: pad or mismatch
    #[arg(long, default_value = "pad")]
    ragged_rows: RaggedRowPolicy,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let predicted = ExtractionOutput::load(&args.predicted)?;
    let ground_truth = ExtractionOutput::load(&args.ground_truth)?;

    let method = args
        .method
        .or_else(|| predicted.method.clone())
        .or_else(|| {
            args.predicted
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "unknown".to_string());

    println!(
        "Evaluating {} ({} tables) against {} ({} tables) at {}",
        args.predicted.display(),
        predicted.tables.len(),
        args.ground_truth.display(),
        ground_truth.tables.len(),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );

    let evaluator = Evaluator::new(EvaluationConfig::new().with_ragged_rows(args.ragged_rows));
    let results = evaluator.evaluate(&predicted.tables, &ground_truth.tables, &method);
    print_results(&results);

    if let Some(output) = args.output {
        save_results(&results, &output)?;
        println!("Results saved to: {}", output.display());
    }

    Ok(())
}
