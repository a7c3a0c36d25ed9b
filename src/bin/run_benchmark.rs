//! Benchmark extraction methods over an annotated dataset.
//!
//! The dataset is a manifest (JSON array or JSON lines) of samples with a
//! PDF path and ground-truth tables; see `pdf_table_bench::benchmark`.
//!
//! Usage:
//!   cargo run --bin run_benchmark
//!   cargo run --bin run_benchmark -- --dataset data/fintabnet.json --samples -1
//!   cargo run --bin run_benchmark -- --methods pdfplumber camelot --replay-dir outputs
//!   cargo run --bin run_benchmark -- --methods claude_vision --samples 5

use clap::Parser;
use pdf_table_bench::benchmark::{load_samples, run_benchmark, COMBINED_RESULTS_FILE};
use pdf_table_bench::config::{BenchmarkConfig, EvaluationConfig, RaggedRowPolicy, VisionConfig};
use pdf_table_bench::extractors::{Capabilities, ExtractorRegistry, Method};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "run_benchmark", version, about = "Run the PDF table extraction benchmark")]
struct Args {
    /// Dataset manifest
    #[arg(long, default_value = "data/fintabnet.json")]
    dataset: PathBuf,

    /// Output directory for results
    #[arg(long, default_value = "results")]
    output: PathBuf,

    /// Number of samples to test (0 or -1 for all)
    #[arg(long, default_value_t = 10, allow_negative_numbers = true)]
    samples: i64,

    /// Methods to benchmark
    #[arg(long, num_args = 1.., default_value = "pdfplumber")]
    methods: Vec<Method>,

    /// Directory holding saved output of replayed methods
    #[arg(long)]
    replay_dir: Option<PathBuf>,

    /// Treatment of rows shorter than the longest row: pad or mismatch
    #[arg(long, default_value = "pad")]
    ragged_rows: RaggedRowPolicy,
}

/// Zero and negative counts run every sample.
fn sample_limit(samples: i64) -> Option<usize> {
    usize::try_from(samples).ok().filter(|&n| n > 0)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let sample_limit = sample_limit(args.samples);
    let config = BenchmarkConfig::new()
        .with_output_dir(&args.output)
        .with_sample_limit(sample_limit)
        .with_evaluation(EvaluationConfig::new().with_ragged_rows(args.ragged_rows));

    println!("{}", "=".repeat(60));
    println!("PDF Table Extraction Benchmark");
    println!("{}", "=".repeat(60));
    println!("Started: {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
    println!();

    let samples = load_samples(&args.dataset, config.sample_limit)?;
    println!("Samples: {}", samples.len());

    let registry = ExtractorRegistry::new(Capabilities::detect(args.replay_dir), VisionConfig::default());
    let results = run_benchmark(&registry, &samples, &args.methods, &config)?;

    println!();
    println!("✓ {} of {} methods evaluated", results.len(), args.methods.len());
    println!("✓ All results saved to {}", config.output_dir.display());
    println!("  Combined results: {}", config.output_dir.join(COMBINED_RESULTS_FILE).display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_limit() {
        assert_eq!(sample_limit(10), Some(10));
        assert_eq!(sample_limit(0), None);
        assert_eq!(sample_limit(-1), None);
    }

    #[test]
    fn test_args_accept_negative_samples() {
        let args = Args::try_parse_from(["run_benchmark", "--samples", "-1"]).unwrap();
        assert_eq!(sample_limit(args.samples), None);
        let args = Args::try_parse_from(["run_benchmark", "--samples", "0"]).unwrap();
        assert_eq!(sample_limit(args.samples), None);
    }
}
