//! Compare table extraction methods on one PDF.
//!
//! Vision-LLM methods run live when their API key is set and `pdftoppm` is
//! installed. The other methods are replayed from `<replay-dir>/<stem>_<method>.json`.
//!
//! Usage:
//!   cargo run --bin compare_methods -- statement.pdf
//!   cargo run --bin compare_methods -- statement.pdf claude_vision gemini_vision
//!   cargo run --bin compare_methods -- statement.pdf --replay-dir outputs
//!   cargo run --bin compare_methods -- --list

use clap::Parser;
use pdf_table_bench::comparison::{compare_methods, default_output_path};
use pdf_table_bench::config::VisionConfig;
use pdf_table_bench::extractors::{Availability, Capabilities, ExtractorRegistry, Method};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "compare_methods", version, about = "Run every extraction method on a PDF")]
struct Args {
    /// PDF to extract tables from
    #[arg(required_unless_present = "list")]
    pdf: Option<PathBuf>,

    /// Methods to run (default: all)
    methods: Vec<Method>,

    /// Directory holding saved output of replayed methods
    #[arg(long)]
    replay_dir: Option<PathBuf>,

    /// Comparison output path (default: <stem>_all_methods_comparison.json)
    #[arg(long)]
    output: Option<PathBuf>,

    /// List methods and whether they can run, then exit
    #[arg(long)]
    list: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let registry = ExtractorRegistry::new(
        Capabilities::detect(args.replay_dir.clone()),
        VisionConfig::default(),
    );

    let pdf_path = match args.pdf {
        Some(pdf_path) if !args.list => pdf_path,
        _ => {
            println!("Available methods:");
            for method in Method::ALL {
                match registry.availability(method) {
                    Availability::Available => println!("  {:<20} ✓", method),
                    Availability::Unavailable(reason) => println!("  {:<20} ✗ {}", method, reason),
                }
            }
            println!();
            println!("{}", registry.capabilities().description());
            return Ok(());
        },
    };

    if !pdf_path.exists() {
        eprintln!("Error: File not found: {}", pdf_path.display());
        std::process::exit(1);
    }

    println!("{}", "=".repeat(70));
    println!("PDF Table Extraction - COMPLETE COMPARISON");
    println!("{}", "=".repeat(70));
    println!();
    println!("File: {}", pdf_path.display());
    println!("Started: {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
    println!();

    let report = compare_methods(&registry, &pdf_path, &args.methods);

    println!("{}", "=".repeat(70));
    println!("COMPARISON SUMMARY");
    println!("{}", "=".repeat(70));
    println!();
    print!("{}", report.summary_table());

    let total_cost = report.total_cost();
    if total_cost > 0.0 {
        println!();
        println!("{}", "=".repeat(70));
        println!("Total API Cost: ${:.4}", total_cost);
        println!("{}", "=".repeat(70));
    }

    let output = args.output.unwrap_or_else(|| default_output_path(&pdf_path));
    report.save(&output)?;
    println!();
    println!("✓ Full comparison saved to {}", output.display());

    println!();
    println!("{}", "=".repeat(70));
    println!("RECOMMENDATIONS");
    println!("{}", "=".repeat(70));
    println!();
    print!("{}", report.recommendations());

    Ok(())
}
