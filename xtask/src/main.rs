use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Hive workspace automation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the hive benchmarks under each global allocator and write a report
    Bench {
        /// Run quickly (lower sample size/time)
        #[arg(long, default_value_t = false)]
        quick: bool,

        /// Generate report only (skip running benchmarks)
        #[arg(long, default_value_t = false)]
        report_only: bool,

        /// Where to write the markdown report
        #[arg(long, default_value = "benchmark_results/report.md")]
        output: PathBuf,
    },
}

const BENCH: &str = "hive_benchmark";

const ALLOCATORS: &[&str] = &["alloc-system", "alloc-mimalloc"];

/// `benchmark.json` written by criterion next to each baseline.
#[derive(Deserialize)]
struct BenchmarkInfo {
    full_id: String,
    throughput: Option<ThroughputInfo>,
}

#[derive(Deserialize)]
enum ThroughputInfo {
    Elements(u64),
    Bytes(u64),
    BytesDecimal(u64),
}

/// `estimates.json`; only the mean is reported.
#[derive(Deserialize)]
struct Estimates {
    mean: Estimate,
}

#[derive(Deserialize)]
struct Estimate {
    point_estimate: f64,
}

/// Operations per second, keyed by benchmark id then allocator.
type Results = BTreeMap<String, BTreeMap<String, f64>>;

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Bench {
            quick,
            report_only,
            output,
        } => {
            if !report_only {
                run_benchmarks(quick)?;
            }
            generate_report(Path::new("target/criterion"), &output)?;
        }
    }

    Ok(())
}

fn baseline(feature: &str) -> &str {
    feature.trim_start_matches("alloc-")
}

fn run_benchmarks(quick: bool) -> Result<()> {
    println!("Compiling {BENCH}...");
    let status = Command::new("cargo")
        .args(["build", "--release", "--bench", BENCH])
        .status()
        .context("failed to spawn cargo")?;
    if !status.success() {
        anyhow::bail!("failed to compile {BENCH}");
    }

    for feature in ALLOCATORS {
        println!("\n>>> Benchmarking with feature: {feature}");
        let start = Instant::now();

        let mut cmd = Command::new("cargo");
        cmd.env("CARGO_INCREMENTAL", "0")
            .args(["bench", "--bench", BENCH, "--no-default-features"])
            .args(["--features", feature])
            .arg("--")
            .args(["--save-baseline", baseline(feature)]);

        if quick {
            cmd.args(["--measurement-time", "0.1", "--sample-size", "10", "--noplot"]);
        }

        let status = cmd
            .status()
            .with_context(|| format!("failed to run {BENCH} for {feature}"))?;
        if status.success() {
            println!("Finished {feature} in {:.2?}", start.elapsed());
        } else {
            eprintln!("Warning: {BENCH} failed for {feature}");
        }
    }

    Ok(())
}

fn generate_report(criterion_dir: &Path, output: &Path) -> Result<()> {
    println!("\n>>> Generating report...");
    if !criterion_dir.exists() {
        eprintln!("No criterion output found at {}", criterion_dir.display());
        return Ok(());
    }

    let mut results = Results::new();
    collect_results(criterion_dir, &mut results)?;

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(output, render(&results))
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!("Report written to {}", output.display());
    Ok(())
}

fn render(results: &Results) -> String {
    let mut out = String::from("# Hive Benchmark Report\n\n| Benchmark |");
    for feature in ALLOCATORS {
        let _ = write!(out, " {} (ops/s) | vs system |", baseline(feature));
    }
    out.push_str("\n|---|");
    for _ in ALLOCATORS {
        out.push_str("---|---|");
    }
    out.push('\n');

    for (id, by_alloc) in results {
        let _ = write!(out, "| {id} |");
        let system = by_alloc.get("system").copied().unwrap_or(0.0);
        for feature in ALLOCATORS {
            match by_alloc.get(baseline(feature)) {
                Some(&ops) => {
                    let rel = if system > 0.0 { ops / system } else { 0.0 };
                    let _ = write!(out, " {} | **{rel:.2}x** |", human(ops));
                }
                None => out.push_str(" N/A | - |"),
            }
        }
        out.push('\n');
    }
    out
}

fn human(ops: f64) -> String {
    if ops > 1_000_000.0 {
        format!("{:.2}M", ops / 1_000_000.0)
    } else if ops > 1_000.0 {
        format!("{:.2}K", ops / 1_000.0)
    } else {
        format!("{ops:.0}")
    }
}

/// Walks `dir` for `<bench>/<baseline>/estimates.json` files.
fn collect_results(dir: &Path, results: &mut Results) -> Result<()> {
    for entry in fs::read_dir(dir)?.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if path.file_name().is_some_and(|name| name == "report") {
                continue;
            }
            collect_results(&path, results)?;
            continue;
        }
        if path.file_name().and_then(|s| s.to_str()) != Some("estimates.json") {
            continue;
        }

        let Some(baseline_dir) = path.parent() else {
            continue;
        };
        let Some(baseline) = baseline_dir.file_name().and_then(|s| s.to_str()) else {
            continue;
        };
        if !ALLOCATORS.iter().any(|feature| self::baseline(feature) == baseline) {
            continue;
        }

        let info: BenchmarkInfo = read_json(&baseline_dir.join("benchmark.json"))?;
        let estimates: Estimates = read_json(&path)?;
        let time_ns = estimates.mean.point_estimate;
        if time_ns <= 0.0 {
            continue;
        }

        let per_iter = match info.throughput {
            Some(ThroughputInfo::Elements(n)) => n as f64,
            Some(ThroughputInfo::Bytes(_) | ThroughputInfo::BytesDecimal(_)) | None => 1.0,
        };
        results
            .entry(info.full_id)
            .or_default()
            .insert(baseline.to_string(), per_iter * 1e9 / time_ns);
    }
    Ok(())
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}
