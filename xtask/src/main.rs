use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::Command;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "shardgraph workspace automation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the traversal and construction benchmarks and tabulate them
    Bench {
        /// Run quickly (lower sample size/time)
        #[arg(long, default_value_t = false)]
        quick: bool,

        /// Generate report only (skip running benchmarks)
        #[arg(long, default_value_t = false)]
        report_only: bool,

        /// Criterion baseline to save and report
        #[arg(long, default_value = "new")]
        baseline: String,
    },
}

const BENCHES: &[&str] = &["bfs_benchmark", "construction_benchmark"];

/// One measured point: `group/function` at a parameter (usually the shard count).
#[derive(Debug, Serialize)]
struct Measurement {
    workload: String,
    parameter: String,
    /// Elements per second when the bench declares a throughput, else iterations per second.
    rate: f64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Bench {
            quick,
            report_only,
            baseline,
        } => {
            if !report_only {
                run_benchmarks(quick, &baseline)?;
            }
            generate_report(&baseline)?;
        }
    }

    Ok(())
}

fn run_benchmarks(quick: bool, baseline: &str) -> Result<()> {
    println!("Compiling benchmarks...");
    let status = Command::new("cargo")
        .args(["bench", "--no-run"])
        .status()?;
    if !status.success() {
        anyhow::bail!("Failed to compile benchmarks");
    }

    for bench in BENCHES {
        println!("\n>>> Running {bench}");
        let start = Instant::now();

        let mut cmd = Command::new("cargo");
        cmd.arg("bench").arg("--bench").arg(bench);

        // Args for the test runner (Criterion) go after --
        cmd.arg("--");
        if baseline != "new" {
            cmd.arg("--save-baseline").arg(baseline);
        }

        if quick {
            cmd.arg("--measurement-time").arg("0.5");
            cmd.arg("--noplot");
            cmd.arg("--sample-size").arg("10");
        }

        let status = cmd
            .status()
            .with_context(|| format!("Failed to run {bench}"))?;

        if status.success() {
            println!("Finished {bench} in {:.2?}", start.elapsed());
        } else {
            eprintln!("Warning: {bench} failed");
        }
    }

    Ok(())
}

fn generate_report(baseline: &str) -> Result<()> {
    println!("\n>>> Generating Report...");

    let criterion_dir = Path::new("target/criterion");
    if !criterion_dir.exists() {
        eprintln!("No criterion output found at {}", criterion_dir.display());
        return Ok(());
    }

    let mut measurements = Vec::new();
    collect_results(criterion_dir, criterion_dir, baseline, &mut measurements);
    measurements.sort_by(|a, b| (&a.workload, &a.parameter).cmp(&(&b.workload, &b.parameter)));

    let out_dir = Path::new("benchmark_results");
    fs::create_dir_all(out_dir)?;
    fs::write(
        out_dir.join("measurements.json"),
        serde_json::to_string_pretty(&measurements)?,
    )?;

    // Rows are workloads, columns are parameters.
    let mut table: BTreeMap<&str, BTreeMap<&str, f64>> = BTreeMap::new();
    let mut parameters: BTreeSet<&str> = BTreeSet::new();
    for m in &measurements {
        table
            .entry(m.workload.as_str())
            .or_default()
            .insert(m.parameter.as_str(), m.rate);
        parameters.insert(m.parameter.as_str());
    }
    let mut parameters: Vec<&str> = parameters.into_iter().collect();
    parameters.sort_by_key(|p| (p.parse::<u64>().unwrap_or(u64::MAX), p.to_string()));

    let report_path = out_dir.join("report.md");
    let mut file = fs::File::create(&report_path)?;
    writeln!(file, "# Benchmark Report ({baseline})")?;
    writeln!(file)?;

    write!(file, "| Workload |")?;
    for p in &parameters {
        write!(file, " {p} |")?;
    }
    writeln!(file)?;
    write!(file, "|---|")?;
    for _ in &parameters {
        write!(file, "---|")?;
    }
    writeln!(file)?;

    for (workload, row) in &table {
        write!(file, "| {workload} |")?;
        for p in &parameters {
            match row.get(p) {
                Some(rate) => write!(file, " {} |", format_rate(*rate))?,
                None => write!(file, " - |")?,
            }
        }
        writeln!(file)?;
    }

    println!("Report written to {}", report_path.display());
    Ok(())
}

fn format_rate(rate: f64) -> String {
    if rate > 1_000_000.0 {
        format!("{:.2}M/s", rate / 1_000_000.0)
    } else if rate > 1_000.0 {
        format!("{:.2}K/s", rate / 1_000.0)
    } else {
        format!("{rate:.0}/s")
    }
}

/// Walks `target/criterion` for `<bench path>/<baseline>/estimates.json`.
fn collect_results(root: &Path, dir: &Path, baseline: &str, out: &mut Vec<Measurement>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        if path.file_name().and_then(|s| s.to_str()) == Some("report") {
            continue;
        }
        if path.file_name().and_then(|s| s.to_str()) != Some(baseline) {
            collect_results(root, &path, baseline, out);
            continue;
        }

        // `path` is `<root>/<group>/<function>[/<parameter>]/<baseline>`.
        let Some(bench_dir) = path.parent() else { continue };
        let Ok(rel) = bench_dir.strip_prefix(root) else { continue };
        let parts: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        let (workload, parameter) = match parts.as_slice() {
            [group, function, parameter] => (format!("{group}/{function}"), parameter.clone()),
            [group, function] => (group.clone(), function.clone()),
            _ => continue,
        };

        if let Some(rate) = read_rate(&path) {
            out.push(Measurement {
                workload,
                parameter,
                rate,
            });
        }
    }
}

fn read_rate(baseline_dir: &Path) -> Option<f64> {
    let read_json = |name: &str| -> Option<serde_json::Value> {
        let content = fs::read_to_string(baseline_dir.join(name)).ok()?;
        serde_json::from_str(&content).ok()
    };

    let elements = read_json("benchmark.json")
        .and_then(|json| json.get("throughput")?.get("Elements")?.as_f64());
    let time_ns = read_json("estimates.json")?
        .get("mean")?
        .get("point_estimate")?
        .as_f64()?;
    if time_ns <= 0.0 {
        return None;
    }
    Some(elements.unwrap_or(1.0) * 1e9 / time_ns)
}
