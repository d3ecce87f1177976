// Quadro Import CLI - batch-import inspection workbooks into SQLite

use anyhow::{bail, Result};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use quadro_import::{
    BatchFile, BatchOrchestrator, BatchReport, ConfidenceScorer, RecordAssembler,
    SqliteRepository, DEFAULT_DELAY_MS, VERSION,
};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("quadro_import=info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() > 1 && args[1] == "import" {
        run_import(&args[2..])
    } else {
        print_usage();
        Ok(())
    }
}

fn print_usage() {
    println!("quadro-import {}", VERSION);
    println!();
    println!("Usage:");
    println!("  quadro-import import <dir-or-file>... [options]");
    println!();
    println!("Options:");
    println!("  --db <path>        SQLite database path (default: quadros.db)");
    println!("  --json             Print the batch report as JSON");
    println!("  --threshold <0-1>  Review threshold for the confidence score (default: 0.5)");
    println!("  --delay <ms>       Pause between files (default: {})", DEFAULT_DELAY_MS);
}

fn run_import(args: &[String]) -> Result<()> {
    let mut inputs: Vec<PathBuf> = Vec::new();
    let mut db_path = PathBuf::from("quadros.db");
    let mut as_json = false;
    let mut delay_ms = DEFAULT_DELAY_MS;
    let mut threshold: Option<f64> = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--db" => match iter.next() {
                Some(path) => db_path = PathBuf::from(path),
                None => bail!("--db requires a path"),
            },
            "--json" => as_json = true,
            "--threshold" => match iter.next() {
                Some(value) => threshold = Some(value.parse()?),
                None => bail!("--threshold requires a value between 0 and 1"),
            },
            "--delay" => match iter.next() {
                Some(ms) => delay_ms = ms.parse()?,
                None => bail!("--delay requires milliseconds"),
            },
            other => inputs.push(PathBuf::from(other)),
        }
    }

    if inputs.is_empty() {
        bail!("No input files or directories given");
    }

    println!("📥 Quadro Import - workbooks → SQLite");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // 1. Collect workbooks
    println!("\n📂 Collecting workbooks...");
    let files = collect_workbooks(&inputs)?;
    if files.is_empty() {
        bail!("No .xlsx/.xls files found under the given paths");
    }
    println!("✓ Found {} workbook(s)", files.len());

    // 2. Open database
    println!("\n🔧 Opening database at {}...", db_path.display());
    let repository = SqliteRepository::open(&db_path)?;
    println!("✓ Database ready (WAL mode)");

    // 3. Run the batch
    println!("\n🔄 Importing...");
    let mut orchestrator =
        BatchOrchestrator::new(repository).with_delay(Duration::from_millis(delay_ms));
    if let Some(threshold) = threshold {
        orchestrator = orchestrator
            .with_assembler(RecordAssembler::with_scorer(ConfidenceScorer::with_threshold(
                threshold,
            )));
    }
    let report = orchestrator.run(&files)?;

    // 4. Report
    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    let repository = orchestrator.into_repository();
    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!(
        "✅ Done: {} unit(s), {} inspection event(s) in the database",
        repository.count_units()?,
        repository.count_events()?
    );

    if report.failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn collect_workbooks(inputs: &[PathBuf]) -> Result<Vec<BatchFile>> {
    let mut paths: Vec<PathBuf> = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in std::fs::read_dir(input)? {
                let path = entry?.path();
                if is_workbook(&path) {
                    paths.push(path);
                }
            }
        } else if is_workbook(input) {
            paths.push(input.clone());
        } else {
            bail!("Not a workbook or directory: {}", input.display());
        }
    }
    paths.sort();

    paths.iter().map(|path| BatchFile::from_path(path)).collect()
}

fn is_workbook(path: &Path) -> bool {
    path.is_file()
        && matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("xlsx") | Some("xls") | Some("xlsm")
        )
}

fn print_report(report: &BatchReport) {
    for file in &report.files {
        if file.success {
            let flag = if file.unchanged {
                "unchanged"
            } else if file.needs_review {
                "NEEDS REVIEW"
            } else {
                "ok"
            };
            println!(
                "  ✓ {} [{}] confidence {:.2} - unit {}, {} component(s), {} cylinder(s)",
                file.file,
                flag,
                file.confidence,
                file.unit
                    .as_ref()
                    .map(|u| u.serial_number.as_str())
                    .unwrap_or("?"),
                file.components.len(),
                file.cylinders.len(),
            );
        } else {
            let reason = if file.errors.is_empty() {
                "unknown error".to_string()
            } else {
                file.errors.join("; ")
            };
            println!("  ✗ {} - {}", file.file, reason);
        }
        for diagnostic in &file.diagnostics {
            println!(
                "      · [{}] {}: {}",
                diagnostic.code.as_str(),
                diagnostic.field,
                diagnostic.message
            );
        }
    }

    println!(
        "\n📊 {} file(s): {} imported, {} failed, {} unchanged, {} flagged for review",
        report.total_files, report.succeeded, report.failed, report.unchanged, report.needs_review
    );
}
