use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

use lexfuse::{
    BuildConfig, BuildReport, DatabaseBuilder, SourceRecord, TableAnalyzer, snapshot,
};

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("build") => {
            let config_path = args
                .get(2)
                .map(String::as_str)
                .unwrap_or("lexfuse.json");
            run_build(Path::new(config_path))
        }
        _ => {
            eprintln!("lexfuse {} - cross-source dictionary merge engine", lexfuse::VERSION);
            eprintln!();
            eprintln!("Usage:");
            eprintln!("  lexfuse build [config.json]   build the canonical database");
            std::process::exit(2);
        }
    }
}

fn run_build(config_path: &Path) -> Result<()> {
    println!("📖 Lexfuse - building canonical lexical database");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // 1. Load configuration
    let config = BuildConfig::load_from_file(config_path)?;
    println!(
        "✓ Config loaded: {} sources, τ = {}",
        config.sources.len(),
        config.similarity_threshold
    );

    // 2. Load the analyzer table, when configured
    let analyzer = match &config.analyzer_table {
        Some(path) => {
            let analyzer = TableAnalyzer::load_from_file(path)?;
            println!("✓ Analyzer table loaded from {}", path.display());
            analyzer
        }
        None => {
            println!("- No analyzer table configured; analyzer-assisted matching disabled");
            TableAnalyzer::new()
        }
    };

    // 3. Read the existing snapshot
    let database_path = config
        .database_path
        .clone()
        .unwrap_or_else(|| PathBuf::from("database.ndjson"));
    let existing = snapshot::read_entries(&database_path)?;
    println!(
        "✓ Snapshot read: {} entries from {}",
        existing.len(),
        database_path.display()
    );

    // 4. Read every source's converted records
    let mut source_records: Vec<Vec<SourceRecord>> = Vec::new();
    for source in &config.sources {
        let path = source
            .path
            .as_ref()
            .with_context(|| format!("Source {} has no records path configured", source.tag))?;
        let records = snapshot::read_records(path)?;
        println!("✓ Source {}: {} records", source.tag, records.len());
        source_records.push(records);
    }

    // 5. Build
    let builder = DatabaseBuilder::new(&config, &analyzer);
    let (entries, report) = builder.build(existing, source_records)?;

    // 6. Write the snapshot and the diagnostic side-files
    snapshot::write_entries(&database_path, &entries)?;
    println!("\n✓ Database written to {}", database_path.display());
    write_diagnostics(&database_path, &report)?;

    // 7. Summary
    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for import in &report.imports {
        println!("  {}", import.summary());
    }
    println!("  {}", report.summary());
    println!("✅ Build complete: {} entries", report.entry_count);

    Ok(())
}

/// Writes per-source unmatched/ambiguous/skipped records next to the
/// database so they can be reviewed upstream.
fn write_diagnostics(database_path: &Path, report: &BuildReport) -> Result<()> {
    let dir = database_path.parent().unwrap_or_else(|| Path::new("."));

    for import in &report.imports {
        write_diagnostic_file(dir, &import.source, "unmatched", &import.unmatched)?;
        write_diagnostic_file(dir, &import.source, "ambiguous", &import.ambiguous)?;
        write_diagnostic_file(dir, &import.source, "skipped", &import.skipped)?;
    }

    let unresolved = &report.unresolved_analyses;
    if !unresolved.is_empty() {
        let path = dir.join("unresolved-analyses.json");
        let json = serde_json::to_string_pretty(unresolved)?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!(
            "⚠ {} unresolved analyses written to {}",
            unresolved.len(),
            path.display()
        );
    }

    Ok(())
}

fn write_diagnostic_file(
    dir: &Path,
    source: &str,
    kind: &str,
    records: &[SourceRecord],
) -> Result<()> {
    if records.is_empty() {
        return Ok(());
    }
    let path = dir.join(format!("{}-{}.ndjson", source, kind));
    snapshot::write_records(&path, records)?;
    println!("⚠ {} {} records written to {}", records.len(), kind, path.display());
    Ok(())
}
