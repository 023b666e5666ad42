//! Human-readable progress and results on stdout.

use std::path::Path;

use colored::Colorize;
use ct_core::core::ThemeResult;
use ct_jsonl::{LineError, Recommendation, ValidationReport};

use crate::pipeline::EnrichmentSummary;

// ---------------------------------------------------------------------------
// check-jsonl
// ---------------------------------------------------------------------------

pub fn print_validation_report(report: &ValidationReport, min_examples: usize, max_listed: usize) {
    println!("{}", format!("Checking file: {}", report.path.display()).bright_blue());
    println!();
    println!("File size: {:.2} MB", report.size_mb());
    if report.has_bom {
        println!("BOM present: {}", "Yes (UTF-8 with BOM)".bright_green());
    } else {
        println!("BOM present: {}", "No (save as UTF-8 with BOM)".red());
    }

    println!();
    println!("{}", format!("Valid examples: {}", report.valid_count).bright_green());
    if report.blank_count > 0 {
        println!("Blank lines skipped: {}", report.blank_count);
    }

    if report.errors.is_empty() {
        println!("{}", "All examples are valid JSONL.".bright_green());
    } else {
        println!();
        println!("{}", format!("{} issues found:", report.errors.len()).red());
        for line in error_listing(&report.errors, max_listed) {
            println!("{line}");
        }
    }

    println!();
    let recommendation = report.recommendation(min_examples);
    match recommendation {
        Recommendation::Passes => println!("{}", recommendation.to_string().bright_green()),
        _ => println!("{}", format!("Recommendation: {recommendation}").yellow()),
    }
}

/// `Line N: reason` for the first `max_listed` errors, then a remainder note.
pub fn error_listing(errors: &[LineError], max_listed: usize) -> Vec<String> {
    let mut lines: Vec<String> = errors
        .iter()
        .take(max_listed)
        .map(|e| format!("  Line {}: {}", e.line, e.reason()))
        .collect();
    if errors.len() > max_listed {
        lines.push(format!("  ... and {} more", errors.len() - max_listed));
    }
    lines
}

// ---------------------------------------------------------------------------
// themes
// ---------------------------------------------------------------------------

pub fn run_started() {
    println!("{}", "=== Comment Theme Analysis ===".bright_blue());
}

pub fn table_loaded(path: &Path, rows: usize) {
    println!("{}", format!("Loaded {rows} rows from {}", path.display()).bright_green());
    println!("{}", "--- Analysing comments ---".bright_blue());
}

pub fn row_started(row: usize, total: usize) {
    println!("{}", format!("Processing Row {row}/{total}").cyan());
}

pub fn row_skipped() {
    println!("{}", "   Empty comment - skipping".yellow());
}

pub fn row_finished(result: &ThemeResult) {
    match result.failure() {
        None => println!(
            "{}",
            format!("   Themes extracted: {}", result.themes().join(", ")).bright_green()
        ),
        Some(failure) => println!("{}", format!("   Fallback recorded: {failure}").yellow()),
    }
}

pub fn saving(path: &Path) {
    println!("{}", format!("Saving results to {}...", path.display()).cyan());
}

pub fn run_finished(summary: &EnrichmentSummary) {
    println!(
        "{}",
        format!(
            "Done: {} rows, {} service calls, {} blank comments, {} fallbacks.",
            summary.rows, summary.service_calls, summary.blank_comments, summary.fallbacks
        )
        .bright_green()
    );
}
