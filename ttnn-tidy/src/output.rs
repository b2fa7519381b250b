use crate::diagnostics::Finding;
use crate::rules::RuleRegistry;
use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use rustc_hash::FxHashMap;
use std::io::Write;
use std::path::Path;

/// Helper to create a styled table
fn create_table(headers: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers);
    table
}

/// Print one line per finding, compiler style.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_findings(writer: &mut impl Write, findings: &[Finding]) -> std::io::Result<()> {
    for f in findings {
        let location = format!("{}:{}:{}", f.file.display(), f.line, f.col);
        let fix = if f.has_fix() {
            format!(" ({} edits)", f.edits.len()).green().to_string()
        } else {
            String::new()
        };
        writeln!(
            writer,
            "{}: {}: {} {}{}",
            location.bold(),
            f.severity.to_string().yellow().bold(),
            f.message,
            format!("[{}]", f.rule_id).dimmed(),
            fix
        )?;
    }
    Ok(())
}

/// Print per-rule counts of findings and offered fixes.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_summary(
    writer: &mut impl Write,
    registry: &RuleRegistry,
    findings: &[Finding],
    files: usize,
) -> std::io::Result<()> {
    let mut counts: FxHashMap<&str, (usize, usize)> = FxHashMap::default();
    for f in findings {
        let entry = counts.entry(f.rule_id.as_str()).or_default();
        entry.0 += 1;
        if f.has_fix() {
            entry.1 += 1;
        }
    }

    writeln!(writer)?;
    let mut table = create_table(vec!["Rule ID", "Findings", "Fixable"]);
    for id in registry.ids() {
        let (total, fixable) = counts.get(id).copied().unwrap_or_default();
        let color = if total == 0 { Color::Green } else { Color::Yellow };
        table.add_row(vec![
            Cell::new(id).add_attribute(Attribute::Dim),
            Cell::new(total).fg(color),
            Cell::new(fixable),
        ]);
    }
    writeln!(writer, "{table}")?;
    writeln!(
        writer,
        "{}",
        format!(
            "Analyzed {} translation units, {} findings",
            files.to_string().bold(),
            findings.len().to_string().bold()
        )
        .dimmed()
    )?;
    Ok(())
}

/// Print the registered rules.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_rule_list(writer: &mut impl Write, registry: &RuleRegistry) -> std::io::Result<()> {
    let mut table = create_table(vec!["Rule ID", "Category", "Description"]);
    for rule in registry.iter() {
        let meta = rule.metadata();
        table.add_row(vec![
            Cell::new(meta.id).add_attribute(Attribute::Bold),
            Cell::new(meta.category),
            Cell::new(meta.summary),
        ]);
    }
    writeln!(writer, "{table}")?;
    Ok(())
}

/// Report a file rewritten by `--fix`.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_fixed(writer: &mut impl Write, path: &Path, edits: usize) -> std::io::Result<()> {
    writeln!(
        writer,
        "{} {} ({} edits)",
        "Fixed".green().bold(),
        path.display(),
        edits
    )
}
