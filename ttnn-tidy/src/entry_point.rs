use crate::ast::TranslationUnit;
use crate::cli::Cli;
use crate::config::Config;
use crate::constants::LOG_ENV_VAR;
use crate::diagnostics::Finding;
use crate::fix::apply_findings;
use crate::linter::Linter;
use crate::rules::ids::ALL_RULE_IDS;
use crate::rules::RuleRegistry;
use anyhow::{Context as _, Result};
use clap::Parser;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Result of processing one input document.
struct FileOutcome {
    input: PathBuf,
    findings: Vec<Finding>,
    /// Rewritten main file and its path, when `--fix` applied something.
    fixed: Option<(PathBuf, String, usize)>,
}

/// Runs ttnn-tidy with the given arguments.
///
/// # Errors
///
/// Returns an error if argument parsing fails, or if the command execution fails.
pub fn run_with_args(args: Vec<String>) -> Result<i32> {
    run_with_args_to(args, &mut std::io::stdout())
}

/// Run ttnn-tidy with the given arguments, writing output to the specified writer.
///
/// This is the testable version of `run_with_args` that allows output capture.
///
/// # Errors
///
/// Returns an error if writing the output fails.
pub fn run_with_args_to<W: std::io::Write>(args: Vec<String>, writer: &mut W) -> Result<i32> {
    let mut program_args = vec!["ttnn-tidy".to_owned()];
    program_args.extend(args);
    let cli = match Cli::try_parse_from(program_args) {
        Ok(c) => c,
        Err(e) => match e.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                write!(writer, "{e}")?;
                writer.flush()?;
                return Ok(0);
            }
            _ => {
                eprint!("{e}");
                return Ok(1);
            }
        },
    };

    init_logging(cli.output.verbose);

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return Ok(1);
        }
    };

    if let Some(unknown) = cli
        .rules
        .iter()
        .find(|id| !ALL_RULE_IDS.contains(&id.as_str()))
    {
        eprintln!("Error: unknown rule id '{unknown}'. Use --list-rules to see the available rules.");
        return Ok(1);
    }
    let registry = if cli.rules.is_empty() {
        RuleRegistry::from_config(&config)
    } else {
        RuleRegistry::builtin(&config.tidy).select(&cli.rules)
    };

    if cli.list_rules {
        crate::output::print_rule_list(writer, &registry)?;
        return Ok(0);
    }

    tracing::debug!(
        rules = ?registry.ids(),
        threads = rayon::current_num_threads(),
        "starting analysis"
    );
    let linter = Linter::new(registry);

    let outcomes: Vec<Result<FileOutcome>> = cli
        .inputs
        .par_iter()
        .map(|input| process_input(&linter, input, cli.fix.fix))
        .collect();

    let mut failed = false;
    let mut findings = Vec::new();
    let mut analyzed = 0;
    for outcome in outcomes {
        match outcome {
            Ok(outcome) => {
                analyzed += 1;
                if let Some((path, source, edits)) = outcome.fixed {
                    if cli.fix.dry_run {
                        writeln!(writer, "--- {}", path.display())?;
                        write!(writer, "{source}")?;
                    } else if let Err(e) = std::fs::write(&path, source) {
                        eprintln!("Error: failed to write {}: {e}", path.display());
                        failed = true;
                    } else if !cli.output.json {
                        crate::output::print_fixed(writer, &path, edits)?;
                    }
                }
                tracing::info!(
                    input = %outcome.input.display(),
                    findings = outcome.findings.len(),
                    "processed"
                );
                findings.extend(outcome.findings);
            }
            Err(e) => {
                eprintln!("Error: {e:#}");
                failed = true;
            }
        }
    }

    if cli.output.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&findings)?)?;
    } else if !cli.fix.dry_run {
        crate::output::print_findings(writer, &findings)?;
        crate::output::print_summary(writer, linter.registry(), &findings, analyzed)?;
    }

    if failed || (cli.output.fail_on_findings && !findings.is_empty()) {
        Ok(1)
    } else {
        Ok(0)
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    if let Some(path) = &cli.config {
        return Ok(Config::load_file(path)?);
    }
    let start = cli
        .inputs
        .first()
        .map_or(Path::new("."), PathBuf::as_path);
    Ok(Config::load_from_path(start))
}

fn process_input(linter: &Linter, input: &Path, fix: bool) -> Result<FileOutcome> {
    let unit = TranslationUnit::from_json_file(input)?;
    let mut findings = Vec::new();
    for id in linter.registry().ids() {
        findings.extend(linter.run_rule(id, &unit)?);
    }

    let fixed = if fix && findings.iter().any(Finding::has_fix) {
        let main = unit
            .file(unit.main_file)
            .with_context(|| format!("{}: main file buffer missing", input.display()))?;
        let outcome = apply_findings(&main.text, &findings)
            .with_context(|| format!("{}: cannot apply fixes", input.display()))?;
        if outcome.skipped > 0 {
            tracing::warn!(
                input = %input.display(),
                skipped = outcome.skipped,
                "some fixes overlap earlier ones; run again to apply them"
            );
        }
        Some((main.path.clone(), outcome.source, outcome.applied))
    } else {
        None
    };

    Ok(FileOutcome {
        input: input.to_path_buf(),
        findings,
        fixed,
    })
}
