//! End-to-end tests of the command-line driver.

#![allow(clippy::unwrap_used)]

use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use ttnn_tidy::entry_point::run_with_args_to;
use ttnn_tidy::test_utils::{alias, namespace, record, record_type, Fixture};

const TYPES: &str = "\
namespace slice {
struct tensor_args_t {};
using spec_return_value_t = TensorSpec;
}
";

/// Writes a types header and its exported unit; returns (header, unit document).
fn write_types_unit(dir: &Path) -> Result<(PathBuf, PathBuf)> {
    let header = dir.join("slice_device_operation_types.hpp");
    fs::write(&header, TYPES)?;

    let fx = Fixture::new(header.clone(), TYPES);
    let unit = fx.unit(vec![namespace(
        "slice",
        fx.whole(),
        vec![
            record(
                "tensor_args_t",
                fx.span("struct", "};"),
                fx.find("tensor_args_t"),
                Vec::new(),
            ),
            alias(
                "spec_return_value_t",
                fx.span("using", "= TensorSpec"),
                fx.find("spec_return_value_t"),
                record_type(fx.find_after("= ", "TensorSpec"), "TensorSpec", "ttnn::TensorSpec"),
            ),
        ],
    )]);
    let document = dir.join("slice_device_operation_types.json");
    fs::write(&document, serde_json::to_string(&unit)?)?;
    Ok((header, document))
}

#[test]
fn test_list_rules() -> Result<()> {
    let mut cmd = Command::cargo_bin("ttnn-tidy-bin")?;
    cmd.arg("--list-rules")
        .assert()
        .success()
        .stdout(predicate::str::contains("ttnn-nanobind-unnecessary-overload"))
        .stdout(predicate::str::contains("ttnn-operation-type-naming"))
        .stdout(predicate::str::contains("ttnn-return-value-type-alias"));
    Ok(())
}

#[test]
fn test_json_output() -> Result<()> {
    let temp = TempDir::new()?;
    let (_, document) = write_types_unit(temp.path())?;

    let output = Command::cargo_bin("ttnn-tidy-bin")?
        .arg("--json")
        .arg(&document)
        .output()?;
    assert!(output.status.success());

    let findings: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    let findings = findings.as_array().unwrap();
    assert_eq!(findings.len(), 2);
    assert_eq!(findings[0]["rule_id"], "ttnn-operation-type-naming");
    assert_eq!(findings[0]["line"], 2);
    assert_eq!(findings[0]["edits"][0]["kind"], "replace");
    assert_eq!(findings[0]["edits"][0]["text"], "SliceInputs");
    assert_eq!(findings[1]["rule_id"], "ttnn-return-value-type-alias");
    assert_eq!(findings[1]["args"][0], "spec_return_value_t");
    assert_eq!(findings[1]["edits"][0]["kind"], "remove");
    Ok(())
}

#[test]
fn test_fail_on_findings_sets_exit_code() -> Result<()> {
    let temp = TempDir::new()?;
    let (_, document) = write_types_unit(temp.path())?;

    Command::cargo_bin("ttnn-tidy-bin")?
        .arg(&document)
        .assert()
        .success()
        .stdout(predicate::str::contains("should be renamed to 'SliceInputs'"));

    Command::cargo_bin("ttnn-tidy-bin")?
        .arg("--fail-on-findings")
        .arg(&document)
        .assert()
        .code(1);
    Ok(())
}

#[test]
fn test_rule_selection() -> Result<()> {
    let temp = TempDir::new()?;
    let (_, document) = write_types_unit(temp.path())?;

    let output = Command::cargo_bin("ttnn-tidy-bin")?
        .args(["--json", "--rule", "ttnn-return-value-type-alias"])
        .arg(&document)
        .output()?;
    let findings: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(findings.as_array().unwrap().len(), 1);
    assert_eq!(findings[0]["rule_id"], "ttnn-return-value-type-alias");
    Ok(())
}

#[test]
fn test_unknown_rule_is_rejected() -> Result<()> {
    let temp = TempDir::new()?;
    let (_, document) = write_types_unit(temp.path())?;

    Command::cargo_bin("ttnn-tidy-bin")?
        .args(["--rule", "ttnn-made-up"])
        .arg(&document)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown rule id 'ttnn-made-up'"));
    Ok(())
}

#[test]
fn test_dry_run_prints_without_writing() -> Result<()> {
    let temp = TempDir::new()?;
    let (header, document) = write_types_unit(temp.path())?;

    Command::cargo_bin("ttnn-tidy-bin")?
        .args(["--fix", "--dry-run"])
        .arg(&document)
        .assert()
        .success()
        .stdout(predicate::str::contains("struct SliceInputs {};"))
        .stdout(predicate::str::contains("spec_return_value_t").not());

    assert_eq!(fs::read_to_string(&header)?, TYPES);
    Ok(())
}

#[test]
fn test_fix_rewrites_main_file() -> Result<()> {
    let temp = TempDir::new()?;
    let (header, document) = write_types_unit(temp.path())?;

    let mut buffer = Vec::new();
    let args = vec!["--fix".to_owned(), document.to_string_lossy().to_string()];
    let code = run_with_args_to(args, &mut buffer)?;
    assert_eq!(code, 0);
    assert_eq!(
        fs::read_to_string(&header)?,
        "namespace slice {\nstruct SliceInputs {};\n}\n"
    );
    Ok(())
}

#[test]
fn test_config_ignore_applies() -> Result<()> {
    let temp = TempDir::new()?;
    let (_, document) = write_types_unit(temp.path())?;
    fs::write(
        temp.path().join(".ttnn-tidy.toml"),
        "[ttnn-tidy]\nignore = [\"ttnn-operation-type-naming\"]\n",
    )?;

    let mut buffer = Vec::new();
    let args = vec!["--json".to_owned(), document.to_string_lossy().to_string()];
    run_with_args_to(args, &mut buffer)?;
    let findings: serde_json::Value = serde_json::from_slice(&buffer)?;
    assert_eq!(findings.as_array().unwrap().len(), 1);
    assert_eq!(findings[0]["rule_id"], "ttnn-return-value-type-alias");
    Ok(())
}

#[test]
fn test_unreadable_input_fails() -> Result<()> {
    let temp = TempDir::new()?;
    let missing = temp.path().join("missing.json");
    let bad = temp.path().join("bad.json");
    fs::write(&bad, "{ not json")?;

    Command::cargo_bin("ttnn-tidy-bin")?
        .arg(&missing)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to read"));
    Command::cargo_bin("ttnn-tidy-bin")?
        .arg(&bad)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid translation unit"));
    Ok(())
}

#[test]
fn test_help_goes_to_writer() -> Result<()> {
    let mut buffer = Vec::new();
    let code = run_with_args_to(vec!["--help".to_owned()], &mut buffer)?;
    assert_eq!(code, 0);
    let help = String::from_utf8(buffer)?;
    assert!(help.contains("--fail-on-findings"));
    assert!(help.contains(".ttnn-tidy.toml"));
    Ok(())
}
