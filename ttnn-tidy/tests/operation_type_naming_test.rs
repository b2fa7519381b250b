//! Renaming of generic operation parameter structs and their qualified uses.

#![allow(clippy::unwrap_used)]

use ttnn_tidy::ast::{Decl, TranslationUnit};
use ttnn_tidy::config::Config;
use ttnn_tidy::diagnostics::Finding;
use ttnn_tidy::fix::apply_findings;
use ttnn_tidy::linter::Linter;
use ttnn_tidy::rules::ids::RULE_ID_OPERATION_TYPE_NAMING;
use ttnn_tidy::rules::RuleRegistry;
use ttnn_tidy::test_utils::{namespace, record, record_type, var, Fixture};

const TYPES_FILE: &str = "slice_device_operation_types.hpp";

fn run(unit: &TranslationUnit) -> Vec<Finding> {
    let linter = Linter::new(RuleRegistry::from_config(&Config::default()));
    linter.run_rule(RULE_ID_OPERATION_TYPE_NAMING, unit).unwrap()
}

/// Nests `decls` in one namespace per `::`-separated component of `path`.
fn nested(fx: &Fixture, path: &str, decls: Vec<Decl>) -> Vec<Decl> {
    path.rsplit("::").fold(decls, |inner, name| {
        vec![namespace(name, fx.whole(), inner)]
    })
}

fn struct_decls(fx: &Fixture) -> Vec<Decl> {
    vec![
        record(
            "operation_attributes_t",
            fx.span("struct operation_attributes_t", "};"),
            fx.find("operation_attributes_t"),
            Vec::new(),
        ),
        record(
            "tensor_args_t",
            fx.span("struct tensor_args_t", "};"),
            fx.find("tensor_args_t"),
            Vec::new(),
        ),
    ]
}

const SLICE_TYPES: &str = "\
namespace ttnn::operations::data_movement::slice {

struct operation_attributes_t {
    int dim;
};

struct tensor_args_t {
    Tensor input;
};

}  // namespace ttnn::operations::data_movement::slice
";

#[test]
fn test_structs_are_renamed_after_operation_scope() {
    let fx = Fixture::new(TYPES_FILE, SLICE_TYPES);
    let unit = fx.unit(nested(&fx, "ttnn::operations::data_movement::slice", struct_decls(&fx)));

    let findings = run(&unit);
    assert_eq!(findings.len(), 2);
    assert_eq!(
        findings[0].message,
        "generic type name 'operation_attributes_t' should be renamed to 'SliceParams'"
    );
    assert_eq!(
        findings[1].message,
        "generic type name 'tensor_args_t' should be renamed to 'SliceInputs'"
    );
    assert_eq!(findings[0].line, 3);

    let fixed = apply_findings(SLICE_TYPES, &findings).unwrap();
    assert_eq!(fixed.applied, 2);
    assert!(fixed.source.contains("struct SliceParams {"));
    assert!(fixed.source.contains("struct SliceInputs {"));
}

#[test]
fn test_snake_case_operation_becomes_pascal_case() {
    let text = "namespace ttnn::operations::normalization::batch_norm {\nstruct operation_attributes_t {};\n}\n";
    let fx = Fixture::new("batch_norm_device_operation_types.hpp", text);
    let decls = vec![record(
        "operation_attributes_t",
        fx.span("struct", "};"),
        fx.find("operation_attributes_t"),
        Vec::new(),
    )];
    let unit = fx.unit(nested(&fx, "ttnn::operations::normalization::batch_norm", decls));

    let findings = run(&unit);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].edits[0].replacement(), "BatchNormParams");
}

#[test]
fn test_undetermined_operation_reports_without_fix() {
    let text = "namespace ttnn::operations::data_movement {\nstruct tensor_args_t {};\n}\n";
    let fx = Fixture::new(TYPES_FILE, text);
    let decls = vec![record(
        "tensor_args_t",
        fx.span("struct", "};"),
        fx.find("tensor_args_t"),
        Vec::new(),
    )];
    let unit = fx.unit(nested(&fx, "ttnn::operations::data_movement", decls));

    let findings = run(&unit);
    assert_eq!(findings.len(), 1);
    assert!(!findings[0].has_fix());
    assert_eq!(
        findings[0].message,
        "generic type name 'tensor_args_t' should be renamed to an operation-specific name (e.g., '{Operation}Params' or '{Operation}Inputs')"
    );
}

#[test]
fn test_definitions_outside_types_files_are_ignored() {
    let fx = Fixture::new("slice_device_operation.hpp", SLICE_TYPES);
    let unit = fx.unit(nested(&fx, "ttnn::operations::data_movement::slice", struct_decls(&fx)));
    assert!(run(&unit).is_empty());
}

#[test]
fn test_qualified_use_is_replaced() {
    let text = "const slice::tensor_args_t& args = get();\n";
    let fx = Fixture::new("slice_program_factory.cpp", text);
    let ty = record_type(
        fx.find("slice::tensor_args_t"),
        "slice::tensor_args_t",
        "struct ttnn::operations::data_movement::slice::tensor_args_t",
    );
    let unit = fx.unit(vec![var("args", fx.span("const", "get()"), ty, None)]);

    let findings = run(&unit);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].message, "replace 'slice::tensor_args_t' with 'SliceInputs'");
    let fixed = apply_findings(text, &findings).unwrap().source;
    assert_eq!(fixed, "const SliceInputs& args = get();\n");
}

#[test]
fn test_device_operation_member_alias_is_skipped() {
    let text = "SliceDeviceOperation::operation_attributes_t attrs;\n";
    let fx = Fixture::new("slice_program_factory.cpp", text);
    let ty = record_type(
        fx.find("SliceDeviceOperation::operation_attributes_t"),
        "SliceDeviceOperation::operation_attributes_t",
        "ttnn::operations::data_movement::SliceDeviceOperation::operation_attributes_t",
    );
    let unit = fx.unit(vec![var("attrs", fx.span("Slice", "attrs"), ty, None)]);
    assert!(run(&unit).is_empty());
}

#[test]
fn test_uses_inside_types_files_are_skipped() {
    let text = "slice::tensor_args_t args;\n";
    let fx = Fixture::new(TYPES_FILE, text);
    let ty = record_type(
        fx.find("slice::tensor_args_t"),
        "slice::tensor_args_t",
        "struct ttnn::operations::data_movement::slice::tensor_args_t",
    );
    let unit = fx.unit(vec![var("args", fx.whole(), ty, None)]);
    assert!(run(&unit).is_empty());
}
