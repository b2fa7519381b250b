//! Call-site simplification of single-overload `nanobind_overload_t` registrations.

#![allow(clippy::unwrap_used)]

use ttnn_tidy::ast::{Expr, FileId, TranslationUnit};
use ttnn_tidy::config::Config;
use ttnn_tidy::fix::apply_findings;
use ttnn_tidy::linter::Linter;
use ttnn_tidy::rules::ids::RULE_ID_NANOBIND_OVERLOAD;
use ttnn_tidy::rules::RuleRegistry;
use ttnn_tidy::test_utils::{
    call, compound, construct, decl_ref, expr_stmt, function, lambda, literal, param, ret, Fixture,
};

const HOST: Option<&str> = Some("ttnn::bind_registered_operation");
const MARKER_TY: &str = "ttnn::nanobind_overload_t<(lambda), const char *>";

fn run(unit: &TranslationUnit) -> Vec<ttnn_tidy::diagnostics::Finding> {
    let linter = Linter::new(RuleRegistry::from_config(&Config::default()));
    linter.run_rule(RULE_ID_NANOBIND_OVERLOAD, unit).unwrap()
}

/// `[](auto self, auto a){ return self(a); }` as written in `fx`.
fn forwarding_lambda(fx: &Fixture) -> Expr {
    lambda(
        fx.span("[](auto self", "; }"),
        vec![
            param("self", fx.find("auto self")),
            param("a", fx.find("auto a")),
        ],
        compound(
            fx.span("{ return", "; }"),
            vec![ret(
                fx.span("return self", ";"),
                call(
                    fx.find("self(a)"),
                    None,
                    decl_ref(fx.find_after("return", "self"), "self"),
                    vec![decl_ref(fx.find_after("self(", "a"), "a")],
                ),
            )],
        ),
    )
}

/// Wraps the host call `host` into `void bind(...) { host; }`.
fn bind_unit(fx: &Fixture, host: Expr) -> TranslationUnit {
    fx.unit(vec![function(
        "bind",
        fx.whole(),
        None,
        Vec::new(),
        compound(fx.span("{\n", "}\n"), vec![expr_stmt(host)]),
    )])
}

fn host_call(fx: &Fixture, overloads: Vec<Expr>) -> Expr {
    let mut args = vec![
        decl_ref(fx.find("m,"), "m"),
        decl_ref(fx.find("op,"), "op"),
        decl_ref(fx.find("doc,"), "doc"),
    ];
    args.extend(overloads);
    call(
        fx.span("bind_registered_operation(", "})"),
        HOST,
        decl_ref(fx.find("bind_registered_operation"), "bind_registered_operation"),
        args,
    )
}

const SINGLE: &str = "void bind(nb::module_& m) {\n    bind_registered_operation(m, op, doc, ttnn::nanobind_overload_t{[](auto self, auto a){ return self(a); }, \"doc\"});\n}\n";

fn single_overload_unit(text: &str) -> TranslationUnit {
    let fx = Fixture::new("bind_op_nanobind.cpp", text);
    let marker = construct(
        fx.span("ttnn::nanobind_overload_t{", "\"doc\"}"),
        MARKER_TY,
        vec![forwarding_lambda(&fx), literal(fx.find("\"doc\""), "const char[4]")],
    );
    bind_unit(&fx, host_call(&fx, vec![marker]))
}

#[test]
fn test_single_overload_is_rewritten() {
    let unit = single_overload_unit(SINGLE);
    let findings = run(&unit);
    assert_eq!(findings.len(), 1);
    let finding = &findings[0];
    assert_eq!(finding.rule_id, RULE_ID_NANOBIND_OVERLOAD);
    assert_eq!(
        finding.message,
        "unnecessary use of nanobind_overload_t with a single overload; use nanobind_arguments_t instead"
    );
    assert_eq!((finding.line, finding.col), (2, 5));
    assert_eq!(finding.edits.len(), 2);

    let fixed = apply_findings(SINGLE, &findings).unwrap();
    assert_eq!(
        fixed.source,
        "void bind(nb::module_& m) {\n    bind_registered_operation(m, op, doc, ttnn::nanobind_arguments_t{\"doc\"});\n}\n"
    );
}

#[test]
fn test_closure_located_in_another_file_is_kept() {
    let fx = Fixture::new("bind_op_nanobind.cpp", SINGLE);
    let mut closure = forwarding_lambda(&fx);
    if let Expr::Lambda(l) = &mut closure {
        l.range.file = FileId(1);
    }
    let marker = construct(
        fx.span("ttnn::nanobind_overload_t{", "\"doc\"}"),
        MARKER_TY,
        vec![closure, literal(fx.find("\"doc\""), "const char[4]")],
    );
    let unit = bind_unit(&fx, host_call(&fx, vec![marker]));

    let findings = run(&unit);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].edits.len(), 1);
    let fixed = apply_findings(SINGLE, &findings).unwrap().source;
    assert_eq!(fixed, SINGLE.replace("nanobind_overload_t", "nanobind_arguments_t"));
}

#[test]
fn test_rewritten_call_is_not_flagged_again() {
    let unit = single_overload_unit(SINGLE);
    let fixed = apply_findings(SINGLE, &run(&unit)).unwrap().source;

    let fx = Fixture::new("bind_op_nanobind.cpp", fixed.as_str());
    let marker = construct(
        fx.span("ttnn::nanobind_arguments_t{", "\"doc\"}"),
        "ttnn::nanobind_arguments_t<const char *>",
        vec![literal(fx.find("\"doc\""), "const char[4]")],
    );
    let reparsed = bind_unit(&fx, host_call(&fx, vec![marker]));
    assert!(run(&reparsed).is_empty());
}

#[test]
fn test_marker_count_must_be_exactly_one() {
    let text = "void bind(nb::module_& m) {\n    bind_registered_operation(m, op, doc, ttnn::nanobind_overload_t{f, \"a\"}, ttnn::nanobind_overload_t{g, \"b\"});\n}\n";
    let fx = Fixture::new("bind_op_nanobind.cpp", text);
    let first = construct(
        fx.span("ttnn::nanobind_overload_t{f", "\"a\"}"),
        MARKER_TY,
        vec![decl_ref(fx.find("f,"), "f"), literal(fx.find("\"a\""), "const char[2]")],
    );
    let second = construct(
        fx.span("ttnn::nanobind_overload_t{g", "\"b\"}"),
        MARKER_TY,
        vec![decl_ref(fx.find("g,"), "g"), literal(fx.find("\"b\""), "const char[2]")],
    );

    let none = bind_unit(&fx, host_call(&fx, Vec::new()));
    assert!(run(&none).is_empty());

    let one = bind_unit(&fx, host_call(&fx, vec![first.clone()]));
    assert_eq!(run(&one).len(), 1);

    let two = bind_unit(&fx, host_call(&fx, vec![first, second]));
    assert!(run(&two).is_empty());
}

#[test]
fn test_other_host_function_is_ignored() {
    let fx = Fixture::new("bind_op_nanobind.cpp", SINGLE);
    let marker = construct(
        fx.span("ttnn::nanobind_overload_t{", "\"doc\"}"),
        MARKER_TY,
        vec![forwarding_lambda(&fx), literal(fx.find("\"doc\""), "const char[4]")],
    );
    let Expr::Call(mut host) = host_call(&fx, vec![marker]) else {
        unreachable!()
    };
    host.callee.qualified_name = Some("ttnn::bind_function".to_owned());
    let unit = bind_unit(&fx, Expr::Call(host));
    assert!(run(&unit).is_empty());
}

#[test]
fn test_swapped_forward_keeps_closure() {
    let text = "void bind(nb::module_& m) {\n    bind_registered_operation(m, op, doc, nanobind_overload_t{[](auto self, auto a, auto b){ return self(b, a); }, \"doc\"});\n}\n";
    let fx = Fixture::new("bind_op_nanobind.cpp", text);
    let closure = lambda(
        fx.span("[](auto self", "; }"),
        vec![
            param("self", fx.find("auto self")),
            param("a", fx.find("auto a")),
            param("b", fx.find("auto b")),
        ],
        compound(
            fx.span("{ return", "; }"),
            vec![ret(
                fx.span("return self", ";"),
                call(
                    fx.find("self(b, a)"),
                    None,
                    decl_ref(fx.find_after("return", "self"), "self"),
                    vec![
                        decl_ref(fx.find_after("self(", "b"), "b"),
                        decl_ref(fx.find_after("self(b, ", "a"), "a"),
                    ],
                ),
            )],
        ),
    );
    let marker = construct(
        fx.span("nanobind_overload_t{", "\"doc\"}"),
        MARKER_TY,
        vec![closure, literal(fx.find("\"doc\""), "const char[4]")],
    );
    let unit = bind_unit(&fx, host_call(&fx, vec![marker]));

    let findings = run(&unit);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].edits.len(), 1);
    let fixed = apply_findings(text, &findings).unwrap().source;
    // Unqualified spelling stays unqualified; the closure survives.
    assert!(fixed.contains("nanobind_arguments_t{[](auto self, auto a, auto b){ return self(b, a); }, \"doc\"}"));
    assert!(!fixed.contains("ttnn::nanobind_arguments_t"));
}

#[test]
fn test_literal_argument_is_not_a_forward() {
    let text = "void bind(nb::module_& m) {\n    bind_registered_operation(m, op, doc, ttnn::nanobind_overload_t{[](auto self, auto a){ return self(1); }, \"doc\"});\n}\n";
    let fx = Fixture::new("bind_op_nanobind.cpp", text);
    let closure = lambda(
        fx.span("[](auto self", "; }"),
        vec![param("self", fx.find("auto self")), param("a", fx.find("auto a"))],
        ret(
            fx.span("return self", ";"),
            call(
                fx.find("self(1)"),
                None,
                decl_ref(fx.find_after("return", "self"), "self"),
                vec![literal(fx.find("1)"), "int")],
            ),
        ),
    );
    let marker = construct(
        fx.span("ttnn::nanobind_overload_t{", "\"doc\"}"),
        MARKER_TY,
        vec![closure, literal(fx.find("\"doc\""), "const char[4]")],
    );
    let unit = bind_unit(&fx, host_call(&fx, vec![marker]));

    let findings = run(&unit);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].edits.len(), 1);
    assert_eq!(findings[0].edits[0].replacement(), "ttnn::nanobind_arguments_t");
}

#[test]
fn test_companion_declaration_is_removed_with_closure() {
    let text = "void bind(nb::module_& m) {\n    using OperationType = decltype(ttnn::slice);\n    bind_registered_operation(m, op, doc, ttnn::nanobind_overload_t{[](auto self, auto a){ return self(a); }, \"doc\"});\n}\n";
    let unit = single_overload_unit(text);
    let findings = run(&unit);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].edits.len(), 3);

    let fixed = apply_findings(text, &findings).unwrap().source;
    assert_eq!(
        fixed,
        "void bind(nb::module_& m) {\n    bind_registered_operation(m, op, doc, ttnn::nanobind_arguments_t{\"doc\"});\n}\n"
    );
}

#[test]
fn test_closure_on_its_own_line_keeps_sibling_indentation() {
    let text = "void bind(nb::module_& m) {\n    bind_registered_operation(m, op, doc, ttnn::nanobind_overload_t{\n        [](auto self, auto a){ return self(a); },\n        \"doc\"});\n}\n";
    let unit = single_overload_unit(text);
    let fixed = apply_findings(text, &run(&unit)).unwrap().source;
    assert_eq!(
        fixed,
        "void bind(nb::module_& m) {\n    bind_registered_operation(m, op, doc, ttnn::nanobind_arguments_t{\n        \"doc\"});\n}\n"
    );
}

#[test]
fn test_call_in_included_header_is_ignored() {
    let mut unit = single_overload_unit(SINGLE);
    let mut header = unit.files[0].clone();
    header.id = ttnn_tidy::ast::FileId(1);
    header.path = "bind_op_nanobind.hpp".into();
    unit.files.push(header);
    unit.main_file = ttnn_tidy::ast::FileId(1);
    assert!(run(&unit).is_empty());
}
