//! Precondition validators.
//!
//! Semantic checks deciding whether a matched candidate may be rewritten.

use crate::ast::{ConstructExpr, Expr, LambdaExpr, NamingContext, Stmt, TypeLoc};
use crate::config::{AliasTarget, TidyConfig};
use crate::matchers::strip_type_keywords;

/// The inline closure of a marker argument that only forwards to its receiver.
#[derive(Debug, Clone, Copy)]
pub struct ForwardingClosure<'a> {
    /// The marker construction holding the closure as its first argument.
    pub construct: &'a ConstructExpr,
    /// The closure itself.
    pub lambda: &'a LambdaExpr,
}

/// Returns the closure if the marker argument wraps a pure forwarder.
///
/// The closure must take a receiver plus at least one parameter and its body
/// must call the receiver with the remaining parameters, in order and untouched.
#[must_use]
pub fn forwarding_closure(marker: &Expr) -> Option<ForwardingClosure<'_>> {
    let Expr::Construct(construct) = marker.ignore_implicit() else {
        return None;
    };
    let Expr::Lambda(lambda) = construct.args.first()?.ignore_implicit() else {
        return None;
    };
    if lambda.params.len() < 2 {
        return None;
    }
    let receiver = lambda.params[0].name.as_str();
    if receiver.is_empty() {
        return None;
    }

    let forwarded = receiver_call_in_stmt(&lambda.body, receiver)?;
    let expected = &lambda.params[1..];
    if forwarded.len() != expected.len() {
        tracing::debug!(
            forwarded = forwarded.len(),
            params = expected.len(),
            "closure forwards a different number of arguments"
        );
        return None;
    }
    let in_order = forwarded.iter().zip(expected).all(|(arg, param)| {
        !param.name.is_empty()
            && matches!(arg.ignore_implicit(), Expr::DeclRef(r) if r.name == param.name)
    });
    if !in_order {
        tracing::debug!(range = ?lambda.range, "closure transforms or reorders its arguments");
        return None;
    }
    Some(ForwardingClosure { construct, lambda })
}

/// Arguments of the first call made through `receiver`; the first successful
/// statement of a compound wins.
fn receiver_call_in_stmt<'a>(stmt: &'a Stmt, receiver: &str) -> Option<&'a [Expr]> {
    match stmt {
        Stmt::Compound { stmts, .. } => stmts
            .iter()
            .find_map(|s| receiver_call_in_stmt(s, receiver)),
        Stmt::Return { value, .. } => receiver_call_in_expr(value.as_ref()?, receiver),
        Stmt::Expr { expr } => receiver_call_in_expr(expr, receiver),
        Stmt::Decl { .. } | Stmt::Other { .. } => None,
    }
}

fn receiver_call_in_expr<'a>(expr: &'a Expr, receiver: &str) -> Option<&'a [Expr]> {
    match expr.ignore_implicit() {
        Expr::Call(call) => {
            is_ref_to(&call.callee.expr, receiver).then_some(call.args.as_slice())
        }
        // `receiver(args...)` through `operator()`: the object is argument 0.
        Expr::OperatorCall(call) => {
            let (object, rest) = call.args.split_first()?;
            is_ref_to(object, receiver).then_some(rest)
        }
        Expr::Construct(construct) if construct.args.len() == 1 => {
            receiver_call_in_expr(&construct.args[0], receiver)
        }
        _ => None,
    }
}

fn is_ref_to(expr: &Expr, name: &str) -> bool {
    matches!(expr.ignore_implicit(), Expr::DeclRef(r) if r.name == name)
}

/// First enclosing scope name that is not a structural/category namespace.
///
/// `None` when every scope is denylisted (or there is none); the caller then
/// asks for a name instead of guessing one.
#[must_use]
pub fn derive_operation_name<'c>(
    context: &'c NamingContext,
    denylist: &[String],
) -> Option<&'c str> {
    context
        .iter()
        .find(|name| !denylist.iter().any(|denied| denied == name))
}

/// Whether an alias's underlying type spells one of the canonical targets
/// directly, optionally behind the canonical namespace.
#[must_use]
pub fn is_direct_alias_target(underlying: &TypeLoc, config: &TidyConfig) -> bool {
    config
        .aliases
        .iter()
        .any(|a| names_canonical(&underlying.spelled, &a.canonical, config))
}

/// Whether a use of a reserved alias resolves to the alias's canonical type.
///
/// A use whose alias wraps something else (`std::vector<Tensor>`) cannot be
/// spelled as the canonical type without changing its meaning.
#[must_use]
pub fn resolves_to_target(use_site: &TypeLoc, target: &AliasTarget, config: &TidyConfig) -> bool {
    names_canonical(&use_site.canonical, &target.canonical, config)
}

fn names_canonical(spelling: &str, canonical: &str, config: &TidyConfig) -> bool {
    let spelling = strip_type_keywords(spelling);
    let unqualified = spelling
        .strip_prefix(config.canonical_namespace.as_str())
        .and_then(|rest| rest.strip_prefix("::"))
        .unwrap_or(spelling);
    unqualified == canonical
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{FileId, SourceRange, TypeLocKind};
    use crate::test_utils::{
        call, compound, construct, decl_ref, expr_stmt, implicit, lambda, literal, materialize,
        operator_call, param, record_type, ret, typed_param,
    };

    const MARKER: &str = "ttnn::nanobind_overload_t<ttnn::SliceOperation>";

    fn r() -> SourceRange {
        SourceRange::new(FileId(0), 0, 0)
    }

    /// `nanobind_overload_t{[](self, params...) { body }}`
    fn marker_with(params: &[&str], body: Stmt) -> Expr {
        let params = params.iter().map(|name| param(name, r())).collect();
        construct(r(), MARKER, vec![lambda(r(), params, body)])
    }

    fn refs(names: &[&str]) -> Vec<Expr> {
        names.iter().map(|name| decl_ref(r(), name)).collect()
    }

    /// `return self(args...);` as a plain call through the receiver.
    fn return_call(receiver: &str, args: &[&str]) -> Stmt {
        compound(r(), vec![ret(r(), call(r(), None, decl_ref(r(), receiver), refs(args)))])
    }

    fn type_loc(spelled: &str) -> TypeLoc {
        TypeLoc {
            range: SourceRange::new(FileId(0), 0, 0),
            kind: TypeLocKind::Record,
            spelled: spelled.to_owned(),
            canonical: spelled.to_owned(),
            from_macro: false,
        }
    }

    #[test]
    fn test_scope_derivation_skips_denylist() {
        let config = TidyConfig::default();
        let context = NamingContext::from_innermost(["slice", "data_movement", "operations", "ttnn"]);
        assert_eq!(derive_operation_name(&context, &config.scope_denylist), Some("slice"));
    }

    #[test]
    fn test_scope_derivation_fails_when_all_denylisted() {
        let config = TidyConfig::default();
        let context = NamingContext::from_innermost(["data_movement", "operations", "ttnn"]);
        assert_eq!(derive_operation_name(&context, &config.scope_denylist), None);
        assert_eq!(
            derive_operation_name(&NamingContext::default(), &config.scope_denylist),
            None
        );
    }

    #[test]
    fn test_direct_alias_targets() {
        let config = TidyConfig::default();
        assert!(is_direct_alias_target(&type_loc("TensorSpec"), &config));
        assert!(is_direct_alias_target(&type_loc("ttnn::Tensor"), &config));
        assert!(is_direct_alias_target(&type_loc("class ttnn::TensorSpec"), &config));
        assert!(!is_direct_alias_target(&type_loc("std::vector<Tensor>"), &config));
        assert!(!is_direct_alias_target(&type_loc("std::optional<Tensor>"), &config));
        assert!(!is_direct_alias_target(&type_loc("tt::tt_metal::Tensor"), &config));
        assert!(!is_direct_alias_target(&type_loc("other_return_t"), &config));
    }

    #[test]
    fn test_alias_use_must_resolve_to_target() {
        let config = TidyConfig::default();
        let tensor = config
            .aliases
            .iter()
            .find(|a| a.name == "tensor_return_value_t")
            .unwrap();
        let mut use_site = type_loc("slice::tensor_return_value_t");
        use_site.canonical = "ttnn::Tensor".to_owned();
        assert!(resolves_to_target(&use_site, tensor, &config));
        use_site.canonical = "class Tensor".to_owned();
        assert!(resolves_to_target(&use_site, tensor, &config));
        use_site.canonical = "std::vector<ttnn::Tensor>".to_owned();
        assert!(!resolves_to_target(&use_site, tensor, &config));
        use_site.canonical = String::new();
        assert!(!resolves_to_target(&use_site, tensor, &config));
    }

    #[test]
    fn test_plain_call_forwards() {
        let marker = marker_with(&["self", "a", "b"], return_call("self", &["a", "b"]));
        assert!(forwarding_closure(&marker).is_some());
    }

    #[test]
    fn test_operator_call_excludes_receiver_from_count() {
        let body = compound(
            r(),
            vec![ret(r(), operator_call(r(), decl_ref(r(), "self"), refs(&["a", "b"])))],
        );
        let marker = marker_with(&["self", "a", "b"], body);
        let closure = forwarding_closure(&marker).unwrap();
        assert_eq!(closure.lambda.params.len(), 3);
    }

    #[test]
    fn test_operator_call_on_other_object_is_rejected() {
        let body = compound(
            r(),
            vec![ret(r(), operator_call(r(), decl_ref(r(), "a"), refs(&["self", "b"])))],
        );
        assert!(forwarding_closure(&marker_with(&["self", "a", "b"], body)).is_none());
    }

    #[test]
    fn test_later_statement_can_forward() {
        let log = call(r(), Some("tt::log_debug"), decl_ref(r(), "log_debug"), refs(&["a"]));
        let forward = operator_call(r(), decl_ref(r(), "self"), refs(&["a"]));
        let body = compound(r(), vec![expr_stmt(log), ret(r(), forward)]);
        assert!(forwarding_closure(&marker_with(&["self", "a"], body)).is_some());
    }

    #[test]
    fn test_implicit_wrappers_are_transparent() {
        let args = vec![implicit(decl_ref(r(), "a")), materialize(implicit(decl_ref(r(), "b")))];
        let forward = materialize(implicit(operator_call(
            r(),
            implicit(decl_ref(r(), "self")),
            args,
        )));
        let body = compound(r(), vec![ret(r(), forward)]);
        let marker = implicit(marker_with(&["self", "a", "b"], body));
        assert!(forwarding_closure(&marker).is_some());
    }

    #[test]
    fn test_single_argument_construction_is_unwrapped() {
        let forward = call(r(), None, decl_ref(r(), "self"), refs(&["a"]));
        let wrapped = construct(r(), "ttnn::Tensor", vec![materialize(forward)]);
        let body = compound(r(), vec![ret(r(), wrapped)]);
        assert!(forwarding_closure(&marker_with(&["self", "a"], body)).is_some());
    }

    #[test]
    fn test_multi_argument_construction_is_not_a_forwarder() {
        let forward = call(r(), None, decl_ref(r(), "self"), refs(&["a"]));
        let wrapped = construct(r(), "std::pair<Tensor, int>", vec![forward, literal(r(), "int")]);
        let body = compound(r(), vec![ret(r(), wrapped)]);
        assert!(forwarding_closure(&marker_with(&["self", "a"], body)).is_none());
    }

    #[test]
    fn test_argument_count_mismatch_is_rejected() {
        let marker = marker_with(&["self", "a", "b"], return_call("self", &["a"]));
        assert!(forwarding_closure(&marker).is_none());
    }

    #[test]
    fn test_reordered_arguments_are_rejected() {
        let marker = marker_with(&["self", "a", "b"], return_call("self", &["b", "a"]));
        assert!(forwarding_closure(&marker).is_none());
    }

    #[test]
    fn test_transformed_argument_is_rejected() {
        let negated = call(r(), Some("ttnn::neg"), decl_ref(r(), "neg"), refs(&["a"]));
        let body = compound(
            r(),
            vec![ret(r(), call(r(), None, decl_ref(r(), "self"), vec![negated]))],
        );
        assert!(forwarding_closure(&marker_with(&["self", "a"], body)).is_none());
    }

    #[test]
    fn test_closure_without_parameters_beyond_receiver_is_rejected() {
        let marker = marker_with(&["self"], return_call("self", &[]));
        assert!(forwarding_closure(&marker).is_none());
    }

    #[test]
    fn test_typed_parameters_forward_by_name() {
        let tensor = record_type(r(), "const ttnn::Tensor&", "ttnn::Tensor");
        let self_ty = record_type(r(), "const SliceOperation&", "ttnn::SliceOperation");
        let params = vec![
            typed_param("self", r(), self_ty),
            typed_param("input_tensor", r(), tensor),
        ];
        let body = return_call("self", &["input_tensor"]);
        let marker = construct(r(), MARKER, vec![lambda(r(), params, body)]);
        assert!(forwarding_closure(&marker).is_some());
    }
}
