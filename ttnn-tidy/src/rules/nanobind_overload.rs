use crate::ast::{Expr, Scope};
use crate::config::TidyConfig;
use crate::diagnostics::{DiagnosticBuilder, Finding};
use crate::edits;
use crate::matchers::{self, CallSiteMatch};
use crate::rules::ids::RULE_ID_NANOBIND_OVERLOAD;
use crate::rules::{Context, Rule, RuleMetadata};
use crate::validators;

const MESSAGE: &str = "unnecessary use of {0} with a single overload; use {1} instead";

/// Flags `bind_registered_operation` calls registering a single
/// `nanobind_overload_t` and rewrites them to `nanobind_arguments_t`.
///
/// When the overload's closure only forwards to the operation, the closure
/// is removed as well, together with the `using OperationType = ...;` line
/// that existed for it.
pub struct NanobindOverloadRule {
    config: TidyConfig,
}

impl NanobindOverloadRule {
    /// Creates the rule with the given settings.
    #[must_use]
    pub fn new(config: TidyConfig) -> Self {
        Self { config }
    }

    fn check(&self, m: &CallSiteMatch<'_>, context: &Context<'_>) -> Option<Finding> {
        let buffer = context.main_buffer()?;
        let cfg = &self.config;

        let mut diag = DiagnosticBuilder::new(RULE_ID_NANOBIND_OVERLOAD, m.primary_range(), MESSAGE)
            .arg(cfg.marker_type.as_str())
            .arg(cfg.replacement_type.as_str())
            .edit(context.main_begin(&m.marker.range()).and_then(|from| {
                edits::marker_replacement(
                    buffer,
                    from,
                    &cfg.marker_type,
                    &cfg.marker_qualifier,
                    &cfg.replacement_type,
                    cfg.marker_window,
                )
            }));

        match validators::forwarding_closure(m.marker) {
            Some(closure) if closure.construct.args.len() >= 2 => {
                let next = closure
                    .construct
                    .args
                    .get(1)
                    .and_then(|a| context.main_begin(&a.range()));
                let removal = context
                    .main_text_range(&closure.lambda.range)
                    .and_then(|range| edits::closure_removal(buffer, range, next));
                if removal.is_some() {
                    let companion = context.main_begin(&m.call.range).and_then(|before| {
                        edits::companion_removal(
                            buffer,
                            before,
                            &cfg.companion_phrase,
                            cfg.companion_window,
                        )
                    });
                    if let Some(companion) = companion {
                        diag = diag.edits([companion]);
                    }
                }
                diag = diag.edit(removal);
            }
            Some(_) => {}
            None => {
                tracing::debug!(range = ?m.call.range, "closure is not a pure forwarder, keeping it");
            }
        }

        diag.emit(context)
    }
}

impl Rule for NanobindOverloadRule {
    fn name(&self) -> &'static str {
        "NanobindOverloadRule"
    }
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: RULE_ID_NANOBIND_OVERLOAD,
            category: "modernize",
            summary: "single-overload nanobind_overload_t should be nanobind_arguments_t",
        }
    }
    fn visit_expr(
        &self,
        expr: &Expr,
        _scopes: &[Scope<'_>],
        context: &Context<'_>,
    ) -> Option<Vec<Finding>> {
        let Expr::Call(call) = expr else {
            return None;
        };
        let m = matchers::match_call_site(call, context.unit, &self.config)?;
        self.check(&m, context).map(|f| vec![f])
    }
}
