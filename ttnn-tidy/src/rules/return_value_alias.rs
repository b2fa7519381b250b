use crate::ast::{Decl, Scope, TypeLoc};
use crate::config::TidyConfig;
use crate::diagnostics::{DiagnosticBuilder, Edit, Finding};
use crate::edits::declaration_line_removal;
use crate::matchers;
use crate::rules::ids::RULE_ID_RETURN_VALUE_ALIAS;
use crate::rules::{Context, Rule, RuleMetadata};
use crate::validators::{is_direct_alias_target, resolves_to_target};

const REMOVE_MESSAGE: &str = "redundant type alias '{0}'; remove from types file";
const USAGE_MESSAGE: &str = "replace '{0}' with '{1}'";

/// Removes `spec_return_value_t` / `tensor_return_value_t` aliases that merely
/// rename `TensorSpec` / `Tensor`, and spells the canonical type at use sites.
pub struct ReturnValueAliasRule {
    config: TidyConfig,
}

impl ReturnValueAliasRule {
    /// Creates the rule with the given settings.
    #[must_use]
    pub fn new(config: TidyConfig) -> Self {
        Self { config }
    }
}

impl Rule for ReturnValueAliasRule {
    fn name(&self) -> &'static str {
        "ReturnValueAliasRule"
    }
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: RULE_ID_RETURN_VALUE_ALIAS,
            category: "readability",
            summary: "return value aliases of Tensor/TensorSpec are redundant",
        }
    }
    fn visit_decl(
        &self,
        decl: &Decl,
        scopes: &[Scope<'_>],
        context: &Context<'_>,
    ) -> Option<Vec<Finding>> {
        let Decl::TypeAlias(alias) = decl else {
            return None;
        };
        let m = matchers::match_alias_declaration(alias, scopes, context.unit, &self.config)?;
        if !is_direct_alias_target(&alias.underlying, &self.config) {
            tracing::debug!(
                alias = alias.name.as_str(),
                underlying = alias.underlying.spelled.as_str(),
                "alias target is not a canonical type, keeping it"
            );
            return None;
        }
        let buffer = context.main_buffer()?;
        let removal = context
            .main_text_range(&alias.range)
            .and_then(|range| declaration_line_removal(buffer, range));
        DiagnosticBuilder::new(RULE_ID_RETURN_VALUE_ALIAS, m.primary_range(), REMOVE_MESSAGE)
            .arg(alias.name.as_str())
            .edit(removal)
            .emit(context)
            .map(|f| vec![f])
    }
    fn visit_type_loc(
        &self,
        type_loc: &TypeLoc,
        _scopes: &[Scope<'_>],
        context: &Context<'_>,
    ) -> Option<Vec<Finding>> {
        let m = matchers::match_alias_usage(type_loc, context.unit, &self.config)?;
        if !resolves_to_target(type_loc, m.target, &self.config) {
            tracing::debug!(
                spelled = type_loc.spelled.as_str(),
                canonical = type_loc.canonical.as_str(),
                "alias use does not resolve to its canonical type, keeping it"
            );
            return None;
        }
        let replace = context
            .main_text_range(&m.primary_range())
            .map(|range| Edit::replace(range, m.target.canonical.as_str()));
        DiagnosticBuilder::new(RULE_ID_RETURN_VALUE_ALIAS, m.primary_range(), USAGE_MESSAGE)
            .arg(type_loc.spelled.as_str())
            .arg(m.target.canonical.as_str())
            .edit(replace)
            .emit(context)
            .map(|f| vec![f])
    }
}
