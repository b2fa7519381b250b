use crate::ast::{Decl, Scope, TypeLoc};
use crate::config::TidyConfig;
use crate::diagnostics::{DiagnosticBuilder, Edit, Finding};
use crate::edits::suggested_name;
use crate::matchers::{self, StructDefMatch};
use crate::rules::ids::RULE_ID_OPERATION_TYPE_NAMING;
use crate::rules::{Context, Rule, RuleMetadata};
use crate::validators::derive_operation_name;

const RENAME_MESSAGE: &str = "generic type name '{0}' should be renamed to '{1}'";
const USAGE_MESSAGE: &str = "replace '{0}' with '{1}'";

/// Renames `operation_attributes_t` / `tensor_args_t` in operation types files
/// to `<Operation>Params` / `<Operation>Inputs`, and updates qualified uses
/// elsewhere.
pub struct OperationTypeNamingRule {
    config: TidyConfig,
    undetermined_message: String,
}

impl OperationTypeNamingRule {
    /// Creates the rule with the given settings.
    #[must_use]
    pub fn new(config: TidyConfig) -> Self {
        let examples: Vec<String> = config
            .structs
            .iter()
            .map(|s| format!("'{{Operation}}{}'", s.suffix))
            .collect();
        let undetermined_message = format!(
            "generic type name '{{0}}' should be renamed to an operation-specific name (e.g., {})",
            examples.join(" or ")
        );
        Self {
            config,
            undetermined_message,
        }
    }

    fn check_definition(&self, m: &StructDefMatch<'_>, context: &Context<'_>) -> Option<Finding> {
        let name = m.record.name.as_str();
        let Some(operation) = derive_operation_name(&m.context, &self.config.scope_denylist)
        else {
            tracing::debug!(name, "no operation scope encloses the struct");
            return DiagnosticBuilder::new(
                RULE_ID_OPERATION_TYPE_NAMING,
                m.primary_range(),
                self.undetermined_message.as_str(),
            )
            .arg(name)
            .emit(context);
        };

        let suggested = suggested_name(operation, &m.naming.suffix);
        let rename = context
            .main_text_range(&m.primary_range())
            .map(|range| Edit::replace(range, suggested.as_str()));
        DiagnosticBuilder::new(RULE_ID_OPERATION_TYPE_NAMING, m.primary_range(), RENAME_MESSAGE)
            .arg(name)
            .arg(suggested.as_str())
            .edit(rename)
            .emit(context)
    }
}

impl Rule for OperationTypeNamingRule {
    fn name(&self) -> &'static str {
        "OperationTypeNamingRule"
    }
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: RULE_ID_OPERATION_TYPE_NAMING,
            category: "naming",
            summary: "operation parameter structs need operation-specific names",
        }
    }
    fn visit_decl(
        &self,
        decl: &Decl,
        scopes: &[Scope<'_>],
        context: &Context<'_>,
    ) -> Option<Vec<Finding>> {
        let Decl::Record(record) = decl else {
            return None;
        };
        let m = matchers::match_struct_definition(record, scopes, context.unit, &self.config)?;
        self.check_definition(&m, context).map(|f| vec![f])
    }
    fn visit_type_loc(
        &self,
        type_loc: &TypeLoc,
        _scopes: &[Scope<'_>],
        context: &Context<'_>,
    ) -> Option<Vec<Finding>> {
        let m = matchers::match_struct_usage(type_loc, context.unit, &self.config)?;
        let suggested = suggested_name(&m.operation, &m.naming.suffix);
        let replace = context
            .main_text_range(&m.primary_range())
            .map(|range| Edit::replace(range, suggested.as_str()));
        DiagnosticBuilder::new(RULE_ID_OPERATION_TYPE_NAMING, m.primary_range(), USAGE_MESSAGE)
            .arg(type_loc.spelled.as_str())
            .arg(suggested)
            .edit(replace)
            .emit(context)
            .map(|f| vec![f])
    }
}
