use crate::ast::{NodeRef, Scope, TranslationUnit, Walker};
use crate::diagnostics::Finding;
use crate::rules::{Context, Rule, RuleRegistry};

/// Error returned by [`Linter::run_rule`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinterError {
    /// No registered rule has this id.
    #[error("unknown rule id '{0}'")]
    UnknownRule(String),
}

/// Visitor applying a set of rules to every node of one unit.
pub struct LinterVisitor<'r, 'a> {
    rules: Vec<&'r dyn Rule>,
    context: &'r Context<'a>,
    /// List of findings collected during the traversal.
    pub findings: Vec<Finding>,
}

impl<'r, 'a> LinterVisitor<'r, 'a> {
    /// Creates a new `LinterVisitor` with the given rules and context.
    #[must_use]
    pub fn new(rules: Vec<&'r dyn Rule>, context: &'r Context<'a>) -> Self {
        Self {
            rules,
            context,
            findings: Vec::new(),
        }
    }

    /// Offers one node to every rule. Macro-expanded nodes are skipped.
    pub fn visit(&mut self, node: NodeRef<'_>, scopes: &[Scope<'_>]) {
        if node.from_macro() {
            tracing::trace!("skipping macro-expanded node");
            return;
        }
        for rule in &self.rules {
            let found = match node {
                NodeRef::Decl(decl) => rule.visit_decl(decl, scopes, self.context),
                NodeRef::Expr(expr) => rule.visit_expr(expr, scopes, self.context),
                NodeRef::TypeLoc(ty) => rule.visit_type_loc(ty, scopes, self.context),
            };
            if let Some(mut findings) = found {
                self.findings.append(&mut findings);
            }
        }
    }

    /// Walks the whole unit once.
    pub fn visit_unit(&mut self, unit: &TranslationUnit) {
        let mut walker = Walker::new(|node, scopes: &[Scope<'_>]| self.visit(node, scopes));
        walker.walk_unit(unit);
    }
}

/// Runs registered rules over translation units.
///
/// Holds no per-file state; one instance may serve many files in parallel.
#[derive(Debug)]
pub struct Linter {
    registry: RuleRegistry,
}

impl Linter {
    /// Creates a linter over the given registry.
    #[must_use]
    pub fn new(registry: RuleRegistry) -> Self {
        Self { registry }
    }

    /// The rules this linter runs.
    #[must_use]
    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Runs one rule over one unit, returning its findings in traversal order.
    pub fn run_rule(
        &self,
        rule_id: &str,
        unit: &TranslationUnit,
    ) -> Result<Vec<Finding>, LinterError> {
        let rule = self
            .registry
            .get(rule_id)
            .ok_or_else(|| LinterError::UnknownRule(rule_id.to_owned()))?;
        Ok(Self::run(vec![rule], unit))
    }

    /// Runs every registered rule, one after the other, over one unit.
    #[must_use]
    pub fn run_all(&self, unit: &TranslationUnit) -> Vec<Finding> {
        self.registry
            .iter()
            .flat_map(|rule| Self::run(vec![rule], unit))
            .collect()
    }

    fn run(rules: Vec<&dyn Rule>, unit: &TranslationUnit) -> Vec<Finding> {
        let context = Context::new(unit);
        let mut visitor = LinterVisitor::new(rules, &context);
        visitor.visit_unit(unit);
        tracing::debug!(
            file = %context.filename.display(),
            findings = visitor.findings.len(),
            "traversal finished"
        );
        visitor.findings
    }
}
