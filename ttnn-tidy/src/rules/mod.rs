use crate::ast::{Decl, Expr, Scope, SourceRange, TranslationUnit, TypeLoc};
use crate::buffer::{SourceBuffer, SourceManager};
use crate::config::{Config, TidyConfig};
use crate::diagnostics::Finding;
use ruff_text_size::{TextRange, TextSize};
use serde::Serialize;
use std::path::PathBuf;

/// Context passed to rules during analysis.
///
/// Owns nothing beyond one translation unit's traversal.
#[derive(Debug)]
pub struct Context<'a> {
    /// The unit being analyzed.
    pub unit: &'a TranslationUnit,
    /// Buffers of every file the unit's ranges point into.
    pub sources: SourceManager<'a>,
    /// Path of the main file, as reported in findings.
    pub filename: PathBuf,
}

impl<'a> Context<'a> {
    /// Creates the context for one unit.
    #[must_use]
    pub fn new(unit: &'a TranslationUnit) -> Self {
        Self {
            unit,
            sources: SourceManager::new(unit),
            filename: unit.main_path().map(PathBuf::from).unwrap_or_default(),
        }
    }

    /// Buffer of the primary analyzed file.
    #[must_use]
    pub fn main_buffer(&self) -> Option<&SourceBuffer<'a>> {
        self.sources.buffer(self.unit.main_file)
    }

    /// Whether `range` starts in the primary analyzed file.
    #[must_use]
    pub fn is_in_main_file(&self, range: &SourceRange) -> bool {
        self.unit.is_in_main_file(range)
    }

    /// Byte range of `range` in the main buffer.
    ///
    /// `None` when the range is invalid or points into another file. Every
    /// edit offset must come through here or [`Context::main_begin`].
    #[must_use]
    pub fn main_text_range(&self, range: &SourceRange) -> Option<TextRange> {
        if range.file != self.unit.main_file {
            return None;
        }
        range.text_range()
    }

    /// Start offset of `range` in the main buffer.
    #[must_use]
    pub fn main_begin(&self, range: &SourceRange) -> Option<TextSize> {
        if range.file != self.unit.main_file {
            return None;
        }
        range.begin()
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
/// Metadata associated with a rule.
pub struct RuleMetadata {
    /// Unique code/ID of the rule.
    pub id: &'static str,
    /// Category of the rule.
    pub category: &'static str,
    /// One-line description for `--list-rules`.
    pub summary: &'static str,
}

/// Trait defining a rewrite rule.
///
/// Rules are stateless: every hook is a pure function of the visited node, its
/// enclosing scopes and the unit's context.
pub trait Rule: Send + Sync {
    /// Returns the descriptive name of the rule.
    fn name(&self) -> &'static str;
    /// Returns the unique code/ID of the rule.
    fn code(&self) -> &'static str {
        self.metadata().id
    }
    /// Returns the category/functional group of the rule.
    fn category(&self) -> &'static str {
        self.metadata().category
    }
    /// Returns the full metadata for the rule.
    fn metadata(&self) -> RuleMetadata;
    /// Called for every declaration.
    fn visit_decl(
        &self,
        _decl: &Decl,
        _scopes: &[Scope<'_>],
        _context: &Context<'_>,
    ) -> Option<Vec<Finding>> {
        None
    }
    /// Called for every expression.
    fn visit_expr(
        &self,
        _expr: &Expr,
        _scopes: &[Scope<'_>],
        _context: &Context<'_>,
    ) -> Option<Vec<Finding>> {
        None
    }
    /// Called for every written type.
    fn visit_type_loc(
        &self,
        _type_loc: &TypeLoc,
        _scopes: &[Scope<'_>],
        _context: &Context<'_>,
    ) -> Option<Vec<Finding>> {
        None
    }
}

/// Ordered rule identifier to rule mapping, built once by the driver.
pub struct RuleRegistry {
    rules: Vec<Box<dyn Rule>>,
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|r| r.code()))
            .finish()
    }
}

impl RuleRegistry {
    /// Every built-in rule with the given settings, in registration order.
    #[must_use]
    pub fn builtin(config: &TidyConfig) -> Self {
        Self {
            rules: vec![
                Box::new(nanobind_overload::NanobindOverloadRule::new(config.clone())),
                Box::new(operation_type_naming::OperationTypeNamingRule::new(
                    config.clone(),
                )),
                Box::new(return_value_alias::ReturnValueAliasRule::new(config.clone())),
            ],
        }
    }

    /// Built-in rules minus those listed in `ignore`.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let mut registry = Self::builtin(&config.tidy);
        registry
            .rules
            .retain(|rule| !config.tidy.ignore.iter().any(|id| id == rule.code()));
        registry
    }

    /// Keeps only the rules whose id is in `ids`.
    #[must_use]
    pub fn select(mut self, ids: &[String]) -> Self {
        self.rules.retain(|rule| ids.iter().any(|id| id == rule.code()));
        self
    }

    /// Looks up a rule by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&dyn Rule> {
        self.rules.iter().find(|r| r.code() == id).map(AsRef::as_ref)
    }

    /// Registered rules in order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(AsRef::as_ref)
    }

    /// Registered rule ids in order.
    #[must_use]
    pub fn ids(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.code()).collect()
    }

    /// Number of registered rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rule is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Module containing rule ID constants.
pub mod ids;
/// `nanobind_overload_t` call-site simplification.
pub mod nanobind_overload;
/// Operation-specific names for generic parameter structs.
pub mod operation_type_naming;
/// Redundant return-value type aliases.
pub mod return_value_alias;
