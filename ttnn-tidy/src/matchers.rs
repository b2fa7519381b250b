//! Pattern matchers.
//!
//! Each matcher is a pure predicate plus extractor over one node kind. A
//! `None` result is the normal "no match" outcome, never an error.

use crate::ast::{
    CallExpr, Expr, NamingContext, RecordDecl, Scope, ScopeKind, SourceRange, TranslationUnit,
    TypeAliasDecl, TypeLoc, TypeLocKind,
};
use crate::config::{AliasTarget, StructNaming, TidyConfig};
use crate::constants::TYPE_KEYWORDS;

/// Strips leading keywords (`const`, `struct`, `class`, ...) and a leading
/// global `::` from a type spelling.
#[must_use]
pub fn strip_type_keywords(spelling: &str) -> &str {
    let mut rest = spelling.trim();
    loop {
        let before = rest;
        for keyword in TYPE_KEYWORDS {
            if let Some(stripped) = rest.strip_prefix(keyword) {
                rest = stripped.trim_start();
            }
        }
        if let Some(stripped) = rest.strip_prefix("::") {
            rest = stripped;
        }
        if rest == before {
            return rest;
        }
    }
}

/// Whether `spelling` contains `::name` as a whole trailing component.
#[must_use]
pub fn contains_qualified(spelling: &str, name: &str) -> bool {
    let needle = format!("::{name}");
    spelling.match_indices(&needle).any(|(at, _)| {
        spelling[at + needle.len()..]
            .chars()
            .next()
            .is_none_or(|c| !(c.is_alphanumeric() || c == '_'))
    })
}

fn has_record_alias_marker(spelling: &str, config: &TidyConfig) -> bool {
    config
        .record_alias_markers
        .iter()
        .any(|marker| spelling.contains(marker.as_str()))
}

fn in_types_file(unit: &TranslationUnit, range: &SourceRange, config: &TidyConfig) -> bool {
    unit.file_name(range.file)
        .is_some_and(|name| config.is_types_file(name))
}

/// A call to the host function with exactly one marker-typed overload argument.
#[derive(Debug, Clone, Copy)]
pub struct CallSiteMatch<'a> {
    /// The host function call.
    pub call: &'a CallExpr,
    /// Position of the marker argument in `call.args`.
    pub marker_index: usize,
    /// The marker argument with implicit wrappers stripped.
    pub marker: &'a Expr,
}

impl CallSiteMatch<'_> {
    /// Where the finding is reported.
    #[must_use]
    pub fn primary_range(&self) -> SourceRange {
        self.call.range
    }
}

/// Matches `host_function(prefix..., overloads...)` where exactly one
/// overload argument has the marker type.
///
/// Zero or several marker arguments are ambiguous and yield no match.
#[must_use]
pub fn match_call_site<'a>(
    call: &'a CallExpr,
    unit: &TranslationUnit,
    config: &TidyConfig,
) -> Option<CallSiteMatch<'a>> {
    if !unit.is_in_main_file(&call.range) {
        return None;
    }
    let name = call.callee.qualified_name.as_deref()?;
    if name.trim_start_matches("::") != config.host_function.trim_start_matches("::") {
        return None;
    }

    let mut markers = call
        .args
        .iter()
        .enumerate()
        .skip(config.prefix_args)
        .map(|(i, arg)| (i, arg.ignore_implicit()))
        .filter(|(_, arg)| arg.ty().contains(config.marker_type.as_str()));

    let (marker_index, marker) = markers.next()?;
    let extra = markers.count();
    if extra > 0 {
        tracing::debug!(
            range = ?call.range,
            markers = extra + 1,
            "several marker arguments, leaving call alone"
        );
        return None;
    }
    Some(CallSiteMatch {
        call,
        marker_index,
        marker,
    })
}

/// A reserved generic struct defined in a types file.
#[derive(Debug, Clone)]
pub struct StructDefMatch<'a> {
    /// The struct definition.
    pub record: &'a RecordDecl,
    /// Naming rule for the reserved name it carries.
    pub naming: &'a StructNaming,
    /// Enclosing namespaces, innermost first.
    pub context: NamingContext,
}

impl StructDefMatch<'_> {
    /// Where the finding is reported.
    #[must_use]
    pub fn primary_range(&self) -> SourceRange {
        self.record.name_range
    }
}

/// Matches definitions of `operation_attributes_t`-style structs in types files.
#[must_use]
pub fn match_struct_definition<'a>(
    record: &'a RecordDecl,
    scopes: &[Scope<'_>],
    unit: &TranslationUnit,
    config: &'a TidyConfig,
) -> Option<StructDefMatch<'a>> {
    if !record.is_definition || !unit.is_in_main_file(&record.name_range) {
        return None;
    }
    let naming = config.structs.iter().find(|s| s.name == record.name)?;
    if !in_types_file(unit, &record.name_range, config) {
        return None;
    }
    Some(StructDefMatch {
        record,
        naming,
        context: NamingContext::from_scopes(scopes),
    })
}

/// A written reference to a reserved generic struct outside types files.
#[derive(Debug, Clone)]
pub struct StructUsageMatch<'a> {
    /// The written reference.
    pub type_loc: &'a TypeLoc,
    /// Naming rule for the referenced struct.
    pub naming: &'a StructNaming,
    /// Scope name directly qualifying the struct in its canonical spelling.
    pub operation: String,
}

impl StructUsageMatch<'_> {
    /// Where the finding is reported.
    #[must_use]
    pub fn primary_range(&self) -> SourceRange {
        self.type_loc.range
    }
}

/// Scope name directly in front of `::name` at the end of `canonical`.
///
/// `struct ttnn::operations::data_movement::slice::tensor_args_t` yields `slice`.
#[must_use]
pub fn qualifying_scope<'s>(canonical: &'s str, name: &str) -> Option<&'s str> {
    let prefix = canonical.strip_suffix(name)?.strip_suffix("::")?;
    let scope = prefix
        .rsplit(|c: char| c == ':' || c.is_whitespace())
        .next()?;
    (!scope.is_empty()).then_some(scope)
}

/// Matches record type locations whose canonical spelling ends in
/// `::<reserved struct name>`, outside types files.
///
/// Member aliases of the device operation (`SliceDeviceOperation::tensor_args_t`)
/// are skipped: they name the struct being renamed, not a use of it.
#[must_use]
pub fn match_struct_usage<'a>(
    type_loc: &'a TypeLoc,
    unit: &TranslationUnit,
    config: &'a TidyConfig,
) -> Option<StructUsageMatch<'a>> {
    if !matches!(type_loc.kind, TypeLocKind::Record) || !unit.is_in_main_file(&type_loc.range) {
        return None;
    }
    if in_types_file(unit, &type_loc.range, config) {
        return None;
    }
    let canonical = strip_type_keywords(&type_loc.canonical);
    if has_record_alias_marker(canonical, config) {
        return None;
    }
    let naming = config
        .structs
        .iter()
        .find(|s| canonical.ends_with(&format!("::{}", s.name)))?;
    let operation = qualifying_scope(canonical, &naming.name)?;
    Some(StructUsageMatch {
        type_loc,
        naming,
        operation: operation.to_owned(),
    })
}

/// A namespace-scope reserved alias declared in a types file.
#[derive(Debug, Clone, Copy)]
pub struct AliasDeclMatch<'a> {
    /// The alias declaration.
    pub alias: &'a TypeAliasDecl,
    /// Reserved alias entry it matched.
    pub target: &'a AliasTarget,
}

impl AliasDeclMatch<'_> {
    /// Where the finding is reported.
    #[must_use]
    pub fn primary_range(&self) -> SourceRange {
        self.alias.name_range
    }
}

/// Matches `using spec_return_value_t = ...;` at namespace scope in a types file.
///
/// Aliases declared inside a record are left alone.
#[must_use]
pub fn match_alias_declaration<'a>(
    alias: &'a TypeAliasDecl,
    scopes: &[Scope<'_>],
    unit: &TranslationUnit,
    config: &'a TidyConfig,
) -> Option<AliasDeclMatch<'a>> {
    if !unit.is_in_main_file(&alias.name_range) {
        return None;
    }
    let target = config.aliases.iter().find(|a| a.name == alias.name)?;
    if scopes.last().is_some_and(|s| s.kind != ScopeKind::Namespace) {
        return None;
    }
    if !in_types_file(unit, &alias.name_range, config) {
        return None;
    }
    Some(AliasDeclMatch { alias, target })
}

/// A written reference to a reserved alias outside types files.
#[derive(Debug, Clone, Copy)]
pub struct AliasUsageMatch<'a> {
    /// The written reference.
    pub type_loc: &'a TypeLoc,
    /// Reserved alias entry it names.
    pub target: &'a AliasTarget,
}

impl AliasUsageMatch<'_> {
    /// Where the finding is reported.
    #[must_use]
    pub fn primary_range(&self) -> SourceRange {
        self.type_loc.range
    }
}

/// Matches alias type locations spelled `<scope>::<reserved alias>`.
///
/// References through a record (`SliceDeviceOperation::spec_return_value_t`)
/// name the record's member alias and are skipped, as are references inside
/// types files, which the declaration removal already covers.
#[must_use]
pub fn match_alias_usage<'a>(
    type_loc: &'a TypeLoc,
    unit: &TranslationUnit,
    config: &'a TidyConfig,
) -> Option<AliasUsageMatch<'a>> {
    if !matches!(type_loc.kind, TypeLocKind::Typedef) || !unit.is_in_main_file(&type_loc.range) {
        return None;
    }
    let spelled = type_loc.spelled.as_str();
    if has_record_alias_marker(spelled, config) {
        return None;
    }
    let target = config
        .aliases
        .iter()
        .find(|a| contains_qualified(spelled, &a.name))?;
    if in_types_file(unit, &type_loc.range, config) {
        return None;
    }
    Some(AliasUsageMatch { type_loc, target })
}
