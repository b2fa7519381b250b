//! Diagnostic and patch emitter.
//!
//! A [`Finding`] is a located problem plus the edits that fix it. Edits are
//! descriptions against the unmodified buffer; nothing here touches a file.

use crate::ast::SourceRange;
use crate::rules::Context;
use ruff_text_size::{TextRange, TextSize};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use smallvec::SmallVec;
use std::fmt;
use std::path::PathBuf;

/// One textual change, expressed against the original buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// Replace `range` with `text`.
    Replace {
        /// Bytes to replace.
        range: TextRange,
        /// New text.
        text: String,
    },
    /// Delete `range`.
    Remove {
        /// Bytes to delete.
        range: TextRange,
    },
}

impl Edit {
    /// Creates a replacement.
    #[must_use]
    pub fn replace(range: TextRange, text: impl Into<String>) -> Self {
        Self::Replace {
            range,
            text: text.into(),
        }
    }

    /// Creates a removal.
    #[must_use]
    pub fn remove(range: TextRange) -> Self {
        Self::Remove { range }
    }

    /// Affected byte range.
    #[must_use]
    pub fn range(&self) -> TextRange {
        match self {
            Self::Replace { range, .. } | Self::Remove { range } => *range,
        }
    }

    /// Text inserted in place of the range (empty for removals).
    #[must_use]
    pub fn replacement(&self) -> &str {
        match self {
            Self::Replace { text, .. } => text,
            Self::Remove { .. } => "",
        }
    }

    /// `"replace"` or `"remove"`.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Replace { .. } => "replace",
            Self::Remove { .. } => "remove",
        }
    }

    /// Check if this edit overlaps with another.
    ///
    /// Two insertions at the same point, or an insertion inside a replaced range,
    /// also count as overlapping.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        let (a, b) = (self.range(), other.range());
        if a.is_empty() || b.is_empty() {
            return a.start() == b.start()
                || (a.start() > b.start() && a.start() < b.end())
                || (b.start() > a.start() && b.start() < a.end());
        }
        a.start() < b.end() && b.start() < a.end()
    }
}

impl Serialize for Edit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let range = self.range();
        let mut state = serializer.serialize_struct("Edit", 4)?;
        state.serialize_field("kind", self.kind())?;
        state.serialize_field("start", &u32::from(range.start()))?;
        state.serialize_field("end", &u32::from(range.end()))?;
        state.serialize_field("text", self.replacement())?;
        state.end()
    }
}

/// Severity of a finding. Every diagnostic of this engine is advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Advisory problem.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => f.write_str("warning"),
        }
    }
}

fn serialize_range<S: Serializer>(range: &TextRange, serializer: S) -> Result<S::Ok, S::Error> {
    let mut state = serializer.serialize_struct("Range", 2)?;
    state.serialize_field("start", &u32::from(range.start()))?;
    state.serialize_field("end", &u32::from(range.end()))?;
    state.end()
}

#[derive(Debug, Clone, Serialize)]
/// A single problem found by a rule.
pub struct Finding {
    /// ID of the rule that triggered the finding.
    pub rule_id: String,
    /// Severity level.
    pub severity: Severity,
    /// Message with template arguments substituted.
    pub message: String,
    /// Template arguments, in placeholder order.
    pub args: Vec<String>,
    /// File where the issue was found.
    pub file: PathBuf,
    /// Byte range the finding points at.
    #[serde(serialize_with = "serialize_range")]
    pub range: TextRange,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed, bytes).
    pub col: usize,
    /// Non-overlapping edits sorted by start offset.
    pub edits: SmallVec<[Edit; 3]>,
}

impl Finding {
    /// Whether the finding offers an automatic fix.
    #[must_use]
    pub fn has_fix(&self) -> bool {
        !self.edits.is_empty()
    }
}

/// Substitutes `{0}`, `{1}`, ... in `template`. Other braces are left alone.
#[must_use]
pub fn render_message(template: &str, args: &[String]) -> String {
    let mut message = template.to_owned();
    for (i, arg) in args.iter().enumerate() {
        message = message.replace(&format!("{{{i}}}"), arg);
    }
    message
}

/// Collects the pieces of one finding before it is validated and emitted.
#[derive(Debug)]
#[must_use]
pub struct DiagnosticBuilder {
    rule_id: &'static str,
    location: SourceRange,
    template: String,
    args: Vec<String>,
    edits: SmallVec<[Edit; 3]>,
}

impl DiagnosticBuilder {
    /// Starts a diagnostic at `location`.
    pub fn new(rule_id: &'static str, location: SourceRange, template: impl Into<String>) -> Self {
        Self {
            rule_id,
            location,
            template: template.into(),
            args: Vec::new(),
            edits: SmallVec::new(),
        }
    }

    /// Appends the next template argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Adds an edit. `None` stands for an edit whose location could not be derived.
    pub fn edit(mut self, edit: Option<Edit>) -> Self {
        match edit {
            Some(edit) => self.edits.push(edit),
            None => tracing::debug!(rule = self.rule_id, "dropping edit with unusable location"),
        }
        self
    }

    /// Adds several edits at once.
    pub fn edits(mut self, edits: impl IntoIterator<Item = Edit>) -> Self {
        self.edits.extend(edits);
        self
    }

    /// Validates the location and edits and produces the finding.
    ///
    /// Returns `None` when the primary location is unusable. Edits outside the
    /// main buffer, or overlapping an earlier edit, are dropped.
    pub fn emit(self, ctx: &Context<'_>) -> Option<Finding> {
        let Some(buffer) = ctx.main_buffer() else {
            tracing::debug!(rule = self.rule_id, "main buffer missing");
            return None;
        };
        let range = match self.location.text_range() {
            Some(range) if self.location.file == ctx.unit.main_file && range.end() <= buffer.len() => {
                range
            }
            _ => {
                tracing::debug!(rule = self.rule_id, location = ?self.location, "invalid primary location");
                return None;
            }
        };

        let mut edits = self.edits;
        edits.retain(|e| e.range().end() <= buffer.len() && buffer.slice(e.range()).is_some());
        edits.sort_by_key(|e| (e.range().start(), e.range().end()));
        let mut accepted: SmallVec<[Edit; 3]> = SmallVec::new();
        for edit in edits {
            if accepted.iter().any(|prev| prev.overlaps(&edit)) {
                tracing::debug!(rule = self.rule_id, range = ?edit.range(), "dropping overlapping edit");
                continue;
            }
            accepted.push(edit);
        }

        let start: TextSize = range.start();
        Some(Finding {
            rule_id: self.rule_id.to_owned(),
            severity: Severity::Warning,
            message: render_message(&self.template, &self.args),
            args: self.args,
            file: ctx.filename.clone(),
            range,
            line: buffer.lines().line_index(start),
            col: buffer.lines().column_index(start),
            edits: accepted,
        })
    }
}
