//! Applying findings to source text.
//!
//! The engine only describes edits; drivers that own file I/O use
//! [`apply_findings`] (or `ByteRangeRewriter` directly) to turn a file's
//! findings into the rewritten text.

mod rewriter;

pub use rewriter::{ByteRangeRewriter, RewriteError};

use crate::diagnostics::{Edit, Finding};

/// Rewritten text plus bookkeeping about which findings made it in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixOutcome {
    /// The rewritten source.
    pub source: String,
    /// Number of edits applied.
    pub applied: usize,
    /// Findings left out because one of their edits overlapped an earlier finding.
    pub skipped: usize,
}

/// Applies the edits of `findings` to `source`.
///
/// A finding's edits are applied together or not at all. Findings are taken in
/// order; one whose edits overlap an already accepted finding is skipped.
///
/// # Errors
/// Returns an error if an edit lies outside `source`.
pub fn apply_findings(source: &str, findings: &[Finding]) -> Result<FixOutcome, RewriteError> {
    let mut accepted: Vec<Edit> = Vec::new();
    let mut skipped = 0;
    for finding in findings.iter().filter(|f| f.has_fix()) {
        let clashes = finding
            .edits
            .iter()
            .any(|edit| accepted.iter().any(|prev| prev.overlaps(edit)));
        if clashes {
            tracing::debug!(rule = finding.rule_id.as_str(), line = finding.line, "skipping overlapping fix");
            skipped += 1;
            continue;
        }
        accepted.extend(finding.edits.iter().cloned());
    }

    let mut rewriter = ByteRangeRewriter::new(source);
    rewriter.add_edits(accepted);
    let applied = rewriter.edit_count();
    Ok(FixOutcome {
        source: rewriter.apply()?,
        applied,
        skipped,
    })
}
