//! Text-edit generation.
//!
//! Every function here derives one [`Edit`] from byte offsets in the unmodified
//! buffer. A `None` result means some boundary could not be located; callers
//! drop that edit and keep going.

use crate::buffer::{SourceBuffer, TokenKind};
use crate::diagnostics::Edit;
use ruff_text_size::{TextRange, TextSize};

/// Converts `lower_snake_case` into `PascalCase`.
///
/// `slice` becomes `Slice`, `batch_norm` becomes `BatchNorm`, `conv2d` becomes `Conv2d`.
#[must_use]
pub fn to_pascal_case(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut capitalize_next = true;
    for c in name.chars() {
        if c == '_' {
            capitalize_next = true;
        } else if capitalize_next {
            result.push(c.to_ascii_uppercase());
            capitalize_next = false;
        } else {
            result.push(c);
        }
    }
    result
}

/// `Pascal(operation)` followed by the role word, e.g. `SliceParams`.
#[must_use]
pub fn suggested_name(operation: &str, role: &str) -> String {
    let mut name = to_pascal_case(operation);
    name.push_str(role);
    name
}

/// Marker type name located inside an argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerSpelling {
    /// Written range, qualifier included when present.
    pub range: TextRange,
    /// Whether the qualifier was written in front of the marker.
    pub qualified: bool,
}

/// Finds `marker` within `window` bytes of `from`, widening the range over a
/// directly preceding `qualifier` (e.g. `ttnn::`).
#[must_use]
pub fn locate_marker(
    buffer: &SourceBuffer<'_>,
    from: TextSize,
    marker: &str,
    qualifier: &str,
    window: usize,
) -> Option<MarkerSpelling> {
    let at = buffer.find_in_window(from, marker, window)?;
    let end = at + TextSize::of(marker);
    let qualifier_len = TextSize::of(qualifier);
    let qualified = !qualifier.is_empty()
        && at >= qualifier_len
        && buffer.slice(TextRange::new(at - qualifier_len, at)) == Some(qualifier);
    let start = if qualified { at - qualifier_len } else { at };
    Some(MarkerSpelling {
        range: TextRange::new(start, end),
        qualified,
    })
}

/// Replaces the marker type spelled in the argument starting at `from`.
///
/// The replacement keeps the qualifier iff it was written.
#[must_use]
pub fn marker_replacement(
    buffer: &SourceBuffer<'_>,
    from: TextSize,
    marker: &str,
    qualifier: &str,
    replacement: &str,
    window: usize,
) -> Option<Edit> {
    let spelling = locate_marker(buffer, from, marker, qualifier, window)?;
    let text = if spelling.qualified {
        format!("{qualifier}{replacement}")
    } else {
        replacement.to_owned()
    };
    Some(Edit::replace(spelling.range, text))
}

/// Removes a closure argument together with the separator that follows it.
///
/// With a next sibling the removal runs up to that sibling's start, so the
/// sibling keeps its own indentation. Without one, the removal ends after the
/// following comma plus one space, or plus the newline if one follows. If no
/// comma follows either, only the closure itself is removed.
#[must_use]
pub fn closure_removal(
    buffer: &SourceBuffer<'_>,
    closure: TextRange,
    next_sibling: Option<TextSize>,
) -> Option<Edit> {
    let end = match next_sibling {
        Some(next) if next > closure.end() => next,
        _ => match buffer.expect_token(closure.end(), TokenKind::Comma) {
            Some(after_comma) => match buffer.byte_at(after_comma) {
                Some(b'\n' | b' ') => after_comma + TextSize::new(1),
                Some(b'\r') if buffer.byte_at(after_comma + TextSize::new(1)) == Some(b'\n') => {
                    after_comma + TextSize::new(2)
                }
                _ => after_comma,
            },
            None => closure.end(),
        },
    };
    let range = TextRange::new(closure.start(), end);
    if range.is_empty() || buffer.slice(range).is_none() {
        return None;
    }
    Some(Edit::remove(range))
}

/// Range removing a declaration spanning `[start, terminator_end)`.
///
/// The whole line, newline included, is taken only when nothing but
/// whitespace surrounds the declaration on its line. Otherwise just the
/// declaration and its terminator go, leaving neighbouring code intact.
#[must_use]
pub fn line_removal_range(
    buffer: &SourceBuffer<'_>,
    start: TextSize,
    terminator_end: TextSize,
) -> Option<TextRange> {
    if start > terminator_end || terminator_end > buffer.len() {
        return None;
    }
    let line_start = buffer.lines().line_start(start);
    let (rest_end, line_end) = match buffer.next_newline(terminator_end) {
        Some(newline) => (newline, newline + TextSize::new(1)),
        None => (buffer.len(), buffer.len()),
    };
    let own_line = buffer.only_whitespace_between(line_start, start)
        && buffer.only_whitespace_between(terminator_end, rest_end);
    if own_line {
        Some(TextRange::new(line_start, line_end))
    } else {
        Some(TextRange::new(start, terminator_end))
    }
}

/// Removes a declaration whose range stops before its `;`.
///
/// When no terminator can be found the declaration's own range is used.
#[must_use]
pub fn declaration_line_removal(buffer: &SourceBuffer<'_>, decl: TextRange) -> Option<Edit> {
    let terminator_end = buffer
        .expect_token(decl.end(), TokenKind::Semi)
        .unwrap_or(decl.end());
    line_removal_range(buffer, decl.start(), terminator_end).map(Edit::remove)
}

/// Removes the line of the last `phrase` occurrence within `window` bytes
/// before `before`.
///
/// This is a plain text search: a declaration further away is missed, and the
/// phrase inside a comment is matched as well.
#[must_use]
pub fn companion_removal(
    buffer: &SourceBuffer<'_>,
    before: TextSize,
    phrase: &str,
    window: usize,
) -> Option<Edit> {
    let at = buffer.rfind_in_window(before, phrase, window)?;
    let rest = buffer.slice(TextRange::new(at, before))?;
    let terminator_end = match rest.find(';') {
        Some(pos) => at + TextSize::try_from(pos + 1).ok()?,
        None => buffer.next_newline(at).unwrap_or(before),
    };
    line_removal_range(buffer, at, terminator_end).map(Edit::remove)
}
