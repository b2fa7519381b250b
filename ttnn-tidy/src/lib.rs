//! Core library for the `ttnn-tidy` modernization checks.
//!
//! Rules inspect the AST of one C++ translation unit, exported by a compiler
//! front-end as JSON, and report findings carrying text edits against the
//! unit's main file. The library never touches files it did not read; applying
//! edits is left to the driver in [`entry_point`] or to callers using [`fix`].

#![allow(
    clippy::similar_names,
    clippy::map_unwrap_or,
    clippy::items_after_statements
)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

/// Translation unit model, source ranges and the scope-tracking traversal.
pub mod ast;

/// Source text access: offset lookup, lexing and window searches.
pub mod buffer;

/// Module defining the command-line interface arguments and structs.
pub mod cli;

/// Module for loading configuration.
pub mod config;

/// Module containing shared constants.
pub mod constants;

/// Findings, edits and the builder that validates them.
pub mod diagnostics;

/// Text-edit planning shared by the rules.
pub mod edits;

/// Module defining the entry point logic shared by both binaries.
pub mod entry_point;

/// Applying findings to source text.
pub mod fix;

/// Module containing the linter logic and visitor.
pub mod linter;

/// Structural patterns that select candidate nodes.
pub mod matchers;

/// Module for CLI output formatting with colored text and tables.
pub mod output;

/// Module containing the implementation of the rewrite rules.
pub mod rules;

/// Module containing test utilities:
/// Builders for hand-assembled translation units.
pub mod test_utils;

/// Semantic checks a candidate must pass before a rewrite is proposed.
pub mod validators;
