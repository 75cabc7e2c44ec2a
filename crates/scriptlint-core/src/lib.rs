#![warn(missing_docs)]
//! Scriptlint Core - Diagnostic Engine for a Fast JavaScript Linter
//!
//! # Overview
//!
//! `scriptlint-core` lints JavaScript modules and turns the findings into output for terminals,
//! Vim and embedding hosts. Source text lives in NUL-padded buffers; diagnostics are plain-data
//! payloads holding spans into that buffer, described by a static catalog so that every output
//! format is written once instead of once per diagnostic type.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Document (edit / configure / lint)         │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Reporters & Formatters (text, Vim qflist)  │  ← Output
//! ├─────────────────────────────────────────────┤
//! │  Translator & Packed Translation Table      │  ← Localization
//! ├─────────────────────────────────────────────┤
//! │  Diagnostic Catalog (offset-based args)     │  ← Diagnostic Model
//! ├─────────────────────────────────────────────┤
//! │  Lexer, Parser, Variable Analyzer           │  ← Linting
//! ├─────────────────────────────────────────────┤
//! │  Padded Buffer, Spans, Line Index, Locators │  ← Text Model
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use scriptlint_core::{
//!     GlobalDeclaredVariableSet, MemoryOutputStream, PaddedString, Translator,
//!     VimQflistJsonDiagReporter, VimSource, parse_and_lint,
//! };
//!
//! let input = PaddedString::from("let x = 1;\nx = y;\n");
//! let globals = GlobalDeclaredVariableSet::with_all_groups();
//!
//! let mut reporter = VimQflistJsonDiagReporter::new(Translator::new(), MemoryOutputStream::new());
//! reporter.set_source(input.view(), VimSource { file_name: Some("hello.js"), bufnr: None });
//! parse_and_lint(input.view(), &mut reporter, &globals);
//! reporter.finish().unwrap();
//!
//! let out = reporter.into_inner();
//! assert!(out.get_flushed_string8().starts_with(b"{\"qflist\":[{"));
//! ```
//!
//! # Module Description
//!
//! - [`padded_string`], [`span`] - source buffers and borrowed spans
//! - [`line_index`], [`locator`], [`vim_location`] - offsets to human coordinates
//! - [`diagnostic`], [`diag_types`] - the diagnostic catalog
//! - [`translation`], [`translation_table`] - localized message templates
//! - [`diag_reporter`], [`diagnostic_formatter`], [`text_reporter`], [`vim_qflist`] - output
//! - [`lex`], [`parse`], [`variable_analyzer`], [`linter`] - the linter itself
//! - [`configuration`], [`global_declared_variables`] - which globals exist
//! - [`document`] - interactive linting for editors and the web demo

pub mod configuration;
pub mod diag_reporter;
pub mod diag_types;
pub mod diagnostic;
pub mod diagnostic_formatter;
pub mod document;
pub mod expression;
pub mod global_declared_variables;
pub mod integer;
pub mod language;
pub mod lex;
pub mod line_index;
pub mod linter;
pub mod locator;
pub mod output_stream;
pub mod padded_string;
pub mod parse;
pub mod parse_visitor;
pub mod pipe;
pub mod span;
pub mod text_reporter;
pub mod translation;
pub mod translation_table;
pub mod variable_analyzer;
pub mod vim_location;
pub mod vim_qflist;

pub use configuration::Configuration;
pub use diag_reporter::{DiagList, DiagReporter, FailingDiagReporter, NullDiagReporter};
pub use diag_types::*;
pub use diagnostic::{
    DiagArgValue, DiagnosticArgKind, DiagnosticCode, DiagnosticInfo, DiagnosticMessage,
    DiagnosticMessageArgInfo, DiagnosticSeverity, RawDiag,
};
pub use diagnostic_formatter::DiagnosticFormatter;
pub use document::{Document, DocumentError, LintDiagnostic};
pub use global_declared_variables::{
    GLOBAL_GROUPS, GlobalDeclaredVariableSet, GlobalGroup, GlobalVariableFlags, find_global_group,
};
pub use integer::{
    DecimalInteger, ParseIntegerExactError, integer_string_length, parse_integer_exact,
    parse_integer_exact_utf16, write_integer,
};
pub use language::{EnumKind, StatementKind, VariableKind};
pub use line_index::LineIndex;
pub use linter::parse_and_lint;
pub use locator::{CliLocator, CliSourcePosition, CliSourceRange, ColumnUnit};
pub use output_stream::{FileOutputStream, MemoryOutputStream};
pub use padded_string::{PADDING_SIZE, PaddedString, PaddedStringView};
pub use parse::parse_and_visit_module;
pub use parse_visitor::{BufferingVisitor, ParseVisitor};
pub use pipe::{PipeFds, make_pipe};
pub use span::SourceCodeSpan;
pub use text_reporter::{TextDiagFormatter, TextDiagReporter};
pub use translation::Translator;
pub use translation_table::{TranslatableMessage, translation_table_locale_names};
pub use variable_analyzer::VariableAnalyzer;
pub use vim_location::{VimLocator, VimSourcePosition, VimSourceRange};
pub use vim_qflist::{VimQflistJsonDiagFormatter, VimQflistJsonDiagReporter, VimSource};
