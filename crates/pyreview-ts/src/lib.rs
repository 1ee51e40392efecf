//! # pyreview-ts
//!
//! Tree-sitter based Python parser for pyreview.
//!
//! [`PythonParser`] implements [`pyreview_core::SourceParser`]: it parses with
//! `tree-sitter-python`, rejects sources the Python 3 parser would reject, and
//! lowers the concrete syntax tree into [`pyreview_core::Module`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod python;

pub use python::{PythonParser, MAX_NESTING};
