//! # pyreview-rules
//!
//! Built-in checks for pyreview.
//!
//! ## Available Rules
//!
//! | Category | Rule | Severity | Description |
//! |----------|------|----------|-------------|
//! | style | `line_length` | warning | Line longer than `style.max_line_length` |
//! | style | `indentation` | warning | Block statement not at a multiple of `style.indent_size` |
//! | style | `docstring` | info | Module, class or function without a docstring |
//! | style | `quotes` | info | Line uses only the non-preferred quote character |
//! | performance | `complexity` | warning | Function complexity above `performance.max_complexity` |
//! | performance | `locals` | warning | Too many name bindings in a function |
//! | performance | `returns` | warning | Too many `return` statements in a function |
//! | performance | `statements` | warning | Too many statements in a function |
//! | security | `sql_injection` | error | Call to a configured SQL function |
//! | security | `command_injection` | error | Call to a configured shell/eval function |
//! | security | `file_access` | warning | Call to a configured file function |
//!
//! ## Usage
//!
//! ```ignore
//! use pyreview_core::Reviewer;
//! use pyreview_rules::default_categories;
//!
//! let reviewer = Reviewer::builder()
//!     .parser(PythonParser::new())
//!     .categories(default_categories())
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod docstring;
mod function_metrics;
mod indentation;
mod line_length;
mod presets;
mod quotes;
mod risky_calls;

pub use docstring::Docstring;
pub use function_metrics::{FunctionMetrics, Metrics};
pub use indentation::Indentation;
pub use line_length::LineLength;
pub use presets::{
    catalog, default_categories, performance_category, security_category, style_category,
};
pub use quotes::Quotes;
pub use risky_calls::RiskyCalls;

/// Re-export core types for convenience.
pub use pyreview_core::{Check, Issue, IssueType, Severity};
