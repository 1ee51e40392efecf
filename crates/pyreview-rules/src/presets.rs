//! The built-in categories.

use crate::{Docstring, FunctionMetrics, Indentation, LineLength, Quotes, RiskyCalls};
use pyreview_core::{Category, IssueType, RuleInfo};

/// Returns the style category.
///
/// Includes:
/// - `line_length` - Lines longer than `style.max_line_length`
/// - `indentation` - Block openers off the `style.indent_size` grid
/// - `docstring` - Missing module, function and class docstrings
/// - `quotes` - Strings not using `style.quote_preference`
#[must_use]
pub fn style_category() -> Category {
    Category::new(IssueType::Style)
        .check(LineLength::new())
        .check(Indentation::new())
        .check(Docstring::new())
        .check(Quotes::new())
}

/// Returns the performance category.
///
/// Includes `complexity`, `locals`, `returns` and `statements`.
#[must_use]
pub fn performance_category() -> Category {
    Category::new(IssueType::Performance).check(FunctionMetrics::new())
}

/// Returns the security category.
///
/// Includes `sql_injection`, `command_injection` and `file_access`.
#[must_use]
pub fn security_category() -> Category {
    Category::new(IssueType::Security).check(RiskyCalls::new())
}

/// Returns every category in run order: style, performance, security.
#[must_use]
pub fn default_categories() -> Vec<Category> {
    vec![style_category(), performance_category(), security_category()]
}

/// Lists every built-in rule with its category.
#[must_use]
pub fn catalog() -> Vec<(IssueType, RuleInfo)> {
    default_categories()
        .iter()
        .flat_map(|category| {
            let kind = category.kind();
            category
                .checks()
                .iter()
                .flat_map(|check| check.rules().iter().copied())
                .map(move |info| (kind, info))
                .collect::<Vec<_>>()
        })
        .collect()
}
