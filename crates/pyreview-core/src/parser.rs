//! Parser seam: turns source text into a [`Module`].

use crate::tree::Module;

/// The source could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct SyntaxError {
    /// Line of the first offending token, if known (1-indexed).
    pub line: Option<usize>,
    /// Parser message.
    pub message: String,
}

impl SyntaxError {
    /// Creates a syntax error.
    #[must_use]
    pub fn new(line: Option<usize>, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Trait for language parsers.
///
/// Implement this to plug a grammar into the review pipelines. Implementations
/// must be stateless across calls so that a single instance can serve
/// concurrent file reviews.
pub trait SourceParser: Send + Sync {
    /// Language identifier (e.g. `"python"`).
    fn language_id(&self) -> &'static str;

    /// File extensions this parser handles, without the dot (e.g. `&["py"]`).
    fn extensions(&self) -> &'static [&'static str];

    /// Parses a whole source file.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError`] if the source is not valid.
    fn parse(&self, source: &str) -> Result<Module, SyntaxError>;
}

/// Type alias for boxed parser trait objects.
pub type ParserBox = Box<dyn SourceParser>;
