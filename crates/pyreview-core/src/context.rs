//! Context types for check execution.

use crate::check::CheckError;
use crate::config::ReviewConfig;
use std::path::Path;

/// Context provided to every check for one file.
#[derive(Debug, Clone)]
pub struct FileContext<'a> {
    /// Path of the file as given to the pipeline.
    pub path: &'a Path,
    /// File contents.
    pub content: &'a str,
    /// Physical lines of `content`, split on `\n`.
    pub lines: Vec<&'a str>,
    /// Active configuration.
    pub config: &'a ReviewConfig,
}

impl<'a> FileContext<'a> {
    /// Creates a new file context.
    #[must_use]
    pub fn new(path: &'a Path, content: &'a str, config: &'a ReviewConfig) -> Self {
        Self {
            path,
            content,
            lines: content.split('\n').collect(),
            config,
        }
    }

    /// Validates a tree node's line before it is reported.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::MissingLocation`] if the parser left the line unset.
    pub fn located(&self, line: usize, construct: &'static str) -> Result<usize, CheckError> {
        if line == 0 || line > self.lines.len() {
            return Err(CheckError::MissingLocation { construct });
        }
        Ok(line)
    }
}
