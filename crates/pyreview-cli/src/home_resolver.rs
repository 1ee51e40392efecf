//! State directory resolution.
//!
//! 1. `--home` flag or `$PYREVIEW_HOME` (clap reads the variable into the flag)
//! 2. `~/.pyreview`
//! 3. No home directory → error

use pyreview::StateDir;
use std::path::{Path, PathBuf};

/// State directory name below the user's home.
const STATE_DIR_NAME: &str = ".pyreview";

/// Resolves the state directory, or `None` if no home directory is known.
#[must_use]
pub fn resolve(explicit: Option<&Path>) -> Option<StateDir> {
    resolve_inner(explicit, home::home_dir()).map(StateDir::new)
}

/// Testable core: accepts `home_dir` as parameter to avoid env var races.
fn resolve_inner(explicit: Option<&Path>, home_dir: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(p) = explicit {
        tracing::debug!("Using state directory {}", p.display());
        return Some(p.to_path_buf());
    }
    home_dir.map(|h| h.join(STATE_DIR_NAME))
}
