//! Shared tool context.
//!
//! Holds the explicit override path for the verification tool. It starts out
//! as whatever `C2PATOOL_PATH` named and is replaced by the installer after
//! every successful install, so later lookups prefer the fresh binary.

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// Environment variable naming an explicit tool path.
pub const TOOL_PATH_ENV: &str = "C2PATOOL_PATH";

/// Cloneable handle to the override tool path.
///
/// Clones share the same slot. Writes are last-wins.
#[derive(Debug, Clone, Default)]
pub struct ToolContext {
    tool_path: Arc<RwLock<Option<PathBuf>>>,
}

impl ToolContext {
    /// Create a context with an optional override path.
    #[must_use]
    pub fn new(tool_path: Option<PathBuf>) -> Self {
        Self {
            tool_path: Arc::new(RwLock::new(tool_path)),
        }
    }

    /// Current override path, if any.
    #[must_use]
    pub fn tool_path(&self) -> Option<PathBuf> {
        self.tool_path
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Record a freshly installed tool.
    pub fn set_tool_path(&self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        debug!(?path, "Recording tool override path");
        *self
            .tool_path
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_override() {
        let ctx = ToolContext::default();
        let clone = ctx.clone();
        assert!(ctx.tool_path().is_none());

        clone.set_tool_path("/opt/c2patool");
        assert_eq!(ctx.tool_path(), Some(PathBuf::from("/opt/c2patool")));
    }

    #[test]
    fn test_last_write_wins() {
        let ctx = ToolContext::new(Some(PathBuf::from("/a")));
        ctx.set_tool_path("/b");
        assert_eq!(ctx.tool_path(), Some(PathBuf::from("/b")));
    }
}
