//! Shared state handed to every task.
use std::path::Path;
use std::sync::Arc;

use crate::assets::ResolvedAssets;
use crate::config::Config;
use crate::logging::Log;

/// Shared context for task execution.
pub struct Context {
    /// Configuration loaded from `native-assets.toml`.
    pub config: Arc<Config>,
    /// Descriptors resolved against the filesystem, split by kind.
    pub assets: Arc<ResolvedAssets>,
    /// Logger for output and task recording.
    pub log: Arc<dyn Log>,
    /// Whether to perform a dry run (preview changes without applying).
    pub dry_run: bool,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("root", &self.config.root)
            .field("assets", &self.assets)
            .field("log", &"<dyn Log>")
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl Context {
    /// Creates a new context for task execution.
    #[must_use]
    pub fn new(
        config: Arc<Config>,
        assets: Arc<ResolvedAssets>,
        log: Arc<dyn Log>,
        dry_run: bool,
    ) -> Self {
        Self {
            config,
            assets,
            log,
            dry_run,
        }
    }

    /// Project root every configured path is relative to.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.config.root
    }

    /// Create a copy of this context with a different logger.
    #[must_use]
    pub fn with_log(&self, log: Arc<dyn Log>) -> Self {
        Self {
            config: Arc::clone(&self.config),
            assets: Arc::clone(&self.assets),
            log,
            dry_run: self.dry_run,
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::logging::Logger;
    use crate::tasks::test_helpers::{empty_config, make_context};
    use std::path::PathBuf;

    #[test]
    fn root_returns_config_root() {
        let ctx = make_context(empty_config(PathBuf::from("/app")));
        assert_eq!(ctx.root(), Path::new("/app"));
    }

    #[test]
    fn with_log_preserves_other_fields() {
        let mut ctx = make_context(empty_config(PathBuf::from("/app")));
        ctx.dry_run = true;
        let new_log: Arc<dyn Log> = Arc::new(Logger::new("new"));
        let ctx2 = ctx.with_log(new_log);
        assert_eq!(ctx2.root(), ctx.root());
        assert!(ctx2.dry_run);
        assert!(Arc::ptr_eq(&ctx2.assets, &ctx.assets));
    }

    #[test]
    fn debug_format_includes_key_fields() {
        let ctx = make_context(empty_config(PathBuf::from("/app")));
        let debug = format!("{ctx:?}");
        assert!(debug.contains("Context"));
        assert!(debug.contains("dry_run"));
        assert!(debug.contains("/app"));
    }
}
