//! Subcommand implementations and the setup they share.
pub mod check;
pub mod sync;
pub mod version;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::assets::{self, ResolvedAssets};
use crate::cli::GlobalOpts;
use crate::config::Config;
use crate::logging::{Log, Logger};
use crate::tasks::{self, Context, Task};

/// Environment variable naming the project root when `--root` is absent.
pub const ROOT_ENV: &str = "NATIVE_ASSETS_ROOT";

/// Shared state produced by the common command setup sequence.
///
/// Encapsulates root resolution, configuration loading, validation, and
/// descriptor resolution so that each command does not have to repeat the
/// boilerplate.
#[derive(Debug)]
pub struct CommandSetup {
    /// Loaded configuration.
    pub config: Config,
    /// Descriptors resolved against the filesystem.
    pub assets: ResolvedAssets,
}

impl CommandSetup {
    /// Resolve the root, load and validate the configuration, and resolve
    /// every descriptor against the filesystem.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory does not exist or the
    /// configuration file is missing or malformed.
    pub fn init(global: &GlobalOpts, log: &Logger) -> Result<Self> {
        let root = resolve_root(global)?;
        log.debug(&format!("project root: {}", root.display()));

        log.stage("Loading configuration");
        let config = Config::load(&root, global.config.as_deref())?;
        log.debug(&format!(
            "ios: {}, android: {}",
            config.ios.is_some(),
            config.android.is_some()
        ));
        log.info(&format!(
            "loaded {} descriptors in {} groups",
            config.descriptor_count(),
            config.assets.len()
        ));

        // Validate configuration and display warnings
        let warnings = config.validate();
        if !warnings.is_empty() {
            log.warn(&format!(
                "found {} configuration warning(s):",
                warnings.len()
            ));
            for warning in &warnings {
                log.warn(&format!(
                    "  {} [{}]: {}",
                    warning.source, warning.item, warning.message
                ));
            }
        }

        log.stage("Resolving descriptors");
        let assets = assets::resolve_all(&config.assets, &config.root, global.parallel);
        log.info(&format!(
            "{} image sets, {} app icons, {} font families",
            assets.bitmaps.len(),
            assets.icons.len(),
            assets.fonts.len()
        ));
        for skipped in &assets.skipped {
            log.warn(&format!(
                "skipping {} [{}]: {}",
                skipped.label, skipped.group, skipped.error
            ));
        }

        Ok(Self { config, assets })
    }

    /// Build the task context for this setup.
    #[must_use]
    pub fn into_context(self, log: &Arc<Logger>, dry_run: bool) -> Context {
        Context::new(
            Arc::new(self.config),
            Arc::new(self.assets),
            Arc::clone(log) as Arc<dyn Log>,
            dry_run,
        )
    }
}

/// Resolve the project root: `--root`, then `NATIVE_ASSETS_ROOT`, then the
/// current directory.
///
/// # Errors
///
/// Returns an error if the chosen directory does not exist.
pub fn resolve_root(global: &GlobalOpts) -> Result<PathBuf> {
    let root = if let Some(ref root) = global.root {
        root.clone()
    } else if let Ok(root) = std::env::var(ROOT_ENV) {
        PathBuf::from(root)
    } else {
        std::env::current_dir().context("reading the current directory")?
    };
    dunce::canonicalize(&root)
        .with_context(|| format!("project root not found: {}", root.display()))
}

/// Execute every task in order, print the summary, and bail if any task failed.
///
/// # Errors
///
/// Returns an error if one or more tasks recorded a failure.
pub fn run_tasks_to_completion<'a>(
    tasks: impl IntoIterator<Item = &'a dyn Task>,
    ctx: &Context,
    log: &Logger,
) -> Result<()> {
    for task in tasks {
        tasks::execute(task, ctx);
    }

    log.print_summary();

    let count = log.failure_count();
    if count > 0 {
        anyhow::bail!("{count} task(s) failed");
    }
    Ok(())
}
