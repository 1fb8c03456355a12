//! `sync` subcommand: resolve assets and apply them to the native projects.
use std::sync::Arc;

use anyhow::Result;

use crate::cli::{GlobalOpts, SyncOpts};
use crate::logging::Logger;
use crate::tasks;

/// Run the sync command.
///
/// # Errors
///
/// Returns an error if configuration loading fails or any platform pass
/// fails.
pub fn run(global: &GlobalOpts, opts: &SyncOpts, log: &Arc<Logger>) -> Result<()> {
    let version = super::version::current();
    log.info(&format!("native-assets {version}"));

    let setup = super::CommandSetup::init(global, log)?;
    if setup.assets.is_empty() {
        log.info("no resources resolved; previously generated files will be removed");
    }
    if global.dry_run {
        log.info("dry run: no files will be written");
    }
    let ctx = setup.into_context(log, global.dry_run);

    let tasks = tasks::all_sync_tasks(&opts.platform);
    super::run_tasks_to_completion(tasks.iter().map(Box::as_ref), &ctx, log)
}
