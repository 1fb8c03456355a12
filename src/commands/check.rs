//! `check` subcommand: resolve assets without writing anything.
use std::sync::Arc;

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::logging::Logger;
use crate::tasks::{Context, Task, TaskResult};
use crate::xcode::XcodeProject;

/// Run the check command.
///
/// Loads and resolves everything `sync` would, then reports problems
/// without touching the native projects.
///
/// # Errors
///
/// Returns an error if configuration loading fails, a descriptor would be
/// skipped, or a configured native project cannot be located.
pub fn run(global: &GlobalOpts, log: &Arc<Logger>) -> Result<()> {
    let setup = super::CommandSetup::init(global, log)?;
    let ctx = setup.into_context(log, true);

    let tasks: Vec<Box<dyn Task>> = vec![
        Box::new(ValidateSources),
        Box::new(ValidateIosProject),
        Box::new(ValidateAndroidProject),
    ];

    super::run_tasks_to_completion(tasks.iter().map(Box::as_ref), &ctx, log)
}

// ---------------------------------------------------------------------------
// Validation tasks
// ---------------------------------------------------------------------------

/// Every descriptor resolves to an existing source file.
#[derive(Debug)]
struct ValidateSources;

impl Task for ValidateSources {
    fn name(&self) -> &'static str {
        "Validate asset sources"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.config.descriptor_count() > 0
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        // Font files are checked here even though sync only discovers them
        // while copying.
        let mut missing = ctx.assets.skipped.len();
        for family in &ctx.assets.fonts {
            for face in &family.faces {
                if !face.path.exists() {
                    ctx.log.error(&format!(
                        "font {}: missing source file {}",
                        family.family,
                        face.path.display()
                    ));
                    missing += 1;
                }
            }
        }

        if missing > 0 {
            anyhow::bail!("{missing} asset source(s) missing");
        }
        ctx.log.info(&format!(
            "{} image sets, {} app icons, {} font families resolved",
            ctx.assets.bitmaps.len(),
            ctx.assets.icons.len(),
            ctx.assets.fonts.len()
        ));
        Ok(TaskResult::Ok)
    }
}

/// The Xcode project can be located and parsed.
#[derive(Debug)]
struct ValidateIosProject;

impl Task for ValidateIosProject {
    fn name(&self) -> &'static str {
        "Validate iOS project"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.config.ios.is_some()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let Some(ios) = ctx.config.ios.as_ref() else {
            return Ok(TaskResult::Skipped("no [ios] section".to_string()));
        };
        let name = ios.project_name()?;
        let project = XcodeProject::load(&ios.project_root, &name)?;
        ctx.log.info(&format!(
            "{}: {} records",
            project.path().display(),
            project.object_count()
        ));
        let plist = ios.info_plist_path(&name);
        if !plist.exists() && !ctx.assets.fonts.is_empty() {
            ctx.log.warn(&format!(
                "{} not found; fonts will not be registered",
                plist.display()
            ));
        }
        Ok(TaskResult::Ok)
    }
}

/// The Android resource directory and entry point exist.
#[derive(Debug)]
struct ValidateAndroidProject;

impl Task for ValidateAndroidProject {
    fn name(&self) -> &'static str {
        "Validate Android project"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.config.android.is_some()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let Some(android) = ctx.config.android.as_ref() else {
            return Ok(TaskResult::Skipped("no [android] section".to_string()));
        };
        if !android.project_root.is_dir() {
            anyhow::bail!(
                "android project not found: {}",
                android.project_root.display()
            );
        }
        match android.entry_point() {
            Some(path) => ctx.log.info(&format!("entry point: {}", path.display())),
            None if !ctx.assets.fonts.is_empty() => ctx
                .log
                .warn("no MainApplication found; fonts will not be registered"),
            None => {}
        }
        Ok(TaskResult::Ok)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tasks::test_helpers::{empty_config, make_context};

    #[test]
    fn sources_task_not_applicable_without_descriptors() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = make_context(empty_config(dir.path().to_path_buf()));
        assert!(!ValidateSources.should_run(&ctx));
    }

    #[test]
    fn platform_tasks_follow_config_sections() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = make_context(empty_config(dir.path().to_path_buf()));
        assert!(!ValidateIosProject.should_run(&ctx));
        assert!(!ValidateAndroidProject.should_run(&ctx));
    }
}
