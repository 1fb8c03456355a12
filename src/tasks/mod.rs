//! Named tasks that orchestrate resource changes, one per native platform.
pub mod android;
mod context;
mod helpers;
pub mod ios;
mod processing;

pub use context::Context;
pub use processing::{ProcessOpts, TaskResult, TaskStats, process_resources};

use anyhow::Result;

use crate::logging::TaskStatus;
use crate::platform::NativePlatform;

/// A named, executable task.
pub trait Task: Send + Sync {
    /// Human-readable task name.
    fn name(&self) -> &str;

    /// Whether this task applies to the loaded project.
    fn should_run(&self, ctx: &Context) -> bool;

    /// Execute the task.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform pass cannot complete, such as when
    /// the native project is missing, a file cannot be copied, or the project
    /// manifest cannot be parsed or written.
    fn run(&self, ctx: &Context) -> Result<TaskResult>;
}

/// The task for one platform pass.
#[must_use]
pub fn task_for(platform: NativePlatform) -> Box<dyn Task> {
    match platform {
        NativePlatform::Android => Box::new(android::SyncAndroidResources),
        NativePlatform::Ios => Box::new(ios::SyncIosResources),
    }
}

/// The tasks run by the sync command, Android first.
///
/// An empty `platforms` selects every platform. Passes are independent: each
/// task records its own outcome and a failure does not stop the next one.
#[must_use]
pub fn all_sync_tasks(platforms: &[NativePlatform]) -> Vec<Box<dyn Task>> {
    NativePlatform::ALL
        .into_iter()
        .filter(|p| platforms.is_empty() || platforms.contains(p))
        .map(task_for)
        .collect()
}

/// Execute a task, recording the result in the logger.
pub fn execute(task: &dyn Task, ctx: &Context) {
    if !task.should_run(ctx) {
        ctx.log
            .debug(&format!("skipping task: {} (not applicable)", task.name()));
        ctx.log
            .record_task(task.name(), TaskStatus::NotApplicable, None);
        return;
    }

    ctx.log.stage(task.name());

    match task.run(ctx) {
        Ok(TaskResult::Ok) => {
            ctx.log.record_task(task.name(), TaskStatus::Ok, None);
        }
        Ok(TaskResult::Skipped(reason)) => {
            ctx.log.info(&format!("skipped: {reason}"));
            ctx.log
                .record_task(task.name(), TaskStatus::Skipped, Some(&reason));
        }
        Ok(TaskResult::DryRun) => {
            ctx.log.record_task(task.name(), TaskStatus::DryRun, None);
        }
        Err(e) => {
            ctx.log.error(&format!("{}: {e:#}", task.name()));
            ctx.log
                .record_task(task.name(), TaskStatus::Failed, Some(&format!("{e:#}")));
        }
    }
}
