//! Generic resource processing loop: check state, apply, collect stats.
//!
//! Resources are always processed one at a time and in order; later steps of
//! a pass (such as linking files into the Xcode project) rely on earlier
//! copies having completed.

mod apply;

use anyhow::Result;

use super::Context;
use crate::resources::Resource;

/// Result of a single task execution.
///
/// # Examples
///
/// ```
/// use native_assets_cli::tasks::TaskResult;
///
/// let ok = TaskResult::Ok;
/// let skipped = TaskResult::Skipped("no descriptors".into());
/// let dry = TaskResult::DryRun;
///
/// assert!(matches!(ok, TaskResult::Ok));
/// assert!(matches!(skipped, TaskResult::Skipped(_)));
/// assert!(matches!(dry, TaskResult::DryRun));
/// ```
#[derive(Debug, Clone)]
pub enum TaskResult {
    /// Task completed successfully.
    Ok,
    /// Task was skipped (nothing to do for this project).
    Skipped(String),
    /// Task ran in dry-run mode.
    DryRun,
}

/// Counters for tasks that process many items.
///
/// Provides consistent summary logging across all tasks.
///
/// # Examples
///
/// ```
/// use native_assets_cli::tasks::TaskStats;
///
/// let mut stats = TaskStats::new();
/// stats.changed = 3;
/// stats.already_ok = 10;
///
/// assert_eq!(stats.summary(false), "3 changed, 10 already ok");
/// assert_eq!(stats.summary(true), "3 would change, 10 already ok");
/// ```
///
/// When items are skipped, the summary includes the count:
///
/// ```
/// use native_assets_cli::tasks::TaskStats;
///
/// let stats = TaskStats { changed: 1, already_ok: 2, skipped: 3 };
/// assert_eq!(stats.summary(false), "1 changed, 2 already ok, 3 skipped");
/// ```
#[derive(Debug, Default)]
pub struct TaskStats {
    /// Number of items changed or applied.
    pub changed: u32,
    /// Number of items already in the correct state.
    pub already_ok: u32,
    /// Number of items skipped due to errors or inapplicability.
    pub skipped: u32,
}

impl TaskStats {
    /// Create a new empty stats counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Format the summary string (e.g. "3 changed, 10 already ok, 1 skipped").
    #[must_use]
    pub fn summary(&self, dry_run: bool) -> String {
        let verb = if dry_run { "would change" } else { "changed" };
        if self.skipped > 0 {
            format!(
                "{} {verb}, {} already ok, {} skipped",
                self.changed, self.already_ok, self.skipped
            )
        } else {
            format!("{} {verb}, {} already ok", self.changed, self.already_ok)
        }
    }

    /// Log the summary and return the appropriate `TaskResult`.
    #[must_use]
    pub fn finish(self, ctx: &Context) -> TaskResult {
        ctx.log.info(&self.summary(ctx.dry_run));
        if ctx.dry_run {
            TaskResult::DryRun
        } else {
            TaskResult::Ok
        }
    }
}

impl std::ops::AddAssign for TaskStats {
    fn add_assign(&mut self, other: Self) {
        self.changed += other.changed;
        self.already_ok += other.already_ok;
        self.skipped += other.skipped;
    }
}

/// Configuration for the generic resource processing loop.
///
/// Controls how each [`ResourceState`](crate::resources::ResourceState)
/// variant is handled.
///
/// # Examples
///
/// ```
/// use native_assets_cli::tasks::ProcessOpts;
///
/// // Fix everything, bail on errors (strict):
/// let opts = ProcessOpts::apply_all("copy");
/// assert!(opts.bail_on_error);
///
/// // Fix everything, warn on errors (lenient):
/// let opts = ProcessOpts::apply_all("patch").no_bail();
/// assert!(!opts.bail_on_error);
/// ```
#[derive(Debug)]
pub struct ProcessOpts<'a> {
    /// Verb for log messages (e.g., "copy", "write", "register").
    pub verb: &'a str,
    /// Propagate errors from `apply()` (bail). If `false`, warn and count as skipped.
    pub bail_on_error: bool,
}

impl<'a> ProcessOpts<'a> {
    /// Apply every missing or incorrect resource, bailing on errors.
    #[must_use]
    pub const fn apply_all(verb: &'a str) -> Self {
        Self {
            verb,
            bail_on_error: true,
        }
    }

    /// Warn on errors instead of bailing.
    #[must_use]
    pub const fn no_bail(mut self) -> Self {
        self.bail_on_error = false;
        self
    }
}

/// Process resources in order by checking each one's current state and
/// applying as needed. Returns the accumulated counters so a task can combine
/// several batches before calling [`TaskStats::finish`].
///
/// # Errors
///
/// Returns an error if a resource fails to report its state, or fails to
/// apply while `opts.bail_on_error` is set.
pub fn process_resources<R: Resource>(
    ctx: &Context,
    resources: impl IntoIterator<Item = R>,
    opts: &ProcessOpts,
) -> Result<TaskStats> {
    let mut stats = TaskStats::new();
    for resource in resources {
        let current = resource.current_state()?;
        stats += apply::process_single(ctx, &resource, current, opts)?;
    }
    Ok(stats)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::resources::{Applicable, ResourceChange, ResourceState};
    use crate::tasks::test_helpers::{empty_config, make_static_context};
    use std::cell::Cell;
    use std::path::PathBuf;
    use std::rc::Rc;

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    /// A configurable mock resource for testing the processing pipeline.
    struct MockResource {
        state_result: Result<ResourceState, String>,
        apply_result: Result<ResourceChange, String>,
        applied: Rc<Cell<u32>>,
    }

    impl MockResource {
        fn new(state: ResourceState) -> Self {
            Self {
                state_result: Ok(state),
                apply_result: Ok(ResourceChange::Applied),
                applied: Rc::new(Cell::new(0)),
            }
        }

        fn with_state_error(mut self, err: impl Into<String>) -> Self {
            self.state_result = Err(err.into());
            self
        }

        fn with_apply(mut self, result: Result<ResourceChange, String>) -> Self {
            self.apply_result = result;
            self
        }
    }

    impl Applicable for MockResource {
        fn description(&self) -> String {
            "mock resource".to_string()
        }

        fn apply(&self) -> Result<ResourceChange> {
            self.applied.set(self.applied.get() + 1);
            self.apply_result
                .clone()
                .map_err(|s| anyhow::anyhow!("{s}"))
        }
    }

    impl Resource for MockResource {
        fn current_state(&self) -> Result<ResourceState> {
            self.state_result
                .clone()
                .map_err(|s| anyhow::anyhow!("{s}"))
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn test_context() -> Context {
        make_static_context(empty_config(PathBuf::from("/tmp"))).0
    }

    fn dry_run_context() -> Context {
        let mut ctx = test_context();
        ctx.dry_run = true;
        ctx
    }

    fn lenient_opts() -> ProcessOpts<'static> {
        ProcessOpts::apply_all("copy").no_bail()
    }

    fn strict_opts() -> ProcessOpts<'static> {
        ProcessOpts::apply_all("copy")
    }

    fn incorrect() -> ResourceState {
        ResourceState::Incorrect {
            current: "contents differ".to_string(),
        }
    }

    // -----------------------------------------------------------------------
    // TaskStats
    // -----------------------------------------------------------------------

    #[test]
    fn stats_summary_changed_only() {
        let stats = TaskStats {
            changed: 3,
            already_ok: 0,
            skipped: 0,
        };
        assert_eq!(stats.summary(false), "3 changed, 0 already ok");
    }

    #[test]
    fn stats_summary_dry_run() {
        let stats = TaskStats {
            changed: 2,
            already_ok: 5,
            skipped: 0,
        };
        assert_eq!(stats.summary(true), "2 would change, 5 already ok");
    }

    #[test]
    fn stats_add_assign_accumulates() {
        let mut stats = TaskStats {
            changed: 1,
            already_ok: 1,
            skipped: 0,
        };
        stats += TaskStats {
            changed: 2,
            already_ok: 0,
            skipped: 4,
        };
        assert_eq!(stats.summary(false), "3 changed, 1 already ok, 4 skipped");
    }

    #[test]
    fn stats_finish_returns_dry_run_result() {
        let ctx = dry_run_context();
        assert!(matches!(TaskStats::new().finish(&ctx), TaskResult::DryRun));
    }

    #[test]
    fn stats_finish_returns_ok_result() {
        let ctx = test_context();
        assert!(matches!(TaskStats::new().finish(&ctx), TaskResult::Ok));
    }

    // -----------------------------------------------------------------------
    // process_single
    // -----------------------------------------------------------------------

    #[test]
    fn process_single_correct_increments_already_ok() {
        let ctx = test_context();
        let resource = MockResource::new(ResourceState::Correct);
        let stats =
            apply::process_single(&ctx, &resource, ResourceState::Correct, &lenient_opts())
                .unwrap();
        assert_eq!(stats.already_ok, 1);
        assert_eq!(stats.changed, 0);
        assert_eq!(resource.applied.get(), 0);
    }

    #[test]
    fn process_single_invalid_increments_skipped() {
        let ctx = test_context();
        let state = ResourceState::Invalid {
            reason: "source does not exist".to_string(),
        };
        let resource = MockResource::new(state.clone());
        let stats = apply::process_single(&ctx, &resource, state, &lenient_opts()).unwrap();
        assert_eq!(stats.skipped, 1);
        assert_eq!(resource.applied.get(), 0);
    }

    #[test]
    fn process_single_missing_applies_and_increments_changed() {
        let ctx = test_context();
        let resource = MockResource::new(ResourceState::Missing);
        let stats =
            apply::process_single(&ctx, &resource, ResourceState::Missing, &lenient_opts())
                .unwrap();
        assert_eq!(stats.changed, 1);
        assert_eq!(resource.applied.get(), 1);
    }

    #[test]
    fn process_single_incorrect_applies_and_increments_changed() {
        let ctx = test_context();
        let resource = MockResource::new(incorrect());
        let stats = apply::process_single(&ctx, &resource, incorrect(), &lenient_opts()).unwrap();
        assert_eq!(stats.changed, 1);
    }

    #[test]
    fn process_single_dry_run_counts_without_applying() {
        let ctx = dry_run_context();
        let resource =
            MockResource::new(ResourceState::Missing).with_apply(Err("should not call".into()));
        let stats =
            apply::process_single(&ctx, &resource, ResourceState::Missing, &strict_opts())
                .unwrap();
        assert_eq!(stats.changed, 1);
        assert_eq!(resource.applied.get(), 0);
    }

    // -----------------------------------------------------------------------
    // apply_resource
    // -----------------------------------------------------------------------

    #[test]
    fn apply_resource_already_correct_increments_already_ok() {
        let ctx = test_context();
        let resource = MockResource::new(ResourceState::Missing)
            .with_apply(Ok(ResourceChange::AlreadyCorrect));
        let stats = apply::apply_resource(&ctx, &resource, &strict_opts()).unwrap();
        assert_eq!(stats.already_ok, 1);
        assert_eq!(stats.changed, 0);
    }

    #[test]
    fn apply_resource_error_no_bail_increments_skipped() {
        let ctx = test_context();
        let resource =
            MockResource::new(ResourceState::Missing).with_apply(Err("boom".to_string()));
        let stats = apply::apply_resource(&ctx, &resource, &lenient_opts()).unwrap();
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.changed, 0);
    }

    #[test]
    fn apply_resource_skipped_no_bail_increments_skipped() {
        let ctx = test_context();
        let resource =
            MockResource::new(ResourceState::Missing).with_apply(Ok(ResourceChange::Skipped {
                reason: "anchor not found".to_string(),
            }));
        let stats = apply::apply_resource(&ctx, &resource, &lenient_opts()).unwrap();
        assert_eq!(stats.skipped, 1);
    }

    #[test]
    fn apply_resource_bail_on_skipped_returns_error() {
        let ctx = test_context();
        let resource =
            MockResource::new(ResourceState::Missing).with_apply(Ok(ResourceChange::Skipped {
                reason: "denied".to_string(),
            }));
        let err = apply::apply_resource(&ctx, &resource, &strict_opts()).unwrap_err();
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn apply_resource_bail_on_error_propagates() {
        let ctx = test_context();
        let resource =
            MockResource::new(ResourceState::Missing).with_apply(Err("disk full".to_string()));
        let err = apply::apply_resource(&ctx, &resource, &strict_opts()).unwrap_err();
        assert!(err.to_string().contains("disk full"));
    }

    // -----------------------------------------------------------------------
    // process_resources
    // -----------------------------------------------------------------------

    #[test]
    fn process_resources_mixed_states() {
        let ctx = test_context();
        let resources = vec![
            MockResource::new(ResourceState::Correct),
            MockResource::new(ResourceState::Missing),
            MockResource::new(ResourceState::Invalid {
                reason: "bad".to_string(),
            }),
        ];
        let stats = process_resources(&ctx, resources, &lenient_opts()).unwrap();
        assert_eq!(stats.already_ok, 1);
        assert_eq!(stats.changed, 1);
        assert_eq!(stats.skipped, 1);
    }

    #[test]
    fn process_resources_empty_list() {
        let ctx = test_context();
        let stats = process_resources(&ctx, Vec::<MockResource>::new(), &lenient_opts()).unwrap();
        assert_eq!(stats.summary(false), "0 changed, 0 already ok");
    }

    #[test]
    fn process_resources_current_state_error_propagates() {
        let ctx = test_context();
        let resources = vec![MockResource::new(ResourceState::Missing).with_state_error("eacces")];
        let err = process_resources(&ctx, resources, &lenient_opts()).unwrap_err();
        assert!(err.to_string().contains("eacces"));
    }

    #[test]
    fn process_resources_stops_at_first_strict_failure() {
        let ctx = test_context();
        let second = MockResource::new(ResourceState::Missing);
        let applied = Rc::clone(&second.applied);
        let resources = vec![
            MockResource::new(ResourceState::Missing).with_apply(Err("copy failed".to_string())),
            second,
        ];
        assert!(process_resources(&ctx, resources, &strict_opts()).is_err());
        assert_eq!(applied.get(), 0, "later resources must not be applied");
    }
}
