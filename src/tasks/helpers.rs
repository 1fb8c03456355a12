//! Stale-output handling shared by the platform passes.
use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context as _, Result};

use super::{Context, TaskStats};
use crate::ledger::{LEDGER_FILE, Ledger, resolve_key};
use crate::platform::NativePlatform;
use crate::resources::helpers::fs::{prune_dir, remove_path, stale_entries};

/// Record `current` as the output of `platform` and delete what the previous
/// run generated but this one no longer does.
///
/// # Errors
///
/// Returns an error if a stale path exists but cannot be removed.
pub fn remove_orphans(
    ctx: &Context,
    ledger: &mut Ledger,
    platform: NativePlatform,
    current: BTreeSet<String>,
) -> Result<TaskStats> {
    let mut stats = TaskStats::new();
    for key in ledger.replace(platform, current) {
        let Some(path) = resolve_key(ctx.root(), &key) else {
            ctx.log
                .warn(&format!("ignoring {LEDGER_FILE} entry outside the project: {key}"));
            stats.skipped += 1;
            continue;
        };
        if ctx.dry_run {
            if path.exists() {
                ctx.log.dry_run(&format!("would remove {key}"));
                stats.changed += 1;
            }
            continue;
        }
        if remove_path(&path).with_context(|| format!("removing stale {key}"))? {
            ctx.log.debug(&format!("removed stale {key}"));
            stats.changed += 1;
        }
    }
    Ok(stats)
}

/// Remove entries of a generated directory that are not in `keep`.
///
/// # Errors
///
/// Returns an error if the directory cannot be listed or an entry cannot be
/// removed.
pub fn prune_generated_dir(ctx: &Context, dir: &Path, keep: &BTreeSet<String>) -> Result<TaskStats> {
    let removed = if ctx.dry_run {
        let stale = stale_entries(dir, keep)?;
        for path in &stale {
            ctx.log.dry_run(&format!("would remove {}", path.display()));
        }
        stale
    } else {
        let removed = prune_dir(dir, keep)?;
        for path in &removed {
            ctx.log.debug(&format!("removed {}", path.display()));
        }
        removed
    };
    Ok(TaskStats {
        changed: u32::try_from(removed.len()).unwrap_or(u32::MAX),
        ..TaskStats::new()
    })
}

/// Persist the ledger unless this is a dry run.
///
/// # Errors
///
/// Returns an error if the ledger cannot be written.
pub fn save_ledger(ctx: &Context, ledger: &Ledger) -> Result<()> {
    if ctx.dry_run {
        return Ok(());
    }
    if ledger.save(ctx.root())? {
        ctx.log.debug(&format!("updated {LEDGER_FILE}"));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tasks::test_helpers::{empty_config, make_context};

    fn keys(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn orphans_are_deleted_and_ledger_updated() {
        let dir = tempfile::tempdir().unwrap();
        let res = dir.path().join("res/font");
        std::fs::create_dir_all(&res).unwrap();
        std::fs::write(res.join("old.ttf"), b"x").unwrap();
        std::fs::write(res.join("new.ttf"), b"x").unwrap();
        let ctx = make_context(empty_config(dir.path().to_path_buf()));
        let mut ledger = Ledger::default();
        ledger.replace(NativePlatform::Android, keys(&["res/font/old.ttf", "res/font/new.ttf"]));

        let stats = remove_orphans(
            &ctx,
            &mut ledger,
            NativePlatform::Android,
            keys(&["res/font/new.ttf"]),
        )
        .unwrap();

        assert_eq!(stats.changed, 1);
        assert!(!res.join("old.ttf").exists());
        assert!(res.join("new.ttf").exists());
        assert_eq!(ledger.entries(NativePlatform::Android), keys(&["res/font/new.ttf"]));
    }

    #[test]
    fn dry_run_keeps_orphans_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("old.png"), b"x").unwrap();
        let mut ctx = make_context(empty_config(dir.path().to_path_buf()));
        ctx.dry_run = true;
        let mut ledger = Ledger::default();
        ledger.replace(NativePlatform::Android, keys(&["old.png"]));

        let stats =
            remove_orphans(&ctx, &mut ledger, NativePlatform::Android, BTreeSet::new()).unwrap();

        assert_eq!(stats.changed, 1);
        assert!(dir.path().join("old.png").exists());
    }

    #[test]
    fn escaping_entries_are_never_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = make_context(empty_config(dir.path().join("app")));
        let mut ledger = Ledger::default();
        ledger.replace(NativePlatform::Ios, keys(&["../outside.png"]));

        let stats =
            remove_orphans(&ctx, &mut ledger, NativePlatform::Ios, BTreeSet::new()).unwrap();

        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.changed, 0);
    }

    #[test]
    fn prune_generated_dir_counts_removed_entries() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("logo.png"), b"x").unwrap();
        std::fs::write(dir.path().join("logo@2x.png"), b"x").unwrap();
        let ctx = make_context(empty_config(dir.path().to_path_buf()));

        let stats = prune_generated_dir(&ctx, dir.path(), &keys(&["logo.png"])).unwrap();

        assert_eq!(stats.changed, 1);
        assert!(!dir.path().join("logo@2x.png").exists());
    }

    #[test]
    fn save_ledger_is_skipped_in_dry_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = make_context(empty_config(dir.path().to_path_buf()));
        ctx.dry_run = true;
        let mut ledger = Ledger::default();
        ledger.replace(NativePlatform::Ios, keys(&["a"]));
        save_ledger(&ctx, &ledger).unwrap();
        assert!(!dir.path().join(LEDGER_FILE).exists());
    }
}
