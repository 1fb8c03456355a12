//! iOS pass: asset catalog, bundled fonts, `UIAppFonts` and the Xcode
//! project graph.
use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Context as _, Result};

use super::helpers::{prune_generated_dir, remove_orphans, save_ledger};
use super::{Context, ProcessOpts, Task, TaskResult, TaskStats, process_resources};
use crate::assets::catalog::CONTENTS_FILE;
use crate::assets::{CatalogDocument, CatalogKind};
use crate::config::IosConfig;
use crate::ledger::{Ledger, relative_key};
use crate::platform::NativePlatform;
use crate::resources::file::CopiedFile;
use crate::resources::font_registry::{FONTS_KEY, FontRegistry};
use crate::resources::generated::GeneratedFile;
use crate::resources::helpers::fs::{recreate_dir, remove_path};
use crate::resources::{Resource as _, ResourceState};
use crate::xcode::XcodeProject;

/// Synchronize descriptors into the iOS project.
///
/// Order within the pass: stale catalog folders are removed, catalog files
/// are copied and their documents written, the catalog is linked, the font
/// folder is rebuilt and re-linked, `UIAppFonts` is replaced, and finally the
/// repaired project manifest is saved.
#[derive(Debug)]
pub struct SyncIosResources;

impl Task for SyncIosResources {
    fn name(&self) -> &str {
        "Sync iOS resources"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.config.ios.is_some()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let Some(ios) = ctx.config.ios.as_ref() else {
            return Ok(TaskResult::Skipped("no [ios] section".to_string()));
        };
        let name = ios.project_name().context("locating the Xcode project")?;
        let mut project = XcodeProject::load(&ios.project_root, &name)
            .with_context(|| format!("loading {name}.xcodeproj"))?;
        ctx.log.debug(&format!(
            "loaded {} ({} records)",
            project.path().display(),
            project.object_count()
        ));

        let mut ledger = Ledger::load(ctx.root())?;
        let mut stats = sync_catalog(ctx, ios, &name, &mut ledger)?;
        link_catalog(ctx, ios, &name, &mut project)?;
        let (font_stats, fonts) = sync_fonts(ctx, ios, &name, &mut project)?;
        stats += font_stats;
        stats += register_fonts(ctx, ios, &name, fonts)?;

        let pruned = project.repair();
        if pruned > 0 {
            ctx.log
                .debug(&format!("pruned {pruned} dangling project entries"));
        }
        save_project(ctx, &project)?;
        save_ledger(ctx, &ledger)?;
        Ok(stats.finish(ctx))
    }
}

/// One generated `.imageset` or `.appiconset` folder.
struct CatalogSet {
    dir: PathBuf,
    keep: BTreeSet<String>,
}

fn sync_catalog(
    ctx: &Context,
    ios: &IosConfig,
    name: &str,
    ledger: &mut Ledger,
) -> Result<TaskStats> {
    let catalog = ios.catalog_dir(name);
    let mut sets = Vec::new();
    let mut copies = Vec::new();
    let mut documents = Vec::new();

    for bitmap in &ctx.assets.bitmaps {
        let dir = catalog.join(CatalogKind::ImageSet.directory_name(&bitmap.name));
        let mut keep = BTreeSet::from([CONTENTS_FILE.to_string()]);
        for variant in bitmap.included() {
            let file = variant.file_name();
            copies.push(CopiedFile::new(variant.path.clone(), dir.join(&file)));
            keep.insert(file);
        }
        documents.push(GeneratedFile::new(
            dir.join(CONTENTS_FILE),
            CatalogDocument::for_bitmap(bitmap).to_json()?,
        ));
        sets.push(CatalogSet { dir, keep });
    }

    for icon in &ctx.assets.icons {
        let dir = catalog.join(CatalogKind::AppIconSet.directory_name(&icon.name));
        let file = icon.file_name();
        copies.push(CopiedFile::new(icon.path.clone(), dir.join(&file)));
        documents.push(GeneratedFile::new(
            dir.join(CONTENTS_FILE),
            CatalogDocument::for_icon(icon).to_json()?,
        ));
        sets.push(CatalogSet {
            dir,
            keep: BTreeSet::from([CONTENTS_FILE.to_string(), file]),
        });
    }

    if !sets.is_empty() {
        documents.insert(
            0,
            GeneratedFile::new(
                catalog.join(CONTENTS_FILE),
                CatalogDocument::root().to_json()?,
            ),
        );
    }

    let current = sets
        .iter()
        .map(|set| relative_key(ctx.root(), &set.dir))
        .collect();
    let mut stats = remove_orphans(ctx, ledger, NativePlatform::Ios, current)?;
    for set in &sets {
        stats += prune_generated_dir(ctx, &set.dir, &set.keep)?;
    }
    stats += process_resources(ctx, copies, &ProcessOpts::apply_all("copy"))?;
    stats += process_resources(ctx, documents, &ProcessOpts::apply_all("write"))?;
    ctx.log.debug(&format!(
        "{} catalog sets in {}",
        sets.len(),
        catalog.display()
    ));
    Ok(stats)
}

/// Reference the asset catalog from the app group and the resources phase.
fn link_catalog(
    ctx: &Context,
    ios: &IosConfig,
    name: &str,
    project: &mut XcodeProject,
) -> Result<()> {
    if ctx.assets.bitmaps.is_empty() && ctx.assets.icons.is_empty() {
        return Ok(());
    }
    let rel = format!("{name}/{}", ios.asset_catalog);
    project
        .add_resource_file_to_group(name, &rel, true)
        .with_context(|| format!("linking {rel}"))?;
    Ok(())
}

/// Rebuild the font folder and re-link exactly its files. Returns the file
/// names to register, in declaration order.
fn sync_fonts(
    ctx: &Context,
    ios: &IosConfig,
    name: &str,
    project: &mut XcodeProject,
) -> Result<(TaskStats, Vec<String>)> {
    let dir = ios.fonts_path(name);
    let mut files = Vec::new();
    let mut copies = Vec::new();
    for family in &ctx.assets.fonts {
        for face in &family.faces {
            let file = face.file_name();
            if files.contains(&file) {
                ctx.log
                    .warn(&format!("{file} is bundled twice; keeping the first"));
                continue;
            }
            copies.push(CopiedFile::new(face.path.clone(), dir.join(&file)));
            files.push(file);
        }
    }

    if ctx.dry_run {
        if !files.is_empty() || dir.exists() {
            ctx.log
                .dry_run(&format!("would recreate {}", dir.display()));
        }
    } else if files.is_empty() {
        remove_path(&dir)?;
    } else {
        recreate_dir(&dir)?;
    }
    let stats = process_resources(ctx, copies, &ProcessOpts::apply_all("copy"))?;

    let group = format!("{name}/{}", ios.fonts_dir);
    let removed = project.remove_stale_group_contents(&group);
    ctx.log.debug(&format!(
        "unlinked {} entries from {group}",
        removed.len()
    ));
    for file in &files {
        let rel = format!("{group}/{file}");
        project
            .add_resource_file_to_group(&group, &rel, true)
            .with_context(|| format!("linking {rel}"))?;
    }
    Ok((stats, files))
}

fn register_fonts(
    ctx: &Context,
    ios: &IosConfig,
    name: &str,
    fonts: Vec<String>,
) -> Result<TaskStats> {
    let registry = FontRegistry::new(ios.info_plist_path(name), fonts);
    if let ResourceState::Invalid { reason } = registry.current_state()? {
        ctx.log
            .warn(&format!("cannot update {FONTS_KEY}: {reason}"));
        return Ok(TaskStats {
            skipped: 1,
            ..TaskStats::new()
        });
    }
    process_resources(ctx, [registry], &ProcessOpts::apply_all("register"))
}

fn save_project(ctx: &Context, project: &XcodeProject) -> Result<()> {
    let path = project.path().display();
    if ctx.dry_run {
        let current = std::fs::read_to_string(project.path()).unwrap_or_default();
        if current != project.to_pbxproj() {
            ctx.log.dry_run(&format!("would update {path}"));
        }
        return Ok(());
    }
    if project
        .save()
        .with_context(|| format!("saving {path}"))?
    {
        ctx.log.info(&format!("updated {path}"));
    } else {
        ctx.log.debug(&format!("{path} unchanged"));
    }
    Ok(())
}
