//! Android pass: drawable buckets, `res/font` and entry-point registration.
use std::collections::BTreeSet;

use anyhow::Result;

use super::helpers::{remove_orphans, save_ledger};
use super::{Context, ProcessOpts, Task, TaskResult, TaskStats, process_resources};
use crate::assets::fonts::{face_file_name, family_document, family_document_name, slug};
use crate::config::AndroidConfig;
use crate::ledger::{Ledger, relative_key};
use crate::platform::NativePlatform;
use crate::resources::entry_point::{EntryPointPatch, FontRegistration};
use crate::resources::file::CopiedFile;
use crate::resources::generated::GeneratedFile;
use crate::resources::{Resource as _, ResourceState};

/// Synchronize descriptors into the Android project.
///
/// Every file written under `res/` is recorded in the ledger, and anything
/// the previous run wrote that is no longer generated is deleted first.
#[derive(Debug)]
pub struct SyncAndroidResources;

impl Task for SyncAndroidResources {
    fn name(&self) -> &str {
        "Sync Android resources"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.config.android.is_some()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let Some(android) = ctx.config.android.as_ref() else {
            return Ok(TaskResult::Skipped("no [android] section".to_string()));
        };
        if !ctx.assets.icons.is_empty() {
            ctx.log.debug(&format!(
                "{} app icon sets are iOS only",
                ctx.assets.icons.len()
            ));
        }

        let mut generated = BTreeSet::new();
        let mut copies = Vec::new();
        let mut documents = Vec::new();
        let mut registrations = Vec::new();

        for bitmap in &ctx.assets.bitmaps {
            let file = format!("{}{}", slug(&bitmap.name), bitmap.extension.to_ascii_lowercase());
            for variant in bitmap.included() {
                let target = android
                    .res_dir
                    .join(variant.density.android_bucket())
                    .join(&file);
                generated.insert(relative_key(ctx.root(), &target));
                copies.push(CopiedFile::new(variant.path.clone(), target));
            }
        }

        let font_dir = android.font_dir();
        for family in &ctx.assets.fonts {
            for face in &family.faces {
                let target = font_dir.join(face_file_name(&family.family, face));
                generated.insert(relative_key(ctx.root(), &target));
                copies.push(CopiedFile::new(face.path.clone(), target));
            }
            let document = font_dir.join(family_document_name(&family.family));
            generated.insert(relative_key(ctx.root(), &document));
            documents.push(GeneratedFile::new(document, family_document(family)));
            registrations.push(FontRegistration {
                family: family.family.clone(),
                resource: slug(&family.family),
            });
        }

        let mut ledger = Ledger::load(ctx.root())?;
        let mut stats = remove_orphans(ctx, &mut ledger, NativePlatform::Android, generated)?;
        stats += process_resources(ctx, copies, &ProcessOpts::apply_all("copy"))?;
        stats += process_resources(ctx, documents, &ProcessOpts::apply_all("write"))?;
        stats += register_fonts(ctx, android, registrations)?;
        save_ledger(ctx, &ledger)?;
        Ok(stats.finish(ctx))
    }
}

/// Rewrite the managed font block of the entry point. Problems with the
/// entry point are reported as warnings and never fail the pass.
fn register_fonts(
    ctx: &Context,
    android: &AndroidConfig,
    fonts: Vec<FontRegistration>,
) -> Result<TaskStats> {
    let Some(path) = android.entry_point() else {
        if fonts.is_empty() {
            return Ok(TaskStats::new());
        }
        ctx.log
            .warn("no MainApplication.kt or MainApplication.java found; fonts are not registered");
        return Ok(TaskStats {
            skipped: 1,
            ..TaskStats::new()
        });
    };
    let patch = EntryPointPatch::new(path, fonts);
    if let ResourceState::Invalid { reason } = patch.current_state()? {
        ctx.log
            .warn(&format!("cannot register fonts: {reason}"));
        return Ok(TaskStats {
            skipped: 1,
            ..TaskStats::new()
        });
    }
    process_resources(ctx, [patch], &ProcessOpts::apply_all("patch").no_bail())
}
