//! Resolution of descriptors into concrete source files.
//!
//! Only existence is checked here; nothing is read or written. That makes
//! resolution safe to fan out with rayon while every mutation stays
//! sequential.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::config::descriptors::{FontStyle, FontWeight, ResourceDescriptor};
use crate::error::ResolveError;

/// Screen density of a bitmap variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Density {
    /// Base resolution.
    X1,
    /// Double resolution.
    X2,
    /// Triple resolution.
    X3,
}

impl Density {
    /// All densities in catalog order.
    pub const ALL: [Self; 3] = [Self::X1, Self::X2, Self::X3];

    /// Catalog scale string (`1x`, `2x`, `3x`).
    #[must_use]
    pub const fn scale(self) -> &'static str {
        match self {
            Self::X1 => "1x",
            Self::X2 => "2x",
            Self::X3 => "3x",
        }
    }

    /// Filename suffix inserted before the extension.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::X1 => "",
            Self::X2 => "@2x",
            Self::X3 => "@3x",
        }
    }

    /// Android drawable bucket holding this density.
    #[must_use]
    pub const fn android_bucket(self) -> &'static str {
        match self {
            Self::X1 => "drawable-mdpi",
            Self::X2 => "drawable-xhdpi",
            Self::X3 => "drawable-xxhdpi",
        }
    }
}

/// One density of a bitmap, looked up on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVariant {
    /// Density of this file.
    pub density: Density,
    /// Absolute path where the file is expected.
    pub path: PathBuf,
    /// Whether the file exists.
    pub present: bool,
}

impl ResolvedVariant {
    /// Base name of the file (`logo@2x.png`).
    #[must_use]
    pub fn file_name(&self) -> String {
        file_name(&self.path)
    }
}

/// A bitmap descriptor with its three densities looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBitmap {
    /// File stem of the 1x file; names the `.imageset`.
    pub name: String,
    /// Extension including the leading dot (`.png`), or empty.
    pub extension: String,
    /// 1x, 2x and 3x, in that order.
    pub variants: Vec<ResolvedVariant>,
}

impl ResolvedBitmap {
    /// Whether the high-density pair is honored: both 2x and 3x must exist.
    #[must_use]
    pub fn has_high_density_pair(&self) -> bool {
        [Density::X2, Density::X3]
            .iter()
            .all(|d| self.variants.iter().any(|v| v.density == *d && v.present))
    }

    /// Whether `density` contributes a file to the generated set.
    #[must_use]
    pub fn includes(&self, density: Density) -> bool {
        match density {
            Density::X1 => true,
            Density::X2 | Density::X3 => self.has_high_density_pair(),
        }
    }

    /// The variants actually copied: 1x, plus 2x and 3x only as a pair.
    #[must_use]
    pub fn included(&self) -> Vec<&ResolvedVariant> {
        self.variants
            .iter()
            .filter(|v| self.includes(v.density))
            .collect()
    }
}

/// An app icon descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIcon {
    /// File stem; names the `.appiconset`.
    pub name: String,
    /// Absolute path of the icon.
    pub path: PathBuf,
}

impl ResolvedIcon {
    /// Base name of the icon file.
    #[must_use]
    pub fn file_name(&self) -> String {
        file_name(&self.path)
    }
}

/// One face of a resolved font family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFontFace {
    /// Absolute path of the font file.
    pub path: PathBuf,
    /// Numeric weight.
    pub weight: FontWeight,
    /// Face style.
    pub style: FontStyle,
}

impl ResolvedFontFace {
    /// Base name of the font file.
    #[must_use]
    pub fn file_name(&self) -> String {
        file_name(&self.path)
    }
}

/// A font family whose every face exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFontFamily {
    /// Family name.
    pub family: String,
    /// Faces in declaration order.
    pub faces: Vec<ResolvedFontFace>,
}

/// Result of resolving a single descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// An image set.
    Bitmap(ResolvedBitmap),
    /// An app icon set.
    Icon(ResolvedIcon),
    /// A font family.
    Font(ResolvedFontFamily),
}

/// A descriptor left out of the run, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedDescriptor {
    /// Group key the descriptor was declared under.
    pub group: String,
    /// Short label of the descriptor.
    pub label: String,
    /// Why it was skipped.
    pub error: ResolveError,
}

/// Every descriptor of a configuration, resolved and split by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedAssets {
    /// Image sets in declaration order.
    pub bitmaps: Vec<ResolvedBitmap>,
    /// App icon sets in declaration order.
    pub icons: Vec<ResolvedIcon>,
    /// Font families in declaration order.
    pub fonts: Vec<ResolvedFontFamily>,
    /// Descriptors that could not be resolved.
    pub skipped: Vec<SkippedDescriptor>,
}

impl ResolvedAssets {
    /// Whether no descriptor resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bitmaps.is_empty() && self.icons.is_empty() && self.fonts.is_empty()
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn require(path: PathBuf) -> Result<PathBuf, ResolveError> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(ResolveError::MissingSourceFile { path })
    }
}

/// Resolve one descriptor against `root`.
///
/// Bitmaps and icons require their base file. Font families require every
/// face; a single missing face rejects the whole family.
///
/// # Errors
///
/// Returns [`ResolveError::MissingSourceFile`] naming the first required
/// file that does not exist.
pub fn resolve(descriptor: &ResourceDescriptor, root: &Path) -> Result<Resolved, ResolveError> {
    match descriptor {
        ResourceDescriptor::BitmapSet { path } => {
            let base = require(root.join(path))?;
            let stem = base
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let extension = base
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy()))
                .unwrap_or_default();
            let dir = base.parent().map(Path::to_path_buf).unwrap_or_default();
            let variants = Density::ALL
                .iter()
                .map(|&density| {
                    let path = dir.join(format!("{stem}{}{extension}", density.suffix()));
                    let present = path.is_file();
                    ResolvedVariant {
                        density,
                        path,
                        present,
                    }
                })
                .collect();
            Ok(Resolved::Bitmap(ResolvedBitmap {
                name: stem,
                extension,
                variants,
            }))
        }
        ResourceDescriptor::IconSet { path } => {
            let path = require(root.join(path))?;
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            Ok(Resolved::Icon(ResolvedIcon { name, path }))
        }
        ResourceDescriptor::FontFamily { family, files } => {
            let faces = files
                .iter()
                .map(|entry| -> Result<ResolvedFontFace, ResolveError> {
                    Ok(ResolvedFontFace {
                        path: require(root.join(&entry.path))?,
                        weight: entry.weight,
                        style: entry.style,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Resolved::Font(ResolvedFontFamily {
                family: family.clone(),
                faces,
            }))
        }
    }
}

/// Resolve every descriptor of every group.
///
/// Group keys are visited in sorted order and descriptors in declaration
/// order; the output keeps that order whether or not probing runs in
/// parallel. Failures are collected in [`ResolvedAssets::skipped`] rather
/// than aborting.
#[must_use]
pub fn resolve_all(
    groups: &BTreeMap<String, Vec<ResourceDescriptor>>,
    root: &Path,
    parallel: bool,
) -> ResolvedAssets {
    let flat: Vec<(&String, &ResourceDescriptor)> = groups
        .iter()
        .flat_map(|(group, descriptors)| descriptors.iter().map(move |d| (group, d)))
        .collect();

    let results: Vec<_> = if parallel && flat.len() > 1 {
        flat.par_iter()
            .map(|(group, d)| (*group, *d, resolve(d, root)))
            .collect()
    } else {
        flat.iter()
            .map(|(group, d)| (*group, *d, resolve(d, root)))
            .collect()
    };

    let mut assets = ResolvedAssets::default();
    for (group, descriptor, result) in results {
        match result {
            Ok(Resolved::Bitmap(b)) => assets.bitmaps.push(b),
            Ok(Resolved::Icon(i)) => assets.icons.push(i),
            Ok(Resolved::Font(f)) => assets.fonts.push(f),
            Err(error) => assets.skipped.push(SkippedDescriptor {
                group: group.clone(),
                label: descriptor.label(),
                error,
            }),
        }
    }
    assets
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::config::descriptors::FontEntry;
    use std::fs;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, rel.as_bytes()).unwrap();
    }

    fn bitmap(path: &str) -> ResourceDescriptor {
        ResourceDescriptor::BitmapSet {
            path: path.to_string(),
        }
    }

    fn resolve_bitmap(root: &Path, path: &str) -> ResolvedBitmap {
        match resolve(&bitmap(path), root).unwrap() {
            Resolved::Bitmap(b) => b,
            other => panic!("expected bitmap, got {other:?}"),
        }
    }

    #[test]
    fn base_only_bitmap_includes_1x() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "assets/logo.png");
        let b = resolve_bitmap(dir.path(), "assets/logo.png");
        assert_eq!(b.name, "logo");
        assert_eq!(b.extension, ".png");
        assert_eq!(b.included().len(), 1);
        assert_eq!(b.included()[0].file_name(), "logo.png");
    }

    #[test]
    fn full_density_set_is_included() {
        let dir = tempfile::tempdir().unwrap();
        for f in ["a/logo.png", "a/logo@2x.png", "a/logo@3x.png"] {
            touch(dir.path(), f);
        }
        let b = resolve_bitmap(dir.path(), "a/logo.png");
        let names: Vec<String> = b.included().iter().map(|v| v.file_name()).collect();
        assert_eq!(names, vec!["logo.png", "logo@2x.png", "logo@3x.png"]);
    }

    #[test]
    fn lone_2x_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "assets/icon.png");
        touch(dir.path(), "assets/icon@2x.png");
        let b = resolve_bitmap(dir.path(), "assets/icon.png");
        assert!(b.variants[1].present);
        assert!(!b.has_high_density_pair());
        assert_eq!(b.included().len(), 1);
    }

    #[test]
    fn lone_3x_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "icon.png");
        touch(dir.path(), "icon@3x.png");
        let b = resolve_bitmap(dir.path(), "icon.png");
        assert!(!b.includes(Density::X3));
    }

    #[test]
    fn missing_base_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "icon@2x.png");
        let err = resolve(&bitmap("icon.png"), dir.path()).unwrap_err();
        assert_eq!(
            err,
            ResolveError::MissingSourceFile {
                path: dir.path().join("icon.png")
            }
        );
    }

    #[test]
    fn icon_requires_its_file() {
        let dir = tempfile::tempdir().unwrap();
        let d = ResourceDescriptor::IconSet {
            path: "AppIcon.png".to_string(),
        };
        assert!(resolve(&d, dir.path()).is_err());
        touch(dir.path(), "AppIcon.png");
        match resolve(&d, dir.path()).unwrap() {
            Resolved::Icon(icon) => assert_eq!(icon.name, "AppIcon"),
            other => panic!("expected icon, got {other:?}"),
        }
    }

    #[test]
    fn font_family_requires_every_face() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "fonts/Inter-Regular.ttf");
        let entry = |path: &str, weight: u16| FontEntry {
            path: path.to_string(),
            weight: FontWeight::try_from(weight).unwrap(),
            style: FontStyle::Normal,
        };
        let d = ResourceDescriptor::FontFamily {
            family: "Inter".to_string(),
            files: vec![
                entry("fonts/Inter-Regular.ttf", 400),
                entry("fonts/Inter-Bold.ttf", 700),
            ],
        };
        assert!(matches!(
            resolve(&d, dir.path()),
            Err(ResolveError::MissingSourceFile { .. })
        ));
        touch(dir.path(), "fonts/Inter-Bold.ttf");
        assert!(matches!(resolve(&d, dir.path()), Ok(Resolved::Font(_))));
    }

    #[test]
    fn resolve_all_skips_and_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.png");
        touch(dir.path(), "c.png");
        let mut groups = BTreeMap::new();
        groups.insert(
            "images".to_string(),
            vec![bitmap("a.png"), bitmap("b.png"), bitmap("c.png")],
        );
        for parallel in [false, true] {
            let assets = resolve_all(&groups, dir.path(), parallel);
            let names: Vec<&str> = assets.bitmaps.iter().map(|b| b.name.as_str()).collect();
            assert_eq!(names, vec!["a", "c"]);
            assert_eq!(assets.skipped.len(), 1);
            assert_eq!(assets.skipped[0].group, "images");
            assert_eq!(assets.skipped[0].label, "imageset b.png");
        }
    }
}
