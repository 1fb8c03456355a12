//! Non-fatal configuration checks run after loading.
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use super::descriptors::{FontEntry, ResourceDescriptor};
use crate::assets::fonts::slug;

/// Image extensions an asset catalog and Android drawables both accept.
const SUPPORTED_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

/// Font container formats both platforms can load.
const SUPPORTED_FONT_EXTENSIONS: &[&str] = &["ttf", "otf"];

/// A validation warning detected during configuration loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// The validator that produced the warning (e.g., "paths", "fonts").
    pub source: String,
    /// The specific descriptor or group that triggered the warning.
    pub item: String,
    /// Human-readable warning message.
    pub message: String,
}

impl ValidationWarning {
    /// Create a new warning.
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        item: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            item: item.into(),
            message: message.into(),
        }
    }
}

/// Descriptors keyed by group, as loaded from `[assets.<group>]`.
pub type AssetGroups = BTreeMap<String, Vec<ResourceDescriptor>>;

/// Trait for configuration validators.
///
/// Validators never fail: they report suspicious but usable input so it can
/// be logged before the platform passes run.
pub trait ConfigValidator {
    /// Validate the configuration and return any warnings found.
    fn validate(&self, root: &Path) -> Vec<ValidationWarning>;

    /// Return a human-readable name for this validator (e.g., "paths", "fonts").
    fn name(&self) -> &'static str;
}

fn item(group: &str, descriptor: &ResourceDescriptor) -> String {
    format!("{group}: {}", descriptor.label())
}

/// Validator for descriptor source paths.
#[derive(Debug)]
pub struct PathValidator<'a> {
    assets: &'a AssetGroups,
}

impl<'a> PathValidator<'a> {
    /// Create a validator over `assets`.
    #[must_use]
    pub const fn new(assets: &'a AssetGroups) -> Self {
        Self { assets }
    }
}

impl ConfigValidator for PathValidator<'_> {
    fn validate(&self, _root: &Path) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        for (group, descriptors) in self.assets {
            for descriptor in descriptors {
                for path in descriptor.source_paths() {
                    if Path::new(path).is_absolute() || path.starts_with('/') {
                        warnings.push(ValidationWarning::new(
                            self.name(),
                            item(group, descriptor),
                            format!("{path} should be relative to the project root"),
                        ));
                    }
                }

                if let ResourceDescriptor::BitmapSet { path } | ResourceDescriptor::IconSet { path } =
                    descriptor
                {
                    let ext = Path::new(path)
                        .extension()
                        .and_then(|e| e.to_str())
                        .map(str::to_ascii_lowercase)
                        .unwrap_or_default();
                    if !SUPPORTED_IMAGE_EXTENSIONS.contains(&ext.as_str()) {
                        warnings.push(ValidationWarning::new(
                            self.name(),
                            item(group, descriptor),
                            format!(
                                "unsupported image extension '{ext}' (expected one of {})",
                                SUPPORTED_IMAGE_EXTENSIONS.join(", ")
                            ),
                        ));
                    }
                }
            }
        }

        warnings
    }

    fn name(&self) -> &'static str {
        "paths"
    }
}

/// Validator for font family descriptors.
#[derive(Debug)]
pub struct FontValidator<'a> {
    assets: &'a AssetGroups,
}

impl<'a> FontValidator<'a> {
    /// Create a validator over `assets`.
    #[must_use]
    pub const fn new(assets: &'a AssetGroups) -> Self {
        Self { assets }
    }

    fn check_family(
        &self,
        group: &str,
        descriptor: &ResourceDescriptor,
        files: &[FontEntry],
        warnings: &mut Vec<ValidationWarning>,
    ) {
        if files.is_empty() {
            warnings.push(ValidationWarning::new(
                self.name(),
                item(group, descriptor),
                "font family has no files",
            ));
        }

        let mut faces = BTreeSet::new();
        for file in files {
            // Android resolves faces by the hundreds
            if file.weight.value() % 100 != 0 {
                warnings.push(ValidationWarning::new(
                    self.name(),
                    item(group, descriptor),
                    format!("weight {} of {} is not a multiple of 100", file.weight, file.path),
                ));
            }
            if !faces.insert((file.weight, file.style)) {
                warnings.push(ValidationWarning::new(
                    self.name(),
                    item(group, descriptor),
                    format!(
                        "duplicate face {} {}: {} overwrites an earlier file",
                        file.weight, file.style, file.path
                    ),
                ));
            }
            let ext = file.extension();
            if !SUPPORTED_FONT_EXTENSIONS.contains(&ext.as_str()) {
                warnings.push(ValidationWarning::new(
                    self.name(),
                    item(group, descriptor),
                    format!("unsupported font extension '{ext}' for {}", file.path),
                ));
            }
        }
    }
}

impl ConfigValidator for FontValidator<'_> {
    fn validate(&self, _root: &Path) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        let mut families: BTreeMap<String, &str> = BTreeMap::new();

        for (group, descriptors) in self.assets {
            for descriptor in descriptors {
                let ResourceDescriptor::FontFamily { family, files } = descriptor else {
                    continue;
                };
                if let Some(first) = families.insert(family.to_lowercase(), group) {
                    warnings.push(ValidationWarning::new(
                        self.name(),
                        item(group, descriptor),
                        format!("font family '{family}' is also declared in group '{first}'"),
                    ));
                }
                self.check_family(group, descriptor, files, &mut warnings);
            }
        }

        warnings
    }

    fn name(&self) -> &'static str {
        "fonts"
    }
}

/// Validator for iOS bundle file name collisions.
///
/// iOS copies every font into one flat folder under its original file name,
/// so two families shipping `Regular.ttf` would overwrite each other.
#[derive(Debug)]
pub struct BundleNameValidator<'a> {
    assets: &'a AssetGroups,
}

impl<'a> BundleNameValidator<'a> {
    /// Create a validator over `assets`.
    #[must_use]
    pub const fn new(assets: &'a AssetGroups) -> Self {
        Self { assets }
    }
}

impl ConfigValidator for BundleNameValidator<'_> {
    fn validate(&self, _root: &Path) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        let mut seen: BTreeMap<String, &str> = BTreeMap::new();

        for (group, descriptors) in self.assets {
            for descriptor in descriptors {
                let ResourceDescriptor::FontFamily { files, .. } = descriptor else {
                    continue;
                };
                for file in files {
                    let Some(basename) = Path::new(&file.path).file_name() else {
                        continue;
                    };
                    let basename = basename.to_string_lossy().to_string();
                    if let Some(previous) = seen.insert(basename.clone(), &file.path)
                        && previous != file.path
                    {
                        warnings.push(ValidationWarning::new(
                            self.name(),
                            item(group, descriptor),
                            format!("{} and {previous} share the file name {basename}", file.path),
                        ));
                    }
                }
            }
        }

        warnings
    }

    fn name(&self) -> &'static str {
        "ios-bundle"
    }
}

/// Validator for generated resource name collisions.
///
/// Bitmaps are named after their file stem: `<stem>.imageset` on iOS and
/// `slug(stem)` in every Android drawable bucket. Two bitmaps whose stems
/// map to the same name overwrite each other on every run. App icons only
/// collide on the `.appiconset` name.
#[derive(Debug)]
pub struct ResourceNameValidator<'a> {
    assets: &'a AssetGroups,
}

impl<'a> ResourceNameValidator<'a> {
    /// Create a validator over `assets`.
    #[must_use]
    pub const fn new(assets: &'a AssetGroups) -> Self {
        Self { assets }
    }
}

impl ConfigValidator for ResourceNameValidator<'_> {
    fn validate(&self, _root: &Path) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        let mut bitmaps: BTreeMap<String, &str> = BTreeMap::new();
        let mut icons: BTreeMap<String, &str> = BTreeMap::new();

        for (group, descriptors) in self.assets {
            for descriptor in descriptors {
                let (seen, path, name) = match descriptor {
                    ResourceDescriptor::BitmapSet { path } => {
                        (&mut bitmaps, path.as_str(), slug(&stem(path)))
                    }
                    ResourceDescriptor::IconSet { path } => (&mut icons, path.as_str(), stem(path)),
                    ResourceDescriptor::FontFamily { .. } => continue,
                };
                if let Some(previous) = seen.insert(name.clone(), path)
                    && previous != path
                {
                    warnings.push(ValidationWarning::new(
                        self.name(),
                        item(group, descriptor),
                        format!("{path} and {previous} both generate resource '{name}'"),
                    ));
                }
            }
        }

        warnings
    }

    fn name(&self) -> &'static str {
        "resource-names"
    }
}

fn stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Validate all configuration and return collected warnings.
#[must_use]
pub fn validate_all(config: &super::Config) -> Vec<ValidationWarning> {
    let validators: Vec<Box<dyn ConfigValidator>> = vec![
        Box::new(PathValidator::new(&config.assets)),
        Box::new(FontValidator::new(&config.assets)),
        Box::new(BundleNameValidator::new(&config.assets)),
        Box::new(ResourceNameValidator::new(&config.assets)),
    ];

    let mut all_warnings = Vec::new();
    for validator in validators {
        all_warnings.extend(validator.validate(&config.root));
    }

    if config.ios.is_none() && config.android.is_none() && config.descriptor_count() > 0 {
        all_warnings.push(ValidationWarning::new(
            "platforms",
            "[ios] / [android]",
            "assets are declared but no platform section is configured",
        ));
    }

    all_warnings
}
