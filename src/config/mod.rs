//! Configuration loading from `native-assets.toml`.
//!
//! ```toml
//! [ios]
//! project_root = "ios"
//!
//! [android]
//! project_root = "android"
//!
//! [[assets.images]]
//! type = "imageset"
//! path = "assets/logo.png"
//! ```
pub mod descriptors;
pub mod toml_loader;
pub mod validation;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use serde::Deserialize;

use crate::error::ConfigError;
use descriptors::ResourceDescriptor;

/// Default configuration file name, looked up in the project root.
pub const CONFIG_FILE: &str = "native-assets.toml";

/// Raw file layout, before paths are resolved against the project root.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    ios: Option<IosSettings>,
    #[serde(default)]
    android: Option<AndroidSettings>,
    #[serde(default)]
    assets: BTreeMap<String, Vec<ResourceDescriptor>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct IosSettings {
    #[serde(default = "default_ios_root")]
    project_root: String,
    #[serde(default)]
    project_name: Option<String>,
    #[serde(default = "default_asset_catalog")]
    asset_catalog: String,
    #[serde(default = "default_fonts_dir")]
    fonts_dir: String,
    #[serde(default)]
    info_plist: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct AndroidSettings {
    #[serde(default = "default_android_root")]
    project_root: String,
    #[serde(default = "default_res_dir")]
    res_dir: String,
    #[serde(default)]
    main_application: Option<String>,
}

fn default_ios_root() -> String {
    "ios".to_string()
}

fn default_asset_catalog() -> String {
    "Images.xcassets".to_string()
}

fn default_fonts_dir() -> String {
    "Fonts".to_string()
}

fn default_android_root() -> String {
    "android".to_string()
}

fn default_res_dir() -> String {
    "app/src/main/res".to_string()
}

/// Settings of the iOS pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IosConfig {
    /// Directory holding the `*.xcodeproj` bundle.
    pub project_root: PathBuf,
    /// Configured project name; detected from the bundle when `None`.
    pub project_name: Option<String>,
    /// Asset catalog folder name inside the application group.
    pub asset_catalog: String,
    /// Font folder name inside the application group.
    pub fonts_dir: String,
    /// Configured property list path, relative to `project_root`.
    pub info_plist: Option<String>,
}

impl IosConfig {
    /// Name of the Xcode project, either configured or detected.
    ///
    /// Detection picks the single `*.xcodeproj` bundle in `project_root`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ProjectNotFound`] when no bundle exists and
    /// [`ConfigError::AmbiguousProject`] when several do.
    pub fn project_name(&self) -> Result<String, ConfigError> {
        if let Some(name) = &self.project_name {
            return Ok(name.clone());
        }
        let entries = std::fs::read_dir(&self.project_root)
            .map_err(|_| ConfigError::ProjectNotFound(self.project_root.clone()))?;
        let mut names: Vec<String> = entries
            .filter_map(std::result::Result::ok)
            .filter(|e| e.path().is_dir())
            .filter_map(|e| {
                e.file_name()
                    .to_str()
                    .and_then(|n| n.strip_suffix(".xcodeproj"))
                    .map(ToString::to_string)
            })
            .collect();
        names.sort();
        match names.as_slice() {
            [] => Err(ConfigError::ProjectNotFound(self.project_root.clone())),
            [name] => Ok(name.clone()),
            _ => Err(ConfigError::AmbiguousProject(self.project_root.clone())),
        }
    }

    /// Application source folder (`<project_root>/<name>`), which is also
    /// the project group every resource is linked under.
    #[must_use]
    pub fn app_dir(&self, name: &str) -> PathBuf {
        self.project_root.join(name)
    }

    /// Asset catalog directory.
    #[must_use]
    pub fn catalog_dir(&self, name: &str) -> PathBuf {
        self.app_dir(name).join(&self.asset_catalog)
    }

    /// Font output directory.
    #[must_use]
    pub fn fonts_path(&self, name: &str) -> PathBuf {
        self.app_dir(name).join(&self.fonts_dir)
    }

    /// Property list holding `UIAppFonts`.
    #[must_use]
    pub fn info_plist_path(&self, name: &str) -> PathBuf {
        self.info_plist.as_ref().map_or_else(
            || self.app_dir(name).join("Info.plist"),
            |p| self.project_root.join(p),
        )
    }
}

/// Settings of the Android pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AndroidConfig {
    /// Root of the Gradle project.
    pub project_root: PathBuf,
    /// Resource directory (`res/`).
    pub res_dir: PathBuf,
    /// Configured entry-point source; detected when `None`.
    pub main_application: Option<PathBuf>,
}

impl AndroidConfig {
    /// Directory fonts and family documents are written to.
    #[must_use]
    pub fn font_dir(&self) -> PathBuf {
        self.res_dir.join("font")
    }

    /// The application entry point, configured or detected.
    ///
    /// Detection searches `app/src/main/java` for the first
    /// `MainApplication.kt` or `MainApplication.java` in path order.
    #[must_use]
    pub fn entry_point(&self) -> Option<PathBuf> {
        if let Some(path) = &self.main_application {
            return Some(path.clone());
        }
        find_entry_point(&self.project_root.join("app/src/main/java"))
    }
}

fn find_entry_point(dir: &Path) -> Option<PathBuf> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(std::result::Result::ok)
        .map(|e| e.path())
        .collect();
    entries.sort();
    for path in &entries {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if path.is_file() && (name == "MainApplication.kt" || name == "MainApplication.java") {
            return Some(path.clone());
        }
    }
    entries
        .iter()
        .filter(|p| p.is_dir())
        .find_map(|p| find_entry_point(p))
}

/// All loaded configuration for one project.
#[derive(Debug, Clone)]
pub struct Config {
    /// Project root every relative path is resolved against.
    pub root: PathBuf,
    /// iOS settings; `None` disables the iOS pass.
    pub ios: Option<IosConfig>,
    /// Android settings; `None` disables the Android pass.
    pub android: Option<AndroidConfig>,
    /// Descriptors keyed by group, in group-name order.
    pub assets: BTreeMap<String, Vec<ResourceDescriptor>>,
}

impl Config {
    /// Load `native-assets.toml` (or `config_path` when given) for `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable, or does not match
    /// the schema.
    pub fn load(root: &Path, config_path: Option<&Path>) -> Result<Self> {
        let path = config_path.map_or_else(|| root.join(CONFIG_FILE), |p| root.join(p));
        let file: ConfigFile = toml_loader::load_config(&path)
            .with_context(|| format!("loading {}", path.display()))?;
        Ok(Self::from_file(root, file))
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if `text` does not match the schema.
    pub fn from_toml(root: &Path, text: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(text).map_err(|e| ConfigError::InvalidSyntax {
            file: CONFIG_FILE.to_string(),
            message: e.to_string().trim().to_string(),
        })?;
        Ok(Self::from_file(root, file))
    }

    fn from_file(root: &Path, file: ConfigFile) -> Self {
        let ios = file.ios.map(|s| IosConfig {
            project_root: root.join(s.project_root),
            project_name: s.project_name,
            asset_catalog: s.asset_catalog,
            fonts_dir: s.fonts_dir,
            info_plist: s.info_plist,
        });
        let android = file.android.map(|s| {
            let project_root = root.join(s.project_root);
            AndroidConfig {
                res_dir: project_root.join(s.res_dir),
                main_application: s.main_application.map(|p| project_root.join(p)),
                project_root,
            }
        });
        Self {
            root: root.to_path_buf(),
            ios,
            android,
            assets: file.assets,
        }
    }

    /// Total number of descriptors across all groups.
    #[must_use]
    pub fn descriptor_count(&self) -> usize {
        self.assets.values().map(Vec::len).sum()
    }

    /// Run every validator over the loaded configuration.
    #[must_use]
    pub fn validate(&self) -> Vec<validation::ValidationWarning> {
        validation::validate_all(self)
    }
}
