//! Ledger of generated files (`native-assets.lock`).
//!
//! Each pass records the files and directories it generated, relative to the
//! project root. On the next run everything recorded but no longer generated
//! is deleted, which is how orphaned Android resources and catalog folders
//! from removed descriptors are cleaned up.
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path, PathBuf};

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};

use crate::platform::NativePlatform;

/// Ledger file name in the project root.
pub const LEDGER_FILE: &str = "native-assets.lock";

const LEDGER_VERSION: u32 = 1;

const HEADER: &str = "# Generated by native-assets. Lists files owned by the synchronizer.\n";

/// Generated paths per platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    /// Format version.
    pub version: u32,
    /// Project-relative paths keyed by platform identifier.
    #[serde(default)]
    pub generated: BTreeMap<String, BTreeSet<String>>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            version: LEDGER_VERSION,
            generated: BTreeMap::new(),
        }
    }
}

impl Ledger {
    /// Load the ledger of `root`; a missing file yields an empty ledger.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(LEDGER_FILE);
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
        }
    }

    /// Write the ledger to `root` if its contents changed.
    ///
    /// Returns `true` when the file was written.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, root: &Path) -> Result<bool> {
        let path = root.join(LEDGER_FILE);
        let text = format!(
            "{HEADER}{}",
            toml::to_string(self).context("serializing ledger")?
        );
        if std::fs::read_to_string(&path).is_ok_and(|existing| existing == text) {
            return Ok(false);
        }
        std::fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;
        Ok(true)
    }

    /// Paths recorded for `platform`.
    #[must_use]
    pub fn entries(&self, platform: NativePlatform) -> BTreeSet<String> {
        self.generated
            .get(platform.as_str())
            .cloned()
            .unwrap_or_default()
    }

    /// Replace the record of `platform` with `current`, returning the
    /// previously recorded paths that are no longer generated.
    pub fn replace(&mut self, platform: NativePlatform, current: BTreeSet<String>) -> Vec<String> {
        let previous = self.entries(platform);
        let stale = previous.difference(&current).cloned().collect();
        if current.is_empty() {
            self.generated.remove(platform.as_str());
        } else {
            self.generated.insert(platform.as_str().to_string(), current);
        }
        stale
    }
}

/// Project-relative, `/`-separated form of `path`.
///
/// Paths outside `root` are returned unchanged so they can never match a
/// later deletion by accident.
#[must_use]
pub fn relative_key(root: &Path, path: &Path) -> String {
    path.strip_prefix(root).map_or_else(
        |_| path.display().to_string(),
        |rel| {
            rel.components()
                .filter_map(|c| match c {
                    Component::Normal(part) => Some(part.to_string_lossy().to_string()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("/")
        },
    )
}

/// Absolute path of a ledger key, or `None` when the key would escape `root`.
#[must_use]
pub fn resolve_key(root: &Path, key: &str) -> Option<PathBuf> {
    let rel = Path::new(key);
    if key.is_empty()
        || rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
    {
        return None;
    }
    Some(root.join(rel))
}
