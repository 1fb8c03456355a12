//! iOS font registration list (`UIAppFonts` in `Info.plist`).
use anyhow::{Context as _, Result};
use plist::{Dictionary, Value};
use std::path::PathBuf;

use super::error::ResourceError;
use super::{Applicable, Resource, ResourceChange, ResourceState};

/// Key holding the bundled font file names.
pub const FONTS_KEY: &str = "UIAppFonts";

/// The registration list of an application property list.
///
/// The list is always replaced wholesale: any name not in `fonts` is dropped,
/// and the key is removed entirely when `fonts` is empty.
#[derive(Debug, Clone)]
pub struct FontRegistry {
    /// Path of the property list.
    pub plist: PathBuf,
    /// Font file base names, in registration order.
    pub fonts: Vec<String>,
}

impl FontRegistry {
    /// Create a registry resource for `plist`.
    #[must_use]
    pub const fn new(plist: PathBuf, fonts: Vec<String>) -> Self {
        Self { plist, fonts }
    }

    fn load(&self) -> Result<Dictionary> {
        let value = Value::from_file(&self.plist)
            .with_context(|| format!("read property list {}", self.plist.display()))?;
        value.into_dictionary().ok_or_else(|| {
            ResourceError::InvalidState {
                resource: self.plist.display().to_string(),
                reason: "root is not a dictionary".to_string(),
            }
            .into()
        })
    }

    /// Names currently registered, `None` when the key is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the property list cannot be read or its root is
    /// not a dictionary.
    pub fn registered(&self) -> Result<Option<Vec<String>>> {
        let dict = self.load()?;
        Ok(dict.get(FONTS_KEY).map(|value| {
            value
                .as_array()
                .map(|items| {
                    items
                        .iter()
                        .filter_map(Value::as_string)
                        .map(ToString::to_string)
                        .collect()
                })
                .unwrap_or_default()
        }))
    }
}

impl Applicable for FontRegistry {
    fn description(&self) -> String {
        format!("{} {FONTS_KEY}", self.plist.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        let mut dict = self.load()?;
        if self.fonts.is_empty() {
            dict.remove(FONTS_KEY);
        } else {
            dict.insert(
                FONTS_KEY.to_string(),
                Value::Array(self.fonts.iter().cloned().map(Value::String).collect()),
            );
        }
        Value::Dictionary(dict)
            .to_file_xml(&self.plist)
            .with_context(|| format!("write property list {}", self.plist.display()))?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for FontRegistry {
    fn current_state(&self) -> Result<ResourceState> {
        if !self.plist.is_file() {
            return Ok(ResourceState::Invalid {
                reason: format!("property list not found: {}", self.plist.display()),
            });
        }
        match self.registered()? {
            None if self.fonts.is_empty() => Ok(ResourceState::Correct),
            None => Ok(ResourceState::Missing),
            Some(current) if current == self.fonts => Ok(ResourceState::Correct),
            Some(current) => Ok(ResourceState::Incorrect {
                current: format!("[{}]", current.join(", ")),
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    const INFO_PLIST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
	<key>CFBundleName</key>
	<string>MyApp</string>
	<key>UIAppFonts</key>
	<array>
		<string>Old-Regular.ttf</string>
	</array>
</dict>
</plist>
"#;

    fn plist_file() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Info.plist");
        std::fs::write(&path, INFO_PLIST).unwrap();
        (dir, path)
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn replaces_list_wholesale() {
        let (_dir, path) = plist_file();
        let registry = FontRegistry::new(path.clone(), names(&["Inter-Regular.ttf"]));
        assert!(matches!(
            registry.current_state().unwrap(),
            ResourceState::Incorrect { .. }
        ));
        registry.apply().unwrap();
        assert_eq!(
            registry.registered().unwrap(),
            Some(names(&["Inter-Regular.ttf"]))
        );
        assert_eq!(registry.current_state().unwrap(), ResourceState::Correct);

        let dict = Value::from_file(&path).unwrap().into_dictionary().unwrap();
        assert_eq!(
            dict.get("CFBundleName").and_then(Value::as_string),
            Some("MyApp")
        );
    }

    #[test]
    fn empty_list_removes_key() {
        let (_dir, path) = plist_file();
        let registry = FontRegistry::new(path, Vec::new());
        assert!(registry.needs_change().unwrap());
        registry.apply().unwrap();
        assert_eq!(registry.registered().unwrap(), None);
        assert_eq!(registry.current_state().unwrap(), ResourceState::Correct);
    }

    #[test]
    fn absent_key_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Info.plist");
        std::fs::write(
            &path,
            INFO_PLIST.replace(
                "\t<key>UIAppFonts</key>\n\t<array>\n\t\t<string>Old-Regular.ttf</string>\n\t</array>\n",
                "",
            ),
        )
        .unwrap();
        let registry = FontRegistry::new(path, names(&["A.ttf"]));
        assert_eq!(registry.current_state().unwrap(), ResourceState::Missing);
    }

    #[test]
    fn missing_plist_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let registry = FontRegistry::new(dir.path().join("Info.plist"), names(&["A.ttf"]));
        assert!(matches!(
            registry.current_state().unwrap(),
            ResourceState::Invalid { .. }
        ));
    }

    #[test]
    fn non_dictionary_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Info.plist");
        std::fs::write(
            &path,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<plist version=\"1.0\">\n<array/>\n</plist>\n",
        )
        .unwrap();
        let registry = FontRegistry::new(path, Vec::new());
        let err = registry.current_state().unwrap_err();
        assert!(err.to_string().contains("not a dictionary"), "{err}");
    }
}
