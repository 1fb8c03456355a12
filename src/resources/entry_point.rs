//! Managed font registration block in the Android application entry point.
//!
//! The block is delimited by marker comments so every run can strip the
//! previous version and insert a fresh one:
//!
//! ```text
//! package com.example.app
//! // native-assets:imports:begin
//! import com.facebook.react.common.assets.ReactFontManager
//! // native-assets:imports:end
//! ...
//!     super.onCreate()
//!     // native-assets:fonts:begin
//!     ReactFontManager.getInstance().addCustomFont(this, "Inter", R.font.inter)
//!     // native-assets:fonts:end
//! ```
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use super::error::ResourceError;
use super::{Applicable, Resource, ResourceChange, ResourceState};

const IMPORTS_BEGIN: &str = "// native-assets:imports:begin";
const IMPORTS_END: &str = "// native-assets:imports:end";
const FONTS_BEGIN: &str = "// native-assets:fonts:begin";
const FONTS_END: &str = "// native-assets:fonts:end";

const FONT_MANAGER_IMPORT: &str = "import com.facebook.react.common.assets.ReactFontManager";
const PACKAGE_ANCHOR: &str = "package ";
const ON_CREATE_ANCHOR: &str = "super.onCreate(";

/// Source language of the entry point, which decides statement terminators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLanguage {
    /// `MainApplication.kt`
    Kotlin,
    /// `MainApplication.java`
    Java,
}

impl SourceLanguage {
    /// Detect the language from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "kt" => Some(Self::Kotlin),
            "java" => Some(Self::Java),
            _ => None,
        }
    }

    const fn terminator(self) -> &'static str {
        match self {
            Self::Kotlin => "",
            Self::Java => ";",
        }
    }
}

/// One family registered with the font manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontRegistration {
    /// Family name used from JavaScript.
    pub family: String,
    /// Resource name of the family document (`R.font.<resource>`).
    pub resource: String,
}

/// Remove every managed block from `text`.
#[must_use]
pub fn strip_managed_blocks(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut inside = false;
    for line in text.split_inclusive('\n') {
        let trimmed = line.trim();
        if trimmed == IMPORTS_BEGIN || trimmed == FONTS_BEGIN {
            inside = true;
            continue;
        }
        if trimmed == IMPORTS_END || trimmed == FONTS_END {
            inside = false;
            continue;
        }
        if !inside {
            out.push_str(line);
        }
    }
    out
}

/// Render `text` with fresh managed blocks for `fonts`.
///
/// With no fonts the result is `text` with its managed blocks removed.
/// Otherwise every line of the result ends with a newline.
///
/// # Errors
///
/// Returns [`ResourceError::AnchorNotFound`] when the `package` line or the
/// `super.onCreate()` call cannot be found.
pub fn render(
    text: &str,
    language: SourceLanguage,
    fonts: &[FontRegistration],
) -> Result<String, ResourceError> {
    let stripped = strip_managed_blocks(text);
    if fonts.is_empty() {
        return Ok(stripped);
    }

    let lines: Vec<&str> = stripped.split_inclusive('\n').collect();
    let package = lines
        .iter()
        .position(|l| l.trim_start().starts_with(PACKAGE_ANCHOR))
        .ok_or_else(|| ResourceError::AnchorNotFound {
            anchor: PACKAGE_ANCHOR.trim_end().to_string(),
        })?;
    let on_create = lines
        .iter()
        .position(|l| l.contains(ON_CREATE_ANCHOR))
        .ok_or_else(|| ResourceError::AnchorNotFound {
            anchor: "super.onCreate()".to_string(),
        })?;

    let end = language.terminator();
    let mut out = String::with_capacity(stripped.len() + 256);
    for (index, line) in lines.iter().enumerate() {
        out.push_str(line);
        if !line.ends_with('\n') {
            out.push('\n');
        }
        if index == package {
            out.push_str(&format!(
                "{IMPORTS_BEGIN}\n{FONT_MANAGER_IMPORT}{end}\n{IMPORTS_END}\n"
            ));
        }
        if index == on_create {
            let indent: String = line.chars().take_while(|c| c.is_whitespace()).collect();
            out.push_str(&format!("{indent}{FONTS_BEGIN}\n"));
            for font in fonts {
                out.push_str(&format!(
                    "{indent}ReactFontManager.getInstance().addCustomFont(this, \"{}\", R.font.{}){end}\n",
                    font.family.replace('"', "\\\""),
                    font.resource
                ));
            }
            out.push_str(&format!("{indent}{FONTS_END}\n"));
        }
    }
    Ok(out)
}

/// The entry-point source file with its managed font block.
#[derive(Debug, Clone)]
pub struct EntryPointPatch {
    /// `MainApplication.kt` or `MainApplication.java`.
    pub path: PathBuf,
    /// Families to register, in order.
    pub fonts: Vec<FontRegistration>,
}

impl EntryPointPatch {
    /// Create a patch for `path`.
    #[must_use]
    pub const fn new(path: PathBuf, fonts: Vec<FontRegistration>) -> Self {
        Self { path, fonts }
    }

    fn language(&self) -> Result<SourceLanguage, ResourceError> {
        SourceLanguage::from_path(&self.path).ok_or_else(|| ResourceError::InvalidState {
            resource: self.path.display().to_string(),
            reason: "entry point must be a .kt or .java file".to_string(),
        })
    }

    fn read(&self) -> Result<String> {
        std::fs::read_to_string(&self.path)
            .with_context(|| format!("read {}", self.path.display()))
    }
}

impl Applicable for EntryPointPatch {
    fn description(&self) -> String {
        format!("{} font registration", self.path.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        let text = self.read()?;
        let patched = render(&text, self.language()?, &self.fonts)
            .with_context(|| format!("patch {}", self.path.display()))?;
        if patched == text {
            return Ok(ResourceChange::AlreadyCorrect);
        }
        std::fs::write(&self.path, patched)
            .with_context(|| format!("write {}", self.path.display()))?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for EntryPointPatch {
    fn current_state(&self) -> Result<ResourceState> {
        if !self.path.is_file() {
            return Ok(ResourceState::Invalid {
                reason: format!("entry point not found: {}", self.path.display()),
            });
        }
        let language = match self.language() {
            Ok(language) => language,
            Err(e) => return Ok(ResourceState::Invalid { reason: e.to_string() }),
        };
        let text = self.read()?;
        match render(&text, language, &self.fonts) {
            Err(e) => Ok(ResourceState::Invalid { reason: e.to_string() }),
            Ok(patched) if patched == text => Ok(ResourceState::Correct),
            Ok(_) => Ok(ResourceState::Incorrect {
                current: "managed font block out of date".to_string(),
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    const KOTLIN: &str = "package com.example.app

import android.app.Application

class MainApplication : Application() {
  override fun onCreate() {
    super.onCreate()
    loadReactNative(this)
  }
}
";

    fn inter() -> Vec<FontRegistration> {
        vec![FontRegistration {
            family: "Inter".to_string(),
            resource: "inter".to_string(),
        }]
    }

    #[test]
    fn inserts_import_and_statements() {
        let out = render(KOTLIN, SourceLanguage::Kotlin, &inter()).unwrap();
        insta::assert_snapshot!(out, @r#"
        package com.example.app
        // native-assets:imports:begin
        import com.facebook.react.common.assets.ReactFontManager
        // native-assets:imports:end

        import android.app.Application

        class MainApplication : Application() {
          override fun onCreate() {
            super.onCreate()
            // native-assets:fonts:begin
            ReactFontManager.getInstance().addCustomFont(this, "Inter", R.font.inter)
            // native-assets:fonts:end
            loadReactNative(this)
          }
        }
        "#);
    }

    #[test]
    fn render_is_idempotent() {
        let once = render(KOTLIN, SourceLanguage::Kotlin, &inter()).unwrap();
        let twice = render(&once, SourceLanguage::Kotlin, &inter()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_fonts_restore_original() {
        let patched = render(KOTLIN, SourceLanguage::Kotlin, &inter()).unwrap();
        let restored = render(&patched, SourceLanguage::Kotlin, &[]).unwrap();
        assert_eq!(restored, KOTLIN);
    }

    #[test]
    fn java_statements_are_terminated() {
        let java = KOTLIN.replace("super.onCreate()", "super.onCreate();");
        let out = render(&java, SourceLanguage::Java, &inter()).unwrap();
        assert!(out.contains("import com.facebook.react.common.assets.ReactFontManager;\n"));
        assert!(out.contains("R.font.inter);\n"));
    }

    #[test]
    fn missing_anchor_is_reported() {
        let text = KOTLIN.replace("super.onCreate()", "init()");
        let err = render(&text, SourceLanguage::Kotlin, &inter()).unwrap_err();
        assert!(matches!(err, ResourceError::AnchorNotFound { .. }));
    }

    #[test]
    fn resource_state_tracks_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("MainApplication.kt");
        std::fs::write(&path, KOTLIN).unwrap();
        let patch = EntryPointPatch::new(path.clone(), inter());
        assert!(patch.needs_change().unwrap());
        assert_eq!(patch.apply().unwrap(), ResourceChange::Applied);
        assert_eq!(patch.current_state().unwrap(), ResourceState::Correct);
        assert_eq!(patch.apply().unwrap(), ResourceChange::AlreadyCorrect);

        std::fs::write(&path, "package x\n").unwrap();
        assert!(matches!(
            patch.current_state().unwrap(),
            ResourceState::Invalid { .. }
        ));
    }

    #[test]
    fn language_detection() {
        assert_eq!(
            SourceLanguage::from_path(Path::new("MainApplication.kt")),
            Some(SourceLanguage::Kotlin)
        );
        assert_eq!(
            SourceLanguage::from_path(Path::new("MainApplication.java")),
            Some(SourceLanguage::Java)
        );
        assert_eq!(SourceLanguage::from_path(Path::new("main.swift")), None);
    }
}
