//! Resource descriptors declared under `[assets.<group>]`.
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// One resource to embed into the native projects.
///
/// Deserialized from a table tagged by `type`:
///
/// ```toml
/// [[assets.images]]
/// type = "imageset"
/// path = "assets/logo.png"
///
/// [[assets.fonts]]
/// type = "font"
/// family = "Inter"
/// files = [{ path = "assets/fonts/Inter-Regular.ttf", weight = 400 }]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ResourceDescriptor {
    /// A bitmap with optional `@2x`/`@3x` siblings.
    #[serde(rename = "imageset")]
    BitmapSet {
        /// Path of the 1x file, relative to the project root.
        path: String,
    },
    /// A single 1024x1024 application icon.
    #[serde(rename = "appiconset")]
    IconSet {
        /// Path of the icon file, relative to the project root.
        path: String,
    },
    /// A font family made of one file per weight/style.
    #[serde(rename = "font")]
    FontFamily {
        /// Family name used by the application.
        family: String,
        /// Faces of the family.
        files: Vec<FontEntry>,
    },
}

impl ResourceDescriptor {
    /// Short label for log messages (`imageset assets/logo.png`).
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::BitmapSet { path } => format!("imageset {path}"),
            Self::IconSet { path } => format!("appiconset {path}"),
            Self::FontFamily { family, .. } => format!("font {family}"),
        }
    }

    /// Every source path the descriptor names.
    #[must_use]
    pub fn source_paths(&self) -> Vec<&str> {
        match self {
            Self::BitmapSet { path } | Self::IconSet { path } => vec![path.as_str()],
            Self::FontFamily { files, .. } => files.iter().map(|f| f.path.as_str()).collect(),
        }
    }
}

/// One face of a font family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FontEntry {
    /// Path of the font file, relative to the project root.
    pub path: String,
    /// Numeric weight (100 = thin, 400 = regular, 700 = bold).
    pub weight: FontWeight,
    /// Face style; `normal` when omitted.
    #[serde(default)]
    pub style: FontStyle,
}

impl FontEntry {
    /// File extension of the source, lowercased (`ttf`, `otf`).
    #[must_use]
    pub fn extension(&self) -> String {
        Path::new(&self.path)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default()
    }
}

/// Font weight in the CSS range `1..=1000`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct FontWeight(u16);

impl FontWeight {
    /// Lowest accepted weight.
    pub const MIN: u16 = 1;
    /// Highest accepted weight.
    pub const MAX: u16 = 1000;

    /// Numeric value.
    #[must_use]
    pub const fn value(self) -> u16 {
        self.0
    }
}

impl TryFrom<u16> for FontWeight {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(format!(
                "font weight {value} is outside {}..={}",
                Self::MIN,
                Self::MAX
            ))
        }
    }
}

impl From<FontWeight> for u16 {
    fn from(weight: FontWeight) -> Self {
        weight.0
    }
}

impl fmt::Display for FontWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Upright or italic face.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    /// Upright.
    #[default]
    Normal,
    /// Italic.
    Italic,
}

impl FontStyle {
    /// Lowercase name as written in resource documents.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Italic => "italic",
        }
    }
}

impl fmt::Display for FontStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
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
    use std::collections::BTreeMap;

    #[derive(Debug, Deserialize)]
    struct Doc {
        assets: BTreeMap<String, Vec<ResourceDescriptor>>,
    }

    #[test]
    fn deserializes_tagged_descriptors() {
        let doc: Doc = toml::from_str(
            r#"
[[assets.images]]
type = "imageset"
path = "assets/logo.png"

[[assets.images]]
type = "appiconset"
path = "assets/icon.png"

[[assets.fonts]]
type = "font"
family = "Inter"
files = [
  { path = "fonts/Inter-Regular.ttf", weight = 400 },
  { path = "fonts/Inter-Italic.ttf", weight = 400, style = "italic" },
]
"#,
        )
        .unwrap();
        assert_eq!(
            doc.assets["images"][0],
            ResourceDescriptor::BitmapSet {
                path: "assets/logo.png".to_string()
            }
        );
        assert!(matches!(
            doc.assets["images"][1],
            ResourceDescriptor::IconSet { .. }
        ));
        let ResourceDescriptor::FontFamily { family, files } = &doc.assets["fonts"][0] else {
            panic!("expected a font family");
        };
        assert_eq!(family, "Inter");
        assert_eq!(files[0].style, FontStyle::Normal);
        assert_eq!(files[1].style, FontStyle::Italic);
        assert_eq!(files[1].weight.value(), 400);
    }

    #[test]
    fn unknown_type_is_rejected() {
        let result: Result<Doc, _> = toml::from_str(
            r#"
[[assets.images]]
type = "gif"
path = "a.gif"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn weight_out_of_range_is_rejected() {
        let result: Result<Doc, _> = toml::from_str(
            r#"
[[assets.fonts]]
type = "font"
family = "Inter"
files = [{ path = "a.ttf", weight = 1200 }]
"#,
        );
        assert!(result.is_err());
        assert!(FontWeight::try_from(0).is_err());
        assert!(FontWeight::try_from(1000).is_ok());
    }

    #[test]
    fn labels_and_paths() {
        let d = ResourceDescriptor::FontFamily {
            family: "Inter".to_string(),
            files: vec![FontEntry {
                path: "a.TTF".to_string(),
                weight: FontWeight::try_from(700).unwrap(),
                style: FontStyle::Normal,
            }],
        };
        assert_eq!(d.label(), "font Inter");
        assert_eq!(d.source_paths(), vec!["a.TTF"]);
        if let ResourceDescriptor::FontFamily { files, .. } = &d {
            assert_eq!(files[0].extension(), "ttf");
        }
    }
}
