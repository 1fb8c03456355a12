//! Asset catalog `Contents.json` documents.
use serde::{Deserialize, Serialize};

use super::variants::{Density, ResolvedBitmap, ResolvedIcon};

/// File name of every catalog document.
pub const CONTENTS_FILE: &str = "Contents.json";

/// Author recorded in generated documents.
pub const AUTHOR: &str = "expo";

/// Schema version recorded in generated documents.
pub const VERSION: u32 = 1;

/// Which kind of catalog folder a document describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    /// `<name>.imageset`
    ImageSet,
    /// `<name>.appiconset`
    AppIconSet,
}

impl CatalogKind {
    /// Folder extension, without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::ImageSet => "imageset",
            Self::AppIconSet => "appiconset",
        }
    }

    /// Folder name for a resource called `name`.
    #[must_use]
    pub fn directory_name(self, name: &str) -> String {
        format!("{name}.{}", self.extension())
    }
}

/// One entry of the `images` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogImage {
    /// File inside the folder; absent for a declared but empty slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Device family.
    pub idiom: String,
    /// Target platform, for icons.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    /// Scale factor, for bitmaps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<String>,
    /// Point size, for icons.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

/// The `info` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogInfo {
    /// Tool that wrote the document.
    pub author: String,
    /// Schema version.
    pub version: u32,
}

impl Default for CatalogInfo {
    fn default() -> Self {
        Self {
            author: AUTHOR.to_string(),
            version: VERSION,
        }
    }
}

/// A `Contents.json` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogDocument {
    /// Image slots; omitted for the catalog root.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<CatalogImage>,
    /// Fixed metadata.
    pub info: CatalogInfo,
}

impl CatalogDocument {
    /// Document for the catalog root folder.
    #[must_use]
    pub fn root() -> Self {
        Self {
            images: Vec::new(),
            info: CatalogInfo::default(),
        }
    }

    /// Document for an image set: one universal slot per density, with a
    /// filename only for the densities actually included.
    #[must_use]
    pub fn for_bitmap(bitmap: &ResolvedBitmap) -> Self {
        let images = Density::ALL
            .iter()
            .map(|&density| CatalogImage {
                filename: bitmap
                    .variants
                    .iter()
                    .find(|v| v.density == density)
                    .filter(|_| bitmap.includes(density))
                    .map(|v| v.file_name()),
                idiom: "universal".to_string(),
                platform: None,
                scale: Some(density.scale().to_string()),
                size: None,
            })
            .collect();
        Self {
            images,
            info: CatalogInfo::default(),
        }
    }

    /// Document for a single-size app icon.
    #[must_use]
    pub fn for_icon(icon: &ResolvedIcon) -> Self {
        Self {
            images: vec![CatalogImage {
                filename: Some(icon.file_name()),
                idiom: "universal".to_string(),
                platform: Some("ios".to_string()),
                scale: None,
                size: Some("1024x1024".to_string()),
            }],
            info: CatalogInfo::default(),
        }
    }

    /// Pretty-printed JSON with a trailing newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut text = serde_json::to_string_pretty(self)?;
        text.push('\n');
        Ok(text)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::assets::variants::ResolvedVariant;
    use std::path::PathBuf;

    fn bitmap(present: [bool; 3]) -> ResolvedBitmap {
        ResolvedBitmap {
            name: "icon".to_string(),
            extension: ".png".to_string(),
            variants: Density::ALL
                .iter()
                .zip(present)
                .map(|(&density, present)| ResolvedVariant {
                    density,
                    path: PathBuf::from(format!("/p/icon{}.png", density.suffix())),
                    present,
                })
                .collect(),
        }
    }

    #[test]
    fn bitmap_with_only_2x_matches_base_only() {
        let only_2x = CatalogDocument::for_bitmap(&bitmap([true, true, false]));
        let base_only = CatalogDocument::for_bitmap(&bitmap([true, false, false]));
        assert_eq!(only_2x, base_only);
        assert_eq!(only_2x.images.len(), 3);
        assert_eq!(only_2x.images[0].filename.as_deref(), Some("icon.png"));
        assert!(only_2x.images[1].filename.is_none());
        assert!(only_2x.images[2].filename.is_none());
    }

    #[test]
    fn bitmap_document_json() {
        let doc = CatalogDocument::for_bitmap(&bitmap([true, false, false]));
        insta::assert_snapshot!(doc.to_json().unwrap(), @r#"
        {
          "images": [
            {
              "filename": "icon.png",
              "idiom": "universal",
              "scale": "1x"
            },
            {
              "idiom": "universal",
              "scale": "2x"
            },
            {
              "idiom": "universal",
              "scale": "3x"
            }
          ],
          "info": {
            "author": "expo",
            "version": 1
          }
        }
        "#);
    }

    #[test]
    fn full_bitmap_names_every_density() {
        let doc = CatalogDocument::for_bitmap(&bitmap([true, true, true]));
        let names: Vec<_> = doc.images.iter().filter_map(|i| i.filename.clone()).collect();
        assert_eq!(names, vec!["icon.png", "icon@2x.png", "icon@3x.png"]);
    }

    #[test]
    fn icon_document_json() {
        let doc = CatalogDocument::for_icon(&ResolvedIcon {
            name: "AppIcon".to_string(),
            path: PathBuf::from("/p/AppIcon.png"),
        });
        insta::assert_snapshot!(doc.to_json().unwrap(), @r#"
        {
          "images": [
            {
              "filename": "AppIcon.png",
              "idiom": "universal",
              "platform": "ios",
              "size": "1024x1024"
            }
          ],
          "info": {
            "author": "expo",
            "version": 1
          }
        }
        "#);
    }

    #[test]
    fn parsed_document_round_trips() {
        let doc = CatalogDocument::for_bitmap(&bitmap([true, false, false]));
        let parsed: CatalogDocument = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        assert_eq!(parsed, doc);
    }

    #[test]
    fn root_document_has_only_info() {
        let json = CatalogDocument::root().to_json().unwrap();
        assert!(!json.contains("images"));
        assert!(json.contains("\"author\": \"expo\""));
    }

    #[test]
    fn directory_names() {
        assert_eq!(CatalogKind::ImageSet.directory_name("logo"), "logo.imageset");
        assert_eq!(
            CatalogKind::AppIconSet.directory_name("AppIcon"),
            "AppIcon.appiconset"
        );
    }
}
