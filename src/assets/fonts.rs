//! Font resource naming and the Android `font-family` document.
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};

use super::variants::{ResolvedFontFace, ResolvedFontFamily};

/// Android resource-auto namespace used by the `app:` attributes.
const APP_NAMESPACE: &str = "http://schemas.android.com/apk/res-auto";

/// Android-safe resource identifier for `name`.
///
/// Lowercases, maps every run of non-alphanumeric characters to a single
/// underscore, trims underscores from both ends and prefixes `res_` when
/// the result would start with a digit or be empty.
///
/// # Examples
///
/// ```
/// use native_assets_cli::assets::fonts::slug;
///
/// assert_eq!(slug("Open Sans"), "open_sans");
/// assert_eq!(slug("3D--Mono!"), "res_3d_mono");
/// ```
#[must_use]
pub fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_sep = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert_str(0, "res_");
        if out.len() == 4 {
            out.push_str("font");
        }
    }
    out
}

/// Resource name (without extension) of one face:
/// `slug(family)_weight_style`.
#[must_use]
pub fn face_resource_name(family: &str, face: &ResolvedFontFace) -> String {
    format!("{}_{}_{}", slug(family), face.weight, face.style)
}

/// File name of one face inside `res/font`, keeping the source extension
/// lowercased.
#[must_use]
pub fn face_file_name(family: &str, face: &ResolvedFontFace) -> String {
    let ext = face
        .path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    if ext.is_empty() {
        face_resource_name(family, face)
    } else {
        format!("{}.{ext}", face_resource_name(family, face))
    }
}

/// File name of the family document inside `res/font`.
#[must_use]
pub fn family_document_name(family: &str) -> String {
    format!("{}.xml", slug(family))
}

/// Render the `font-family` XML document listing every face.
#[must_use]
pub fn family_document(family: &ResolvedFontFamily) -> String {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);
    let _ = writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)));

    let mut root = BytesStart::new("font-family");
    root.push_attribute(("xmlns:app", APP_NAMESPACE));
    let _ = writer.write_event(Event::Start(root));

    for face in &family.faces {
        let weight = face.weight.to_string();
        let font = format!("@font/{}", face_resource_name(&family.family, face));
        let mut element = BytesStart::new("font");
        element.push_attribute(("app:fontStyle", face.style.as_str()));
        element.push_attribute(("app:fontWeight", weight.as_str()));
        element.push_attribute(("app:font", font.as_str()));
        let _ = writer.write_event(Event::Empty(element));
    }

    let _ = writer.write_event(Event::End(BytesEnd::new("font-family")));
    let mut text = String::from_utf8(writer.into_inner()).unwrap_or_default();
    text.push('\n');
    text
}
