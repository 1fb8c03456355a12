//! Resource resolution and the documents generated from resolved resources.
pub mod catalog;
pub mod fonts;
pub mod variants;

pub use catalog::{CatalogDocument, CatalogKind};
pub use variants::{
    Density, Resolved, ResolvedAssets, ResolvedBitmap, ResolvedFontFace, ResolvedFontFamily,
    ResolvedIcon, ResolvedVariant, SkippedDescriptor, resolve, resolve_all,
};
