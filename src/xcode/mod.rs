//! Xcode project manifest (`project.pbxproj`) support.
//!
//! [`parser`] and [`writer`] convert between text and the [`value`] model;
//! [`project::XcodeProject`] wraps the parsed graph and owns every mutation
//! that has to keep its cross-referencing indices consistent.
pub mod id;
pub mod parser;
pub mod project;
pub mod value;
pub mod writer;

pub use project::{
    BuildFileRecord, FileReferenceRecord, GroupChild, GroupKind, GroupNode, XcodeProject,
};
