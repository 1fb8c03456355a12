//! Copied file resource.
use anyhow::{Context as _, Result};
use std::path::PathBuf;

use super::error::ResourceError;
use super::helpers::fs::{ensure_parent_dir, same_contents};
use super::{Applicable, Resource, ResourceChange, ResourceState};

/// A file copied verbatim from a source asset into a native project.
#[derive(Debug, Clone)]
pub struct CopiedFile {
    /// The user-provided asset.
    pub source: PathBuf,
    /// Where the copy lives inside the native project.
    pub target: PathBuf,
}

impl CopiedFile {
    /// Create a new copied file resource.
    #[must_use]
    pub const fn new(source: PathBuf, target: PathBuf) -> Self {
        Self { source, target }
    }
}

impl Applicable for CopiedFile {
    fn description(&self) -> String {
        format!("{} <- {}", self.target.display(), self.source.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        if !self.source.is_file() {
            return Err(ResourceError::NotFound {
                resource: self.source.display().to_string(),
            }
            .into());
        }
        ensure_parent_dir(&self.target)?;
        std::fs::copy(&self.source, &self.target).with_context(|| {
            format!(
                "copy {} to {}",
                self.source.display(),
                self.target.display()
            )
        })?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for CopiedFile {
    fn current_state(&self) -> Result<ResourceState> {
        if !self.source.is_file() {
            return Ok(ResourceState::Invalid {
                reason: format!("source does not exist: {}", self.source.display()),
            });
        }
        match self.target.symlink_metadata() {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ResourceState::Missing),
            Err(e) => Err(e).with_context(|| format!("stat {}", self.target.display())),
            Ok(meta) if meta.is_dir() => Ok(ResourceState::Invalid {
                reason: "target is a directory".to_string(),
            }),
            Ok(_) if same_contents(&self.source, &self.target)? => Ok(ResourceState::Correct),
            Ok(_) => Ok(ResourceState::Incorrect {
                current: "contents differ".to_string(),
            }),
        }
    }
}
