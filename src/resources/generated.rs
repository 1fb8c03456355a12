//! Generated document resource (write-if-changed).
use anyhow::{Context as _, Result};
use std::path::PathBuf;

use super::helpers::fs::ensure_parent_dir;
use super::{Applicable, Resource, ResourceChange, ResourceState};

/// A file whose full contents are produced by the synchronizer.
///
/// The file is only rewritten when its bytes differ, so unchanged documents
/// keep their modification time across runs.
#[derive(Debug, Clone)]
pub struct GeneratedFile {
    /// Destination path.
    pub target: PathBuf,
    /// Exact bytes the file should hold.
    pub contents: Vec<u8>,
}

impl GeneratedFile {
    /// Create a generated file from text.
    #[must_use]
    pub fn new(target: PathBuf, contents: impl Into<String>) -> Self {
        Self {
            target,
            contents: contents.into().into_bytes(),
        }
    }
}

impl Applicable for GeneratedFile {
    fn description(&self) -> String {
        self.target.display().to_string()
    }

    fn apply(&self) -> Result<ResourceChange> {
        ensure_parent_dir(&self.target)?;
        std::fs::write(&self.target, &self.contents)
            .with_context(|| format!("write {}", self.target.display()))?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for GeneratedFile {
    fn current_state(&self) -> Result<ResourceState> {
        if self.target.is_dir() {
            return Ok(ResourceState::Invalid {
                reason: "target is a directory".to_string(),
            });
        }
        match std::fs::read(&self.target) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ResourceState::Missing),
            Err(e) => Err(e).with_context(|| format!("read {}", self.target.display())),
            Ok(bytes) if bytes == self.contents => Ok(ResourceState::Correct),
            Ok(bytes) => Ok(ResourceState::Incorrect {
                current: format!("{} bytes with different contents", bytes.len()),
            }),
        }
    }
}
