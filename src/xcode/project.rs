//! In-memory project graph with integrity-preserving mutations.
//!
//! The manifest links a resource into the build through four separately
//! indexed record kinds: file references, build files, group children and
//! build-phase `files` lists. Callers never touch those indices directly;
//! every add or remove here updates all four together.
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ProjectError;

use super::id::generate_id;
use super::parser::parse;
use super::value::{Dict, Value, array_entry, get_str, get_str_array};
use super::writer::write;

/// Isa of a plain group.
const GROUP_ISA: &str = "PBXGroup";
/// Isa of a localized variant group.
const VARIANT_GROUP_ISA: &str = "PBXVariantGroup";

/// Which of the two group namespaces a group lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    /// `PBXGroup`
    Group,
    /// `PBXVariantGroup`
    VariantGroup,
}

impl GroupKind {
    fn from_isa(isa: &str) -> Option<Self> {
        match isa {
            GROUP_ISA => Some(Self::Group),
            VARIANT_GROUP_ISA => Some(Self::VariantGroup),
            _ => None,
        }
    }
}

/// A named node of the project navigator tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupNode {
    /// Record id.
    pub uuid: String,
    /// Namespace the group belongs to.
    pub kind: GroupKind,
    /// Display name, if set.
    pub name: Option<String>,
    /// On-disk path, if set.
    pub path: Option<String>,
    /// Child record ids in navigator order.
    pub children: Vec<String>,
}

impl GroupNode {
    /// Name shown in the navigator (`name`, falling back to `path`).
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.name.as_deref().or(self.path.as_deref())
    }
}

/// A file known to the project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReferenceRecord {
    /// Record id.
    pub uuid: String,
    /// Display name, if set.
    pub name: Option<String>,
    /// Path relative to `source_tree`.
    pub path: Option<String>,
    /// Anchor the path is relative to (usually `<group>`).
    pub source_tree: String,
}

impl FileReferenceRecord {
    /// Last path component of the reference.
    #[must_use]
    pub fn basename(&self) -> Option<&str> {
        self.path
            .as_deref()
            .or(self.name.as_deref())
            .map(|p| p.rsplit('/').next().unwrap_or(p))
    }
}

/// Link between a file reference and a build phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildFileRecord {
    /// Record id.
    pub uuid: String,
    /// Referenced file, if the build file points at one.
    pub file_ref: Option<String>,
    /// Id of the build phase listing this build file, if any.
    pub phase: Option<String>,
}

/// A child of a group, resolved to its typed record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupChild {
    /// Nested group.
    Group(GroupNode),
    /// File reference.
    File(FileReferenceRecord),
    /// Any other record kind, or an id with no record behind it.
    Other(String),
}

/// A loaded `project.pbxproj`.
#[derive(Debug, Clone)]
pub struct XcodeProject {
    path: PathBuf,
    name: String,
    root: Dict,
    objects: Dict,
}

impl XcodeProject {
    /// Read and parse `<project_root>/<name>.xcodeproj/project.pbxproj`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid manifest.
    pub fn load(project_root: &Path, name: &str) -> Result<Self, ProjectError> {
        let path = manifest_path(project_root, name);
        let text = fs::read_to_string(&path).map_err(|source| ProjectError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut project = Self::parse(name, &text)?;
        project.path = path;
        Ok(project)
    }

    /// Parse manifest text for the project called `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is malformed or a record is not a
    /// dictionary.
    pub fn parse(name: &str, text: &str) -> Result<Self, ProjectError> {
        let mut root = parse(text)?;
        let objects = match root.insert("objects".to_string(), Value::Dict(Dict::new())) {
            Some(Value::Dict(objects)) => objects,
            Some(Value::String(_) | Value::Array(_)) | None => Dict::new(),
        };
        for (uuid, record) in &objects {
            if record.as_dict().is_none() {
                return Err(ProjectError::InvalidRecord {
                    uuid: uuid.clone(),
                    reason: "not a dictionary".to_string(),
                });
            }
        }
        Ok(Self {
            path: PathBuf::new(),
            name: name.to_string(),
            root,
            objects,
        })
    }

    /// Project name (the `.xcodeproj` stem).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path of the manifest file this project was loaded from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Render the manifest text.
    #[must_use]
    pub fn to_pbxproj(&self) -> String {
        write(&self.root, &self.objects, &self.name)
    }

    /// Write the manifest back to where it was loaded from, only if its
    /// bytes changed. Returns `true` when the file was written.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self) -> Result<bool, ProjectError> {
        let text = self.to_pbxproj();
        if fs::read_to_string(&self.path).is_ok_and(|existing| existing == text) {
            return Ok(false);
        }
        fs::write(&self.path, text).map_err(|source| ProjectError::Io {
            path: self.path.display().to_string(),
            source,
        })?;
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Record access
    // ------------------------------------------------------------------

    fn record(&self, uuid: &str) -> Option<&Dict> {
        self.objects.get(uuid).and_then(Value::as_dict)
    }

    fn record_mut(&mut self, uuid: &str) -> Option<&mut Dict> {
        self.objects.get_mut(uuid).and_then(Value::as_dict_mut)
    }

    fn isa(&self, uuid: &str) -> Option<&str> {
        self.record(uuid).and_then(|r| get_str(r, "isa"))
    }

    fn ids_with_isa(&self, isa: &str) -> Vec<String> {
        self.objects
            .iter()
            .filter(|(_, v)| v.as_dict().and_then(|d| get_str(d, "isa")) == Some(isa))
            .map(|(k, _)| k.clone())
            .collect()
    }

    fn new_id(&self, seed: &str) -> String {
        generate_id(seed, |candidate| self.objects.contains_key(candidate))
    }

    /// Number of records in the graph.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Typed view of a group in either namespace.
    #[must_use]
    pub fn group(&self, uuid: &str) -> Option<GroupNode> {
        let record = self.record(uuid)?;
        let kind = GroupKind::from_isa(get_str(record, "isa")?)?;
        Some(GroupNode {
            uuid: uuid.to_string(),
            kind,
            name: get_str(record, "name").map(String::from),
            path: get_str(record, "path").map(String::from),
            children: get_str_array(record, "children"),
        })
    }

    /// Typed view of a file reference.
    #[must_use]
    pub fn file_reference(&self, uuid: &str) -> Option<FileReferenceRecord> {
        let record = self.record(uuid)?;
        if get_str(record, "isa")? != "PBXFileReference" {
            return None;
        }
        Some(FileReferenceRecord {
            uuid: uuid.to_string(),
            name: get_str(record, "name").map(String::from),
            path: get_str(record, "path").map(String::from),
            source_tree: get_str(record, "sourceTree")
                .unwrap_or("<group>")
                .to_string(),
        })
    }

    /// All build-file records, each with the phase that lists it.
    #[must_use]
    pub fn build_files(&self) -> Vec<BuildFileRecord> {
        let phases = self.build_phase_ids();
        self.ids_with_isa("PBXBuildFile")
            .into_iter()
            .map(|uuid| {
                let file_ref = self
                    .record(&uuid)
                    .and_then(|r| get_str(r, "fileRef"))
                    .map(String::from);
                let phase = phases
                    .iter()
                    .find(|p| self.phase_files(p).contains(&uuid))
                    .cloned();
                BuildFileRecord {
                    uuid,
                    file_ref,
                    phase,
                }
            })
            .collect()
    }

    /// Resolve every child of `group` to its typed record.
    #[must_use]
    pub fn group_children(&self, group: &GroupNode) -> Vec<GroupChild> {
        group
            .children
            .iter()
            .map(|id| {
                self.group(id)
                    .map(GroupChild::Group)
                    .or_else(|| self.file_reference(id).map(GroupChild::File))
                    .unwrap_or_else(|| GroupChild::Other(id.clone()))
            })
            .collect()
    }

    /// Groups in both namespaces whose label equals `name`, in id order.
    #[must_use]
    pub fn find_groups_by_name(&self, name: &str) -> Vec<GroupNode> {
        let mut found: Vec<GroupNode> = [GROUP_ISA, VARIANT_GROUP_ISA]
            .iter()
            .flat_map(|isa| self.ids_with_isa(isa))
            .filter_map(|id| self.group(&id))
            .filter(|g| g.label() == Some(name))
            .collect();
        found.sort_by(|a, b| a.uuid.cmp(&b.uuid));
        found
    }

    // ------------------------------------------------------------------
    // Project structure
    // ------------------------------------------------------------------

    fn root_object_id(&self) -> Result<String, ProjectError> {
        let id = get_str(&self.root, "rootObject").ok_or(ProjectError::MissingRootObject)?;
        if self.isa(id) != Some("PBXProject") {
            return Err(ProjectError::MissingRootObject);
        }
        Ok(id.to_string())
    }

    /// Id of the top-level navigator group.
    ///
    /// # Errors
    ///
    /// Returns an error if the project object or its main group is missing.
    pub fn main_group_id(&self) -> Result<String, ProjectError> {
        let project = self.root_object_id()?;
        let main = self
            .record(&project)
            .and_then(|r| get_str(r, "mainGroup"))
            .ok_or_else(|| ProjectError::InvalidRecord {
                uuid: project.clone(),
                reason: "no mainGroup".to_string(),
            })?;
        if self.group(main).is_none() {
            return Err(ProjectError::InvalidRecord {
                uuid: main.to_string(),
                reason: "main group is missing".to_string(),
            });
        }
        Ok(main.to_string())
    }

    /// Id of the application target: the first native target the project
    /// lists.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectError::NoNativeTarget`] if the project has none.
    pub fn first_native_target_id(&self) -> Result<String, ProjectError> {
        let project = self.root_object_id()?;
        let listed = self
            .record(&project)
            .map(|r| get_str_array(r, "targets"))
            .unwrap_or_default();
        listed
            .into_iter()
            .find(|t| self.isa(t) == Some("PBXNativeTarget"))
            .or_else(|| {
                let mut all = self.ids_with_isa("PBXNativeTarget");
                all.sort();
                all.into_iter().next()
            })
            .ok_or(ProjectError::NoNativeTarget)
    }

    fn build_phase_ids(&self) -> Vec<String> {
        self.objects
            .iter()
            .filter(|(_, v)| {
                v.as_dict()
                    .and_then(|d| get_str(d, "isa"))
                    .is_some_and(|isa| isa.ends_with("BuildPhase"))
            })
            .map(|(k, _)| k.clone())
            .collect()
    }

    fn phase_files(&self, phase: &str) -> Vec<String> {
        self.record(phase)
            .map(|r| get_str_array(r, "files"))
            .unwrap_or_default()
    }

    /// Id of the application target's resources build phase, created and
    /// attached to the target when it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the project has no native target.
    pub fn resources_build_phase_id(&mut self) -> Result<String, ProjectError> {
        let target = self.first_native_target_id()?;
        let phases = self
            .record(&target)
            .map(|r| get_str_array(r, "buildPhases"))
            .unwrap_or_default();
        if let Some(existing) = phases
            .into_iter()
            .find(|p| self.isa(p) == Some("PBXResourcesBuildPhase"))
        {
            return Ok(existing);
        }

        let id = self.new_id(&format!("PBXResourcesBuildPhase:{target}"));
        let mut phase = Dict::new();
        phase.insert("isa".to_string(), "PBXResourcesBuildPhase".into());
        phase.insert("buildActionMask".to_string(), "2147483647".into());
        phase.insert("files".to_string(), Value::Array(Vec::new()));
        phase.insert("runOnlyForDeploymentPostprocessing".to_string(), "0".into());
        self.objects.insert(id.clone(), Value::Dict(phase));
        if let Some(record) = self.record_mut(&target) {
            array_entry(record, "buildPhases").push(Value::from(id.as_str()));
        }
        Ok(id)
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    fn child_group_named(&self, parent: &GroupNode, segment: &str) -> Option<GroupNode> {
        parent
            .children
            .iter()
            .filter_map(|id| self.group(id))
            .find(|g| match g.name.as_deref() {
                Some(name) => name == segment,
                None => g.path.as_deref() == Some(segment),
            })
    }

    /// Walk a `/`-delimited group path from the main group without creating
    /// anything.
    fn lookup_group_path(&self, group_path: &str) -> Option<GroupNode> {
        let mut current = self.group(&self.main_group_id().ok()?)?;
        for segment in group_path.split('/').filter(|s| !s.is_empty()) {
            current = self.child_group_named(&current, segment)?;
        }
        Some(current)
    }

    /// Get or create the group at a `/`-delimited path below the main group.
    ///
    /// Each level is matched by name (or by path for unnamed groups) in
    /// either namespace, so repeated calls never create duplicate siblings.
    ///
    /// # Errors
    ///
    /// Returns an error if the project has no main group.
    pub fn ensure_group_recursively(
        &mut self,
        group_path: &str,
    ) -> Result<GroupNode, ProjectError> {
        let main = self.main_group_id()?;
        let mut current = self.group(&main).ok_or_else(|| ProjectError::InvalidRecord {
            uuid: main.clone(),
            reason: "main group is missing".to_string(),
        })?;
        let mut walked = String::new();
        for segment in group_path.split('/').filter(|s| !s.is_empty()) {
            if !walked.is_empty() {
                walked.push('/');
            }
            walked.push_str(segment);

            if let Some(existing) = self.child_group_named(&current, segment) {
                current = existing;
                continue;
            }

            let id = self.new_id(&format!("PBXGroup:{walked}"));
            let mut group = Dict::new();
            group.insert("isa".to_string(), GROUP_ISA.into());
            group.insert("children".to_string(), Value::Array(Vec::new()));
            group.insert("name".to_string(), segment.into());
            group.insert("sourceTree".to_string(), "<group>".into());
            self.objects.insert(id.clone(), Value::Dict(group));
            if let Some(parent) = self.record_mut(&current.uuid) {
                array_entry(parent, "children").push(Value::from(id.as_str()));
            }
            current = GroupNode {
                uuid: id,
                kind: GroupKind::Group,
                name: Some(segment.to_string()),
                path: None,
                children: Vec::new(),
            };
        }
        Ok(current)
    }

    /// Register `rel_path` (relative to the iOS project root) under the
    /// group at `group_path`, and, when `is_build_file`, in the application
    /// target's resources build phase.
    ///
    /// A file already present in the group by basename is reused, and a
    /// build file already linking it is not duplicated. Returns the file
    /// reference id.
    ///
    /// # Errors
    ///
    /// Returns an error if the project has no main group or native target.
    pub fn add_resource_file_to_group(
        &mut self,
        group_path: &str,
        rel_path: &str,
        is_build_file: bool,
    ) -> Result<String, ProjectError> {
        let group = self.ensure_group_recursively(group_path)?;
        let basename = rel_path.rsplit('/').next().unwrap_or(rel_path);

        let existing = group
            .children
            .iter()
            .filter_map(|id| self.file_reference(id))
            .find(|f| f.basename() == Some(basename))
            .map(|f| f.uuid);

        let file_ref = if let Some(id) = existing {
            id
        } else {
            let id = self.new_id(&format!("PBXFileReference:{rel_path}"));
            let mut record = Dict::new();
            record.insert("isa".to_string(), "PBXFileReference".into());
            record.insert(
                "lastKnownFileType".to_string(),
                last_known_file_type(rel_path).into(),
            );
            record.insert("name".to_string(), basename.into());
            record.insert("path".to_string(), rel_path.into());
            record.insert("sourceTree".to_string(), "<group>".into());
            self.objects.insert(id.clone(), Value::Dict(record));
            if let Some(parent) = self.record_mut(&group.uuid) {
                array_entry(parent, "children").push(Value::from(id.as_str()));
            }
            id
        };

        if is_build_file {
            let phase = self.resources_build_phase_id()?;
            let phase_files = self.phase_files(&phase);
            let already_built = phase_files.iter().any(|bf| {
                self.record(bf).and_then(|r| get_str(r, "fileRef")) == Some(file_ref.as_str())
            });
            if !already_built {
                let id = self.new_id(&format!("PBXBuildFile:{rel_path}"));
                let mut record = Dict::new();
                record.insert("isa".to_string(), "PBXBuildFile".into());
                record.insert("fileRef".to_string(), file_ref.as_str().into());
                self.objects.insert(id.clone(), Value::Dict(record));
                if let Some(phase_record) = self.record_mut(&phase) {
                    array_entry(phase_record, "files").push(Value::from(id.as_str()));
                }
            }
        }
        Ok(file_ref)
    }

    /// Unlink every child of the group at `group_path` from the graph.
    ///
    /// The group is found by walking the path from the main group, falling
    /// back to a name search over both group namespaces. For each file child
    /// the build files pointing at it, the file reference itself, the group
    /// membership and every build-phase entry are removed in that order.
    /// Nested groups are emptied the same way and then removed. Steps whose
    /// target is already gone are skipped. Returns the paths of the removed
    /// file references; an unknown group removes nothing.
    pub fn remove_stale_group_contents(&mut self, group_path: &str) -> Vec<String> {
        let leaf = group_path
            .rsplit('/')
            .find(|s| !s.is_empty())
            .unwrap_or(group_path);
        let Some(group) = self
            .lookup_group_path(group_path)
            .or_else(|| self.find_groups_by_name(leaf).into_iter().next())
        else {
            return Vec::new();
        };
        let mut removed = Vec::new();
        self.clear_group(&group, &mut removed);
        removed
    }

    fn clear_group(&mut self, group: &GroupNode, removed: &mut Vec<String>) {
        for child in self.group_children(group) {
            match child {
                GroupChild::Group(nested) => {
                    self.clear_group(&nested, removed);
                    self.objects.shift_remove(&nested.uuid);
                    self.remove_child(&group.uuid, &nested.uuid);
                }
                GroupChild::File(file) => {
                    self.unlink_file(&group.uuid, &file);
                    if let Some(path) = file.path.or(file.name) {
                        removed.push(path);
                    }
                }
                GroupChild::Other(id) => {
                    self.remove_child(&group.uuid, &id);
                }
            }
        }
    }

    fn unlink_file(&mut self, group: &str, file: &FileReferenceRecord) {
        let build_files: Vec<String> = self
            .ids_with_isa("PBXBuildFile")
            .into_iter()
            .filter(|id| {
                self.record(id).and_then(|r| get_str(r, "fileRef")) == Some(file.uuid.as_str())
            })
            .collect();
        for id in &build_files {
            self.objects.shift_remove(id);
        }
        self.objects.shift_remove(&file.uuid);
        self.remove_child(group, &file.uuid);
        for phase in self.build_phase_ids() {
            if let Some(record) = self.record_mut(&phase) {
                array_entry(record, "files").retain(|v| {
                    v.as_str()
                        .is_none_or(|id| !build_files.iter().any(|b| b == id))
                });
            }
        }
    }

    fn remove_child(&mut self, group: &str, child: &str) {
        if let Some(record) = self.record_mut(group) {
            array_entry(record, "children").retain(|v| v.as_str() != Some(child));
        }
    }

    /// Prune dangling references left behind by an interrupted run: build
    /// files whose file reference is gone, build-phase entries naming missing
    /// build files, and group children naming missing records. Returns the
    /// number of entries removed.
    pub fn repair(&mut self) -> usize {
        let mut pruned = 0;

        let dangling: Vec<String> = self
            .ids_with_isa("PBXBuildFile")
            .into_iter()
            .filter(|id| {
                self.record(id).is_some_and(|r| {
                    get_str(r, "productRef").is_none()
                        && get_str(r, "fileRef").is_none_or(|f| !self.objects.contains_key(f))
                })
            })
            .collect();
        for id in &dangling {
            self.objects.shift_remove(id);
            pruned += 1;
        }

        let containers: Vec<(String, &'static str)> = self
            .build_phase_ids()
            .into_iter()
            .map(|id| (id, "files"))
            .chain(
                [GROUP_ISA, VARIANT_GROUP_ISA]
                    .iter()
                    .flat_map(|isa| self.ids_with_isa(isa))
                    .map(|id| (id, "children")),
            )
            .collect();
        for (id, key) in containers {
            let live: Vec<String> = self
                .record(&id)
                .map(|r| get_str_array(r, key))
                .unwrap_or_default()
                .into_iter()
                .filter(|child| self.objects.contains_key(child))
                .collect();
            if let Some(record) = self.record_mut(&id) {
                if !record.contains_key(key) {
                    continue;
                }
                let entries = array_entry(record, key);
                let before = entries.len();
                entries.retain(|v| v.as_str().is_some_and(|s| live.iter().any(|l| l == s)));
                pruned += before - entries.len();
            }
        }
        pruned
    }
}

/// `<project_root>/<name>.xcodeproj/project.pbxproj`
#[must_use]
pub fn manifest_path(project_root: &Path, name: &str) -> PathBuf {
    project_root
        .join(format!("{name}.xcodeproj"))
        .join("project.pbxproj")
}

/// Xcode's `lastKnownFileType` for a resource path.
#[must_use]
pub fn last_known_file_type(path: &str) -> &'static str {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image.png",
        "jpg" | "jpeg" => "image.jpeg",
        "gif" => "image.gif",
        "xcassets" => "folder.assetcatalog",
        "json" => "text.json",
        "plist" => "text.plist.xml",
        "storyboard" => "file.storyboard",
        _ => "file",
    }
}
