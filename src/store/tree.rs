use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;

use super::files::{self, METADATA_FILE};
use crate::error::{IdeaError, Result};
use crate::models::*;
use crate::render::TreeWalk;

/// One idea's folder, loaded into memory.
///
/// The metadata file and the version files are kept consistent after every
/// append. Memory is only updated once both files are written, so a failed
/// write leaves the tree as it was.
#[derive(Debug, Clone)]
pub struct IdeaTree {
    dir: PathBuf,
    metadata: Metadata,
    versions: BTreeMap<VersionNumber, Version>,
}

impl IdeaTree {
    /// Load and validate an existing idea folder.
    ///
    /// Version files on disk that the tree does not reference are left over
    /// from an interrupted append. They are skipped, not treated as damage.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        let meta_path = dir.join(METADATA_FILE);
        if !meta_path.is_file() {
            return Err(IdeaError::corrupt(&dir, format!("missing {METADATA_FILE}")));
        }
        let metadata = files::read(&meta_path)
            .and_then(|text| Metadata::from_yaml(&text))
            .map_err(|e| IdeaError::corrupt(&meta_path, e.to_string()))?;
        metadata
            .tree
            .check_forest()
            .map_err(|reason| IdeaError::corrupt(&meta_path, reason))?;

        let on_disk = scan_version_files(&dir)?;
        let referenced = metadata.tree.referenced();

        let mut versions = BTreeMap::new();
        for number in &referenced {
            let path = on_disk.get(number).ok_or_else(|| {
                IdeaError::corrupt(&dir, format!("v{number} has no version file"))
            })?;
            let version = files::read(path)
                .and_then(|text| Version::from_yaml(&text))
                .map_err(|e| IdeaError::corrupt(path, e.to_string()))?;
            if version.version != *number {
                return Err(IdeaError::corrupt(
                    path,
                    format!("file holds version {}", version.version),
                ));
            }
            if version.parent_id != metadata.tree.parent_of(*number) {
                return Err(IdeaError::corrupt(
                    path,
                    "parent_id disagrees with the metadata tree",
                ));
            }
            versions.insert(*number, version);
        }

        for (number, path) in &on_disk {
            if !referenced.contains(number) {
                tracing::warn!(path = %path.display(), "skipping unregistered version file");
            }
        }

        tracing::debug!(idea = %metadata.id, versions = versions.len(), "loaded idea");
        Ok(Self {
            dir,
            metadata,
            versions,
        })
    }

    /// Write a brand-new idea: its root version first, then its metadata.
    pub(crate) fn create(dir: PathBuf, metadata: Metadata, root: Version) -> Result<Self> {
        let mut tree = Self {
            dir,
            metadata,
            versions: BTreeMap::new(),
        };
        tree.add_version(root)?;
        Ok(tree)
    }

    /// Append exactly where `parent_id` says. Used to seed the root revision.
    ///
    /// A version with no `parent_id` becomes the tree root, which is only
    /// allowed while the tree holds no versions; otherwise it is registered
    /// under its parent. Either way it becomes `current`.
    pub fn add_version(&mut self, version: Version) -> Result<&Version> {
        let number = version.version;
        if self.versions.contains_key(&number) {
            return Err(IdeaError::DuplicateVersion(number));
        }
        let mut metadata = self.metadata.clone();
        match version.parent_id {
            Some(parent) if !self.versions.contains_key(&parent) => {
                return Err(IdeaError::UnknownParent(parent));
            }
            Some(parent) => metadata.tree.children.entry(parent).or_default().push(number),
            None if !self.versions.is_empty() => {
                return Err(IdeaError::MalformedRecord(format!(
                    "v{number} has no parent but the idea already has root v{}",
                    self.metadata.tree.root
                )));
            }
            None => {
                metadata.tree.root = number;
                metadata.tree.children.entry(number).or_default();
            }
        }
        metadata.tree.current = number;
        metadata
            .tree
            .check_forest()
            .map_err(IdeaError::MalformedRecord)?;
        metadata
            .node_data
            .entry(number)
            .or_insert_with(|| NodeData::for_version(&version));
        self.commit(version, metadata)
    }

    /// Append a revision after the idea exists.
    ///
    /// Fails with [`IdeaError::DuplicateVersion`] before touching disk if the
    /// number is taken. Without an explicit parent the revision extends the
    /// current head, and the written record names that head as its parent.
    pub fn add_new_version(&mut self, mut version: Version) -> Result<&Version> {
        let number = version.version;
        if number == 0 {
            return Err(IdeaError::MalformedRecord(
                "version must be a positive integer".to_string(),
            ));
        }
        if version.id != self.metadata.id {
            return Err(IdeaError::MalformedRecord(format!(
                "version belongs to {}, not {}",
                version.id, self.metadata.id
            )));
        }
        if self.versions.contains_key(&number) {
            return Err(IdeaError::DuplicateVersion(number));
        }
        let parent = match version.parent_id {
            Some(parent) if !self.versions.contains_key(&parent) => {
                return Err(IdeaError::UnknownParent(parent));
            }
            Some(parent) => parent,
            None => self.metadata.tree.current,
        };
        version.parent_id = Some(parent);

        let mut metadata = self.metadata.clone();
        metadata.tree.children.entry(parent).or_default().push(number);
        metadata.tree.current = number;
        metadata
            .node_data
            .entry(number)
            .or_insert_with(|| NodeData::for_version(&version));

        tracing::info!(idea = %metadata.id, version = number, parent, "appending revision");
        self.commit(version, metadata)
    }

    /// Build the next revision from its parent and append it.
    pub fn revise(&mut self, input: CreateRevisionInput) -> Result<&Version> {
        let parent_number = input.parent_id.unwrap_or(self.metadata.tree.current);
        let parent = self
            .versions
            .get(&parent_number)
            .ok_or(IdeaError::UnknownParent(parent_number))?;

        let version = Version {
            id: self.metadata.id.clone(),
            version: self.next_version_number()?,
            title: parent.title.clone(),
            status: input.status.unwrap_or_else(|| parent.status.clone()),
            created_at: Utc::now(),
            author: input.author,
            parent_id: Some(parent_number),
            description: parent.description.clone(),
            context: parent.context.clone(),
            qna: input.qna,
            attachments: input.attachments,
            tags: input.tags,
            summary: input.summary,
            method: input.method,
            method_metadata: input.method_metadata,
        };
        self.add_new_version(version)
    }

    /// Lazy depth-first walk from the root, one line per revision.
    pub fn show_tree(&self) -> TreeWalk<'_> {
        TreeWalk::new(self)
    }

    fn commit(&mut self, version: Version, metadata: Metadata) -> Result<&Version> {
        let number = version.version;
        files::write_atomic(&self.dir.join(files::version_file_name(number)), &version.to_yaml()?)?;
        files::write_atomic(&self.dir.join(METADATA_FILE), &metadata.to_yaml()?)?;

        self.metadata = metadata;
        self.versions.insert(number, version);
        Ok(&self.versions[&number])
    }

    pub fn id(&self) -> &str {
        &self.metadata.id
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn versions(&self) -> &BTreeMap<VersionNumber, Version> {
        &self.versions
    }

    pub fn version(&self, number: VersionNumber) -> Option<&Version> {
        self.versions.get(&number)
    }

    pub fn root(&self) -> VersionNumber {
        self.metadata.tree.root
    }

    pub fn current(&self) -> VersionNumber {
        self.metadata.tree.current
    }

    pub fn children_of(&self, number: VersionNumber) -> &[VersionNumber] {
        self.metadata.tree.children_of(number)
    }

    /// One past the highest version in use.
    pub fn next_version_number(&self) -> Result<VersionNumber> {
        match self.versions.keys().next_back() {
            None => Ok(1),
            Some(highest) => highest.checked_add(1).ok_or_else(|| {
                IdeaError::MalformedRecord(format!("no version number follows v{highest}"))
            }),
        }
    }
}

fn scan_version_files(dir: &Path) -> Result<BTreeMap<VersionNumber, PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| IdeaError::io(dir, e))?;
    let mut found = BTreeMap::new();
    for entry in entries {
        let entry = entry.map_err(|e| IdeaError::io(dir, e))?;
        let name = entry.file_name();
        if let Some(number) = name.to_str().and_then(files::parse_version_file_name) {
            found.insert(number, entry.path());
        }
    }
    Ok(found)
}
