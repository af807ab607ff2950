//! Durable storage for ideas: one folder per idea under a root path.

mod files;
mod tree;

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{IdeaError, Result};
use crate::models::*;

pub use files::{version_file_name, METADATA_FILE};
pub use tree::IdeaTree;

/// Maximum number of characters of the task kept as the idea title.
pub const TITLE_MAX_CHARS: usize = 50;

const ID_ATTEMPTS: usize = 8;

/// Directory of idea trees.
#[derive(Debug, Clone)]
pub struct IdeaRepository {
    root: PathBuf,
}

impl IdeaRepository {
    pub fn new(config: &Config) -> Result<Self> {
        Self::open(config.storage_path.clone())
    }

    /// Use `root` as the storage path, creating it if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| IdeaError::io(&root, e))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create a new idea with `input` as its root revision.
    pub fn add(&self, input: CreateIdeaInput) -> Result<IdeaTree> {
        let (idea_id, idea_dir) = self.allocate()?;
        let now = Utc::now();
        let author = input.author.unwrap_or_else(|| DEFAULT_AUTHOR.to_string());
        let title = Version::title_from_task(&input.task, TITLE_MAX_CHARS);

        let root = Version {
            id: idea_id.clone(),
            version: 1,
            title: title.clone(),
            status: STATUS_RAW.to_string(),
            created_at: now,
            author: author.clone(),
            parent_id: None,
            description: input.task.clone(),
            context: BTreeMap::from([
                ("role".to_string(), input.role),
                ("task".to_string(), input.task.clone()),
                ("notes".to_string(), String::new()),
            ]),
            qna: input.qna,
            attachments: Vec::new(),
            tags: Vec::new(),
            summary: input.summary,
            method: input.method,
            method_metadata: Some(input.method_metadata.unwrap_or_default()),
        };

        let metadata = Metadata {
            id: idea_id.clone(),
            title,
            created_by: author,
            created_at: now,
            tree: Tree::rooted_at(1),
            node_data: BTreeMap::from([(
                1,
                NodeData {
                    created_at: now,
                    note: input.task,
                    tags: Vec::new(),
                },
            )]),
        };

        match IdeaTree::create(idea_dir.clone(), metadata, root) {
            Ok(tree) => {
                tracing::info!(idea = %idea_id, "created idea");
                Ok(tree)
            }
            Err(e) => {
                if let Err(cleanup) = fs::remove_dir_all(&idea_dir) {
                    tracing::warn!(path = %idea_dir.display(), error = %cleanup, "could not remove partial idea");
                }
                Err(e)
            }
        }
    }

    /// Load an existing idea by identifier.
    pub fn load(&self, idea_id: &str) -> Result<IdeaTree> {
        let not_found = || IdeaError::IdeaNotFound(idea_id.to_string());
        if !is_plain_name(idea_id) {
            return Err(not_found());
        }
        let idea_dir = self.root.join(idea_id);
        if !idea_dir.is_dir() {
            return Err(not_found());
        }
        IdeaTree::open(idea_dir)
    }

    /// Identifiers of every idea under the root, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.root).map_err(|e| IdeaError::io(&self.root, e))?;
        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| IdeaError::io(&self.root, e))?;
            if !entry.path().is_dir() {
                continue;
            }
            if let Ok(name) = entry.file_name().into_string() {
                ids.push(name);
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Reserve a fresh folder. `create_dir` fails on an existing name, so a
    /// colliding identifier is detected rather than reused.
    fn allocate(&self) -> Result<(String, PathBuf)> {
        for _ in 0..ID_ATTEMPTS {
            let id = new_idea_id();
            let dir = self.root.join(&id);
            match fs::create_dir(&dir) {
                Ok(()) => return Ok((id, dir)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(IdeaError::io(dir, e)),
            }
        }
        Err(IdeaError::io(
            &self.root,
            std::io::Error::new(ErrorKind::AlreadyExists, "could not allocate an idea id"),
        ))
    }
}

/// `idea_` followed by 32 random bits in hex.
fn new_idea_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("idea_{}", &hex[..8])
}

fn is_plain_name(id: &str) -> bool {
    !id.is_empty() && id != "." && id != ".." && !id.contains(['/', '\\'])
}
