use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{keys, Version, VersionNumber};
use crate::error::Result;

/// Per-idea index describing the shape of the revision tree.
///
/// `tree` is the authoritative record of parent/child relationships; the
/// `parent_id` on each [`Version`] duplicates it and must agree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub id: String,
    pub title: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub tree: Tree,
    #[serde(default, with = "keys")]
    pub node_data: BTreeMap<VersionNumber, NodeData>,
}

/// Root, head and parent-to-children index of an idea.
///
/// Children lists are kept in append order, most recent last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    pub root: VersionNumber,
    /// The active branch tip. New revisions without an explicit parent go here.
    pub current: VersionNumber,
    #[serde(with = "keys")]
    pub children: BTreeMap<VersionNumber, Vec<VersionNumber>>,
}

/// Small annotation kept per revision in the metadata file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeData {
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NodeData {
    pub fn for_version(version: &Version) -> Self {
        Self {
            created_at: version.created_at,
            note: version.description.clone(),
            tags: version.tags.clone(),
        }
    }
}

impl Metadata {
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }
}

impl Tree {
    /// A tree holding only `root`.
    pub fn rooted_at(root: VersionNumber) -> Self {
        Self {
            root,
            current: root,
            children: BTreeMap::from([(root, Vec::new())]),
        }
    }

    pub fn children_of(&self, version: VersionNumber) -> &[VersionNumber] {
        self.children
            .get(&version)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The parent of `version`, if it is registered as anyone's child.
    pub fn parent_of(&self, version: VersionNumber) -> Option<VersionNumber> {
        self.children
            .iter()
            .find(|(_, kids)| kids.contains(&version))
            .map(|(parent, _)| *parent)
    }

    /// Every version number the tree mentions: root, current, keys and children.
    pub fn referenced(&self) -> BTreeSet<VersionNumber> {
        let mut out = BTreeSet::from([self.root, self.current]);
        for (parent, kids) in &self.children {
            out.insert(*parent);
            out.extend(kids.iter().copied());
        }
        out
    }

    /// Check that the index describes a single-rooted, acyclic, single-parent
    /// structure. Returns the reason on failure.
    pub fn check_forest(&self) -> Result<(), String> {
        let mut parent_count: BTreeMap<VersionNumber, usize> = BTreeMap::new();
        for kids in self.children.values() {
            for kid in kids {
                *parent_count.entry(*kid).or_default() += 1;
            }
        }

        if parent_count.contains_key(&self.root) {
            return Err(format!("root v{} is listed as a child", self.root));
        }
        if let Some((v, _)) = parent_count.iter().find(|(_, n)| **n > 1) {
            return Err(format!("v{v} is listed as a child more than once"));
        }

        let mut seen = BTreeSet::new();
        let mut stack = vec![self.root];
        while let Some(v) = stack.pop() {
            if !seen.insert(v) {
                return Err(format!("v{v} is reachable twice"));
            }
            stack.extend(self.children_of(v).iter().copied());
        }

        if let Some(v) = self.referenced().difference(&seen).next() {
            return Err(format!("v{v} is not reachable from root v{}", self.root));
        }
        Ok(())
    }
}
