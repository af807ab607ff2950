use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{MethodMetadata, VersionNumber};
use crate::error::{IdeaError, Result};

/// Status given to the first revision of every idea.
pub const STATUS_RAW: &str = "raw";

/// One snapshot of an idea at a point in its evolution.
///
/// All versions of the same idea share `id`; `version` is unique within the
/// idea. `parent_id` names the revision this one extends and is absent only
/// for the root. Once written, a version is never rewritten by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Version {
    pub id: String,
    pub version: VersionNumber,
    pub title: String,
    /// Open-ended label such as `raw`. See [`STATUS_RAW`].
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub author: String,
    pub parent_id: Option<VersionNumber>,
    #[serde(default)]
    pub description: String,
    /// Auxiliary fields: `role`, `task`, `notes`.
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Question/answer transcript. Order is preserved.
    #[serde(default)]
    pub qna: Vec<QaPair>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub summary: String,
    /// Name of the brainstorming strategy that produced this revision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method_metadata: Option<MethodMetadata>,
}

/// A question asked about the idea and the answer it got.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

impl QaPair {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Reference to an external file. The store never touches the file itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub path: String,
    pub description: String,
}

/// Input for starting a new idea. Becomes version 1.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateIdeaInput {
    /// Who the assistant acted as while interviewing the user.
    pub role: String,
    /// What the user is working on. Also the source of the title.
    pub task: String,
    pub qna: Vec<QaPair>,
    pub summary: String,
    /// Falls back to [`DEFAULT_AUTHOR`] when absent.
    pub author: Option<String>,
    pub method: Option<String>,
    pub method_metadata: Option<MethodMetadata>,
}

/// Author recorded when the caller does not name one.
pub const DEFAULT_AUTHOR: &str = "anonymous";

/// Input for appending a revision to an existing idea.
///
/// The new revision inherits title, description and context from its parent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateRevisionInput {
    /// Revision to extend. `None` extends the current head.
    pub parent_id: Option<VersionNumber>,
    pub author: String,
    /// Defaults to the parent's status.
    pub status: Option<String>,
    pub qna: Vec<QaPair>,
    pub summary: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    pub method: Option<String>,
    pub method_metadata: Option<MethodMetadata>,
}

impl Version {
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Decode a version record, rejecting shapes the store cannot index.
    pub fn from_yaml(text: &str) -> Result<Self> {
        let version: Version = serde_yaml::from_str(text)?;
        version.check()?;
        Ok(version)
    }

    fn check(&self) -> Result<()> {
        if self.version == 0 {
            return Err(IdeaError::MalformedRecord(
                "version must be a positive integer".to_string(),
            ));
        }
        if self.parent_id == Some(self.version) {
            return Err(IdeaError::MalformedRecord(format!(
                "version {} names itself as parent",
                self.version
            )));
        }
        Ok(())
    }

    /// `task` truncated to at most `max_chars` characters.
    pub fn title_from_task(task: &str, max_chars: usize) -> String {
        task.chars().take(max_chars).collect()
    }
}
