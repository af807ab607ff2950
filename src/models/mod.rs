//! Record model for evolving ideas.
//!
//! # Core Concepts
//!
//! - [`Version`]: One immutable snapshot of an idea. Written once when a
//!   revision is appended and never rewritten afterwards.
//! - [`Metadata`]: Per-idea index holding the root, the current head and the
//!   parent/child structure of every revision ([`Tree`]), plus small
//!   per-revision annotations ([`NodeData`]).
//!
//! Everything here is pure data. Encoding goes through YAML so idea folders
//! stay diffable and hand-editable; file I/O lives in [`crate::store`].

mod keys;
mod metadata;
mod version;

pub use metadata::*;
pub use version::*;

/// Revision number. Positive and unique within one idea.
pub type VersionNumber = u32;

/// Opaque strategy diagnostics attached to a revision.
pub type MethodMetadata = serde_json::Map<String, serde_json::Value>;
