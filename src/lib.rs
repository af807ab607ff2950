//! Versioned storage for ideas that grow as a branching tree of revisions.
//!
//! An [`IdeaRepository`] owns a root folder with one sub-folder per idea.
//! Each idea is an [`IdeaTree`]: a `metadata.yaml` index plus one
//! `v<N>.yaml` record per revision.

pub mod config;
pub mod error;
pub mod models;
pub mod render;
pub mod store;

pub use config::Config;
pub use error::{IdeaError, Result};
pub use store::{IdeaRepository, IdeaTree};
