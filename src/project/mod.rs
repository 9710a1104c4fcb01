//! Project manifest document: a group tree, file references and targets.
//!
//! [`ProjectDocument`] is the document-object API the synchronizer works
//! against. [`format`] reads and writes its TOML form; [`tree`] renders the
//! group hierarchy for humans.

/// Arena-backed document and its structural operations.
pub mod document;

/// TOML serialization and atomic persistence.
pub mod format;

/// Stable object identifiers.
pub mod id;

/// Groups, file references and targets.
pub mod model;

/// ASCII rendering of the group tree.
pub mod tree;

pub use document::ProjectDocument;
pub use id::{ObjectId, ObjectKind};
pub use model::{CompileSourcesPhase, FileReference, Group, SourceTree, Target};

/// Manifest format version written by this build
pub const MANIFEST_FORMAT_VERSION: u32 = 1;
