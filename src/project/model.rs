use super::ObjectId;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// How an object's `path` is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SourceTree {
    /// Relative to the parent group's resolved directory
    #[default]
    Group,
    /// Relative to the project's source root
    SourceRoot,
    /// An absolute filesystem path
    Absolute,
}

impl SourceTree {
    #[must_use]
    pub fn is_group(&self) -> bool {
        *self == Self::Group
    }
}

/// A named node of the group tree.
#[derive(Debug, Clone)]
pub struct Group {
    pub(crate) id: ObjectId,
    pub(crate) name: String,
    pub(crate) path: Option<String>,
    pub(crate) source_tree: SourceTree,
    pub(crate) children: Vec<ObjectId>,
    pub(crate) files: Vec<ObjectId>,
    pub(crate) child_names: HashMap<String, ObjectId>,
}

impl Group {
    pub(crate) fn new(id: ObjectId, name: String, path: Option<String>) -> Self {
        Self {
            id,
            name,
            path,
            source_tree: SourceTree::Group,
            children: Vec::new(),
            files: Vec::new(),
            child_names: HashMap::new(),
        }
    }

    #[must_use]
    pub const fn id(&self) -> &ObjectId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// On-disk path segment; `None` for a virtual group
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    #[must_use]
    pub const fn source_tree(&self) -> SourceTree {
        self.source_tree
    }

    /// A virtual group adds nothing to its descendants' paths
    #[must_use]
    pub fn is_virtual(&self) -> bool {
        self.path.as_deref().is_none_or(str::is_empty)
    }

    /// Child groups in insertion order
    #[must_use]
    pub fn children(&self) -> &[ObjectId] {
        &self.children
    }

    /// Directly contained file references in insertion order
    #[must_use]
    pub fn files(&self) -> &[ObjectId] {
        &self.files
    }

    /// Child group with exactly this name
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&ObjectId> {
        self.child_names.get(name)
    }
}

/// A leaf of the group tree pointing at one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReference {
    pub(crate) id: ObjectId,
    pub(crate) path: String,
    pub(crate) source_tree: SourceTree,
}

impl FileReference {
    #[must_use]
    pub const fn id(&self) -> &ObjectId {
        &self.id
    }

    /// `/`-separated path, anchored according to [`source_tree`](Self::source_tree)
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub const fn source_tree(&self) -> SourceTree {
        self.source_tree
    }
}

/// Ordered, duplicate-free list of file references compiled for a target.
#[derive(Debug, Clone, Default)]
pub struct CompileSourcesPhase {
    files: Vec<ObjectId>,
    members: HashSet<ObjectId>,
}

impl CompileSourcesPhase {
    /// Append a reference; returns `false` if it was already a member
    pub fn add(&mut self, id: ObjectId) -> bool {
        if !self.members.insert(id.clone()) {
            return false;
        }
        self.files.push(id);
        true
    }

    /// Drop a reference; returns `false` if it was not a member
    pub fn remove(&mut self, id: &ObjectId) -> bool {
        if !self.members.remove(id) {
            return false;
        }
        self.files.retain(|member| member != id);
        true
    }

    #[must_use]
    pub fn contains(&self, id: &ObjectId) -> bool {
        self.members.contains(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObjectId> {
        self.files.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// A build target and its compile-sources phase.
#[derive(Debug, Clone)]
pub struct Target {
    pub(crate) name: String,
    pub(crate) compile_sources: CompileSourcesPhase,
}

impl Target {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            compile_sources: CompileSourcesPhase::default(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn compile_sources(&self) -> &CompileSourcesPhase {
        &self.compile_sources
    }
}
