use super::format::{FileRecord, GroupRecord, ManifestRecord, TargetRecord};
use super::{FileReference, Group, MANIFEST_FORMAT_VERSION, ObjectId, ObjectKind, SourceTree, Target};
use crate::utils::paths::from_slash;
use anyhow::{Result, bail};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

/// In-memory project manifest.
///
/// Groups and file references live in an identifier-keyed arena; the tree
/// shape is carried by each group's `children` and `files` lists, and the
/// parent indices are rebuilt on load. Targets refer to file references by
/// identifier only.
#[derive(Debug, Clone)]
pub struct ProjectDocument {
    source_root: String,
    main_group: ObjectId,
    groups: BTreeMap<ObjectId, Group>,
    files: BTreeMap<ObjectId, FileReference>,
    targets: Vec<Target>,
    group_parent: HashMap<ObjectId, ObjectId>,
    file_parent: HashMap<ObjectId, ObjectId>,
}

impl ProjectDocument {
    /// Create an empty document with a virtual main group and no targets
    #[must_use]
    pub fn new(main_group_name: &str, source_root: &str) -> Self {
        let main = ObjectId::derive(ObjectKind::Group, None, main_group_name, 0);
        let mut groups = BTreeMap::new();
        groups.insert(
            main.clone(),
            Group::new(main.clone(), main_group_name.to_string(), None),
        );

        Self {
            source_root: source_root.to_string(),
            main_group: main,
            groups,
            files: BTreeMap::new(),
            targets: Vec::new(),
            group_parent: HashMap::new(),
            file_parent: HashMap::new(),
        }
    }

    /// Project source root, `/`-separated and relative to the manifest's directory
    #[must_use]
    pub fn source_root(&self) -> &str {
        &self.source_root
    }

    #[must_use]
    pub const fn main_group(&self) -> &ObjectId {
        &self.main_group
    }

    #[must_use]
    pub fn group(&self, id: &ObjectId) -> Option<&Group> {
        self.groups.get(id)
    }

    #[must_use]
    pub fn file(&self, id: &ObjectId) -> Option<&FileReference> {
        self.files.get(id)
    }

    /// Every group, in identifier order
    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    /// Every file reference, in identifier order
    pub fn file_references(&self) -> impl Iterator<Item = &FileReference> {
        self.files.values()
    }

    #[must_use]
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    #[must_use]
    pub fn target_index(&self, name: &str) -> Option<usize> {
        self.targets.iter().position(|t| t.name == name)
    }

    /// Declare a new target with an empty compile-sources phase
    ///
    /// # Errors
    ///
    /// Returns an error if a target with this name already exists.
    pub fn add_target(&mut self, name: &str) -> Result<usize> {
        if self.target_index(name).is_some() {
            bail!("Target '{name}' already exists");
        }
        self.targets.push(Target::new(name));
        Ok(self.targets.len() - 1)
    }

    /// Child group of `parent` with exactly this name
    #[must_use]
    pub fn child_group(&self, parent: &ObjectId, name: &str) -> Option<&ObjectId> {
        self.groups.get(parent)?.child(name)
    }

    /// Create a child group
    ///
    /// # Errors
    ///
    /// Returns an error if `parent` is unknown or already has a child group
    /// named `name`.
    pub fn new_group(&mut self, parent: &ObjectId, name: &str, path: Option<&str>) -> Result<ObjectId> {
        let Some(parent_group) = self.groups.get(parent) else {
            bail!("Unknown parent group {parent}");
        };
        if parent_group.child(name).is_some() {
            bail!("Group '{}' already has a child group named '{name}'", parent_group.name);
        }

        let id = self.fresh_id(ObjectKind::Group, parent, name);
        self.groups.insert(
            id.clone(),
            Group::new(id.clone(), name.to_string(), path.map(ToString::to_string)),
        );
        self.group_parent.insert(id.clone(), parent.clone());

        if let Some(parent_group) = self.groups.get_mut(parent) {
            parent_group.children.push(id.clone());
            parent_group.child_names.insert(name.to_string(), id.clone());
        }
        Ok(id)
    }

    /// Create a file reference under `parent`, anchored to the group
    ///
    /// # Errors
    ///
    /// Returns an error if `parent` is unknown.
    pub fn new_file(&mut self, parent: &ObjectId, path: &str) -> Result<ObjectId> {
        if !self.groups.contains_key(parent) {
            bail!("Unknown parent group {parent}");
        }

        let id = self.fresh_id(ObjectKind::File, parent, path);
        self.files.insert(
            id.clone(),
            FileReference {
                id: id.clone(),
                path: path.to_string(),
                source_tree: SourceTree::Group,
            },
        );
        self.file_parent.insert(id.clone(), parent.clone());

        if let Some(parent_group) = self.groups.get_mut(parent) {
            parent_group.files.push(id.clone());
        }
        Ok(id)
    }

    /// Remove a file reference from its group, the arena, and every target
    ///
    /// Returns `false` if no such reference exists.
    pub fn remove_file(&mut self, id: &ObjectId) -> bool {
        if self.files.remove(id).is_none() {
            return false;
        }

        if let Some(parent) = self.file_parent.remove(id)
            && let Some(group) = self.groups.get_mut(&parent)
        {
            group.files.retain(|file| file != id);
        }

        for target in &mut self.targets {
            target.compile_sources.remove(id);
        }
        true
    }

    /// Register a file reference in a target's compile-sources phase
    ///
    /// Returns `false` if it was already a member.
    ///
    /// # Errors
    ///
    /// Returns an error if the target index or the reference is unknown.
    pub fn add_to_compile_sources(&mut self, target: usize, id: &ObjectId) -> Result<bool> {
        if !self.files.contains_key(id) {
            bail!("Unknown file reference {id}");
        }
        let Some(target) = self.targets.get_mut(target) else {
            bail!("Unknown target index {target}");
        };
        Ok(target.compile_sources.add(id.clone()))
    }

    /// Group that owns a file reference
    #[must_use]
    pub fn file_parent(&self, id: &ObjectId) -> Option<&ObjectId> {
        self.file_parent.get(id)
    }

    /// Groups from the main group down to `id`, inclusive
    #[must_use]
    pub fn ancestors(&self, id: &ObjectId) -> Option<Vec<ObjectId>> {
        if !self.groups.contains_key(id) {
            return None;
        }

        let mut chain = vec![id.clone()];
        let mut current = id;
        while let Some(parent) = self.group_parent.get(current) {
            // A well-formed tree is never deeper than its group count
            if chain.len() > self.groups.len() {
                return None;
            }
            chain.push(parent.clone());
            current = parent;
        }

        chain.reverse();
        Some(chain)
    }

    /// Directory a group resolves to, relative to the source root
    #[must_use]
    pub fn resolve_group(&self, id: &ObjectId) -> Option<PathBuf> {
        let mut dir = PathBuf::new();
        for group_id in self.ancestors(id)? {
            let group = self.groups.get(&group_id)?;
            dir = anchor(&dir, group.path(), group.source_tree);
        }
        Some(dir)
    }

    /// Path a file reference resolves to, relative to the source root
    ///
    /// Absolute references resolve to absolute paths.
    #[must_use]
    pub fn resolve_file(&self, id: &ObjectId) -> Option<PathBuf> {
        let file = self.files.get(id)?;
        let dir = self.resolve_group(self.file_parent.get(id)?)?;
        Some(anchor(&dir, Some(&file.path), file.source_tree))
    }

    fn fresh_id(&self, kind: ObjectKind, parent: &ObjectId, name: &str) -> ObjectId {
        let mut salt = 0;
        loop {
            let id = ObjectId::derive(kind, Some(parent), name, salt);
            if !self.groups.contains_key(&id) && !self.files.contains_key(&id) {
                return id;
            }
            salt += 1;
        }
    }

    /// Build a document from its on-disk record, validating its structure
    ///
    /// # Errors
    ///
    /// Returns an error describing the first structural problem: unsupported
    /// version, undefined or multiply-owned objects, unreachable groups,
    /// duplicate sibling group names, or bad target membership.
    pub fn from_record(record: ManifestRecord) -> Result<Self> {
        if record.version == 0 || record.version > MANIFEST_FORMAT_VERSION {
            bail!(
                "unsupported format version {} (this srcsync reads version {MANIFEST_FORMAT_VERSION})",
                record.version
            );
        }
        if !record.groups.contains_key(&record.main_group) {
            bail!("main group {} is not defined", record.main_group);
        }

        let main_group = record.main_group;
        let files: BTreeMap<ObjectId, FileReference> = record
            .files
            .into_iter()
            .map(|(id, file)| {
                let reference = FileReference {
                    id: id.clone(),
                    path: file.path,
                    source_tree: file.source_tree,
                };
                (id, reference)
            })
            .collect();
        let mut groups: BTreeMap<ObjectId, Group> = record
            .groups
            .into_iter()
            .map(|(id, group)| {
                let mut node = Group::new(id.clone(), group.name, group.path);
                node.source_tree = group.source_tree;
                node.children = group.children;
                node.files = group.files;
                (id, node)
            })
            .collect();

        let mut group_parent = HashMap::new();
        let mut file_parent = HashMap::new();
        for group in groups.values() {
            for child in &group.children {
                if !groups.contains_key(child) {
                    bail!("group {} lists undefined child group {child}", group.id);
                }
                if *child == main_group {
                    bail!("main group is listed as a child of group {}", group.id);
                }
                if group_parent.insert(child.clone(), group.id.clone()).is_some() {
                    bail!("group {child} is owned more than once");
                }
            }
            for file in &group.files {
                if !files.contains_key(file) {
                    bail!("group {} lists undefined file reference {file}", group.id);
                }
                if file_parent.insert(file.clone(), group.id.clone()).is_some() {
                    bail!("file reference {file} is owned more than once");
                }
            }
        }

        if let Some(orphan) = groups
            .keys()
            .find(|id| **id != main_group && !group_parent.contains_key(*id))
        {
            bail!("group {orphan} has no parent group");
        }
        if let Some(orphan) = files.keys().find(|id| !file_parent.contains_key(*id)) {
            bail!("file reference {orphan} is not owned by any group");
        }
        if reachable_groups(&groups, &main_group) != groups.len() {
            bail!("group tree contains a cycle");
        }

        let name_index: Vec<(ObjectId, Vec<(String, ObjectId)>)> = groups
            .values()
            .map(|group| {
                let names = group
                    .children
                    .iter()
                    .filter_map(|child| groups.get(child).map(|c| (c.name.clone(), child.clone())))
                    .collect();
                (group.id.clone(), names)
            })
            .collect();
        for (id, names) in name_index {
            let Some(group) = groups.get_mut(&id) else {
                continue;
            };
            for (name, child) in names {
                if group.child_names.insert(name.clone(), child).is_some() {
                    bail!("group '{}' has more than one child group named '{name}'", group.name);
                }
            }
        }

        let mut targets = Vec::with_capacity(record.targets.len());
        let mut target_names = HashSet::new();
        for entry in record.targets {
            if !target_names.insert(entry.name.clone()) {
                bail!("target '{}' is declared more than once", entry.name);
            }
            let mut target = Target::new(entry.name);
            for id in entry.compile_sources {
                if !files.contains_key(&id) {
                    bail!("target '{}' compiles undefined file reference {id}", target.name);
                }
                if !target.compile_sources.add(id.clone()) {
                    bail!("target '{}' compiles {id} more than once", target.name);
                }
            }
            targets.push(target);
        }

        Ok(Self {
            source_root: record.source_root,
            main_group,
            groups,
            files,
            targets,
            group_parent,
            file_parent,
        })
    }

    /// On-disk record of this document
    #[must_use]
    pub fn to_record(&self) -> ManifestRecord {
        ManifestRecord {
            version: MANIFEST_FORMAT_VERSION,
            source_root: self.source_root.clone(),
            main_group: self.main_group.clone(),
            targets: self
                .targets
                .iter()
                .map(|target| TargetRecord {
                    name: target.name.clone(),
                    compile_sources: target.compile_sources.iter().cloned().collect(),
                })
                .collect(),
            groups: self
                .groups
                .values()
                .map(|group| {
                    let record = GroupRecord {
                        name: group.name.clone(),
                        path: group.path.clone(),
                        source_tree: group.source_tree,
                        children: group.children.clone(),
                        files: group.files.clone(),
                    };
                    (group.id.clone(), record)
                })
                .collect(),
            files: self
                .files
                .values()
                .map(|file| {
                    let record = FileRecord {
                        path: file.path.clone(),
                        source_tree: file.source_tree,
                    };
                    (file.id.clone(), record)
                })
                .collect(),
        }
    }
}

/// Apply an object's path to the directory of its parent
fn anchor(base: &Path, path: Option<&str>, source_tree: SourceTree) -> PathBuf {
    match (source_tree, path.filter(|p| !p.is_empty())) {
        (SourceTree::Group | SourceTree::Absolute, None) => base.to_path_buf(),
        (SourceTree::SourceRoot, None) => PathBuf::new(),
        (SourceTree::Group, Some(path)) => base.join(from_slash(path)),
        (SourceTree::SourceRoot | SourceTree::Absolute, Some(path)) => from_slash(path),
    }
}

/// Number of groups reachable from `root` through `children` lists
fn reachable_groups(groups: &BTreeMap<ObjectId, Group>, root: &ObjectId) -> usize {
    let mut seen = HashSet::new();
    let mut queue = VecDeque::from([root]);

    while let Some(id) = queue.pop_front() {
        if !seen.insert(id) {
            continue;
        }
        if let Some(group) = groups.get(id) {
            queue.extend(group.children.iter());
        }
    }
    seen.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::format::parse;

    fn build() -> Result<(ProjectDocument, ObjectId, ObjectId)> {
        let mut doc = ProjectDocument::new("App", "..");
        doc.add_target("App")?;
        doc.add_target("AppMac")?;
        let main = doc.main_group().clone();
        let engine = doc.new_group(&main, "engine", Some("engine"))?;
        let net = doc.new_group(&engine, "net", Some("net"))?;
        let socket = doc.new_file(&net, "socket.cpp")?;
        doc.add_to_compile_sources(0, &socket)?;
        doc.add_to_compile_sources(1, &socket)?;
        Ok((doc, net, socket))
    }

    #[test]
    fn test_resolve_nested_file() -> Result<()> {
        let (doc, net, socket) = build()?;

        assert_eq!(doc.resolve_group(&net), Some(PathBuf::from("engine/net")));
        assert_eq!(
            doc.resolve_file(&socket),
            Some(Path::new("engine").join("net").join("socket.cpp"))
        );
        assert_eq!(doc.ancestors(&net).map(|chain| chain.len()), Some(3));
        Ok(())
    }

    #[test]
    fn test_virtual_group_adds_no_segment() -> Result<()> {
        let mut doc = ProjectDocument::new("App", "..");
        let main = doc.main_group().clone();
        let sources = doc.new_group(&main, "Sources", None)?;
        let file = doc.new_file(&sources, "a.cpp")?;

        assert_eq!(doc.resolve_file(&file), Some(PathBuf::from("a.cpp")));
        Ok(())
    }

    #[test]
    fn test_source_root_anchor_resets_path() -> Result<()> {
        let (mut doc, net, _) = build()?;
        let file = doc.new_file(&net, "shared/config.h")?;
        if let Some(reference) = doc.files.get_mut(&file) {
            reference.source_tree = SourceTree::SourceRoot;
        }

        assert_eq!(doc.resolve_file(&file), Some(PathBuf::from("shared/config.h")));
        Ok(())
    }

    #[test]
    fn test_sibling_names_are_unique() -> Result<()> {
        let (mut doc, _, _) = build()?;
        let main = doc.main_group().clone();

        assert!(doc.new_group(&main, "engine", Some("engine")).is_err());
        assert!(doc.child_group(&main, "engine").is_some());
        Ok(())
    }

    #[test]
    fn test_remove_file_sweeps_targets() -> Result<()> {
        let (mut doc, net, socket) = build()?;

        assert!(doc.remove_file(&socket));
        assert!(!doc.remove_file(&socket));

        assert!(doc.file(&socket).is_none());
        assert!(doc.group(&net).is_some_and(|g| g.files().is_empty()));
        assert!(doc.targets().iter().all(|t| t.compile_sources().is_empty()));
        // Emptied groups stay
        assert!(doc.group(&net).is_some());
        Ok(())
    }

    #[test]
    fn test_compile_sources_reject_duplicates() -> Result<()> {
        let (mut doc, _, socket) = build()?;

        assert!(!doc.add_to_compile_sources(0, &socket)?);
        assert!(doc.add_to_compile_sources(7, &socket).is_err());
        Ok(())
    }

    #[test]
    fn test_record_round_trip_keeps_ids() -> Result<()> {
        let (doc, net, socket) = build()?;
        let restored = ProjectDocument::from_record(doc.to_record())?;

        assert_eq!(restored.resolve_group(&net), doc.resolve_group(&net));
        assert_eq!(restored.file_parent(&socket), Some(&net));
        assert_eq!(restored.child_group(doc.main_group(), "engine"), doc.child_group(doc.main_group(), "engine"));
        Ok(())
    }

    const HEADER: &str = r#"
version = 1
main_group = "000000000000000000000001"

[groups.000000000000000000000001]
name = "App"
"#;

    fn malformed(body: &str) -> String {
        let err = parse(&format!("{HEADER}{body}")).unwrap_err();
        format!("{err:#}")
    }

    #[test]
    fn test_rejects_undefined_child() {
        let reason = malformed("children = [\"000000000000000000000002\"]\n");
        assert!(reason.contains("undefined child group"), "{reason}");
    }

    #[test]
    fn test_rejects_orphaned_file() {
        let reason = malformed("\n[files.0000000000000000000000F1]\npath = \"a.cpp\"\n");
        assert!(reason.contains("not owned"), "{reason}");
    }

    #[test]
    fn test_rejects_duplicate_sibling_names() {
        let reason = malformed(
            r#"children = ["000000000000000000000002", "000000000000000000000003"]

[groups.000000000000000000000002]
name = "engine"

[groups.000000000000000000000003]
name = "engine"
"#,
        );
        assert!(reason.contains("more than one child group named 'engine'"), "{reason}");
    }

    #[test]
    fn test_rejects_cycle() {
        let reason = malformed(
            r#"
[groups.000000000000000000000002]
name = "a"
children = ["000000000000000000000003"]

[groups.000000000000000000000003]
name = "b"
children = ["000000000000000000000002"]
"#,
        );
        assert!(reason.contains("cycle"), "{reason}");
    }

    #[test]
    fn test_rejects_dangling_target_member() {
        let reason = malformed(
            "\n[[targets]]\nname = \"App\"\ncompile_sources = [\"0000000000000000000000F1\"]\n",
        );
        assert!(reason.contains("undefined file reference"), "{reason}");
    }

    #[test]
    fn test_rejects_newer_version() {
        let err = parse(&HEADER.replace("version = 1", "version = 2")).unwrap_err();
        assert!(err.to_string().contains("unsupported format version"));
    }
}
