//! Folder selection tree for the settings page
//!
//! A subset of the folder hierarchy can be excluded from scanning and
//! display. Checkbox semantics are hierarchical: excluding a node excludes
//! its whole subtree, and partially-excluded ancestors display as
//! indeterminate. The exclusion set itself is flat and never normalized in
//! storage; tri-state is always derived on read from set membership across
//! a node's subtree.

use crate::{CoreError, FolderSource};
use gallery_proto::FolderNode;
use std::collections::HashSet;

/// Derived display state of a node's checkbox
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    /// Zero paths of the subtree (including self) are excluded
    Checked,
    /// Every path of the subtree (including self) is excluded
    Unchecked,
    /// Some but not all are excluded
    Indeterminate,
}

/// All paths of a node's subtree, self first, pre-order
pub fn subtree_paths(node: &FolderNode) -> Vec<String> {
    let mut paths = vec![node.path.clone()];
    for child in &node.children {
        paths.extend(subtree_paths(child));
    }
    paths
}

/// Pure tri-state derivation over (node, exclusion set).
///
/// O(subtree size) per call; folder trees are small enough that this is
/// recomputed on read rather than cached per node.
pub fn check_state(node: &FolderNode, excluded: &HashSet<String>) -> CheckState {
    let paths = subtree_paths(node);
    let excluded_count = paths.iter().filter(|p| excluded.contains(*p)).count();

    if excluded_count == 0 {
        CheckState::Checked
    } else if excluded_count == paths.len() {
        CheckState::Unchecked
    } else {
        CheckState::Indeterminate
    }
}

/// Every childless path in the forest, pre-order left-to-right. Leaves are
/// the unit passed to a partial rescan request.
pub fn leaf_paths(nodes: &[FolderNode]) -> Vec<String> {
    let mut leaves = Vec::new();
    for node in nodes {
        collect_leaves(node, &mut leaves);
    }
    leaves
}

fn collect_leaves(node: &FolderNode, out: &mut Vec<String>) {
    if node.children.is_empty() {
        out.push(node.path.clone());
    } else {
        for child in &node.children {
            collect_leaves(child, out);
        }
    }
}

/// Working state of the folder selection UI: the loaded tree, the mutable
/// exclusion set, and a pending-save flag.
#[derive(Debug, Default)]
pub struct SelectionTree {
    folders: Vec<FolderNode>,
    excluded: HashSet<String>,
    dirty: bool,
}

impl SelectionTree {
    /// Load the tree for `root` and the persisted exclusion set in
    /// parallel, replacing any previous working state. Fails with
    /// `NotFound` when the root folder is invalid or unreachable.
    pub async fn load(
        source: &dyn FolderSource,
        root: &str,
        extensions: &str,
    ) -> Result<Self, CoreError> {
        let (folders, excluded) = tokio::try_join!(
            source.browse_folders(root, extensions),
            source.excluded_folders()
        )?;

        tracing::debug!(
            folders = folders.len(),
            excluded = excluded.len(),
            "selection tree loaded"
        );

        Ok(Self {
            folders,
            excluded: excluded.into_iter().collect(),
            dirty: false,
        })
    }

    /// Construct directly from parts (tests, restored sessions)
    pub fn from_parts(folders: Vec<FolderNode>, excluded: HashSet<String>) -> Self {
        Self {
            folders,
            excluded,
            dirty: false,
        }
    }

    pub fn folders(&self) -> &[FolderNode] {
        &self.folders
    }

    pub fn excluded(&self) -> &HashSet<String> {
        &self.excluded
    }

    /// True when the working set differs from what was last saved
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Tri-state of a node against the current working set
    pub fn state_of(&self, node: &FolderNode) -> CheckState {
        check_state(node, &self.excluded)
    }

    /// Toggle the node with the given path.
    ///
    /// If anything in the node's subtree is excluded this is an include
    /// action: the whole subtree is removed from the set, and so is the
    /// ancestor chain from the root down to the node — a stale "parent
    /// excluded" entry would otherwise re-imply exclusion on a top-down
    /// recompute. Otherwise it is an exclude action and the whole subtree
    /// is added; ancestors are left alone and become indeterminate through
    /// `check_state`.
    ///
    /// Returns false when the path is not in the tree.
    pub fn toggle(&mut self, path: &str) -> bool {
        let Some((node, ancestors)) = find_with_ancestors(&self.folders, path) else {
            return false;
        };
        let descendants = subtree_paths(node);

        let any_excluded = descendants.iter().any(|p| self.excluded.contains(p));
        if any_excluded {
            for p in &descendants {
                self.excluded.remove(p);
            }
            for p in &ancestors {
                self.excluded.remove(p);
            }
        } else {
            for p in descendants {
                self.excluded.insert(p);
            }
        }

        self.dirty = true;
        true
    }

    /// Include everything: empty exclusion set
    pub fn select_all(&mut self) {
        self.excluded.clear();
        self.dirty = true;
    }

    /// Exclude everything: the full path set of the tree
    pub fn deselect_all(&mut self) {
        self.excluded = self
            .folders
            .iter()
            .flat_map(|n| subtree_paths(n))
            .collect();
        self.dirty = true;
    }

    /// Persist the working set verbatim. On failure the working set is
    /// unchanged so the user can retry.
    pub async fn save(&mut self, source: &dyn FolderSource) -> Result<(), CoreError> {
        let excluded: Vec<String> = self.excluded.iter().cloned().collect();
        source.save_excluded_folders(excluded).await?;
        self.dirty = false;
        Ok(())
    }

    /// Leaf paths not currently excluded — the partial-rescan target list
    pub fn selected_leaves(&self) -> Vec<String> {
        leaf_paths(&self.folders)
            .into_iter()
            .filter(|p| !self.excluded.contains(p))
            .collect()
    }
}

/// Depth-first lookup of `path`, returning the node and the chain of
/// ancestor paths from the root down to (exclusive of) the node.
fn find_with_ancestors<'a>(
    nodes: &'a [FolderNode],
    path: &str,
) -> Option<(&'a FolderNode, Vec<String>)> {
    let mut chain = Vec::new();
    for node in nodes {
        if let Some(found) = find_inner(node, path, &mut chain) {
            return Some((found, chain));
        }
    }
    None
}

fn find_inner<'a>(
    node: &'a FolderNode,
    path: &str,
    chain: &mut Vec<String>,
) -> Option<&'a FolderNode> {
    if node.path == path {
        return Some(node);
    }
    chain.push(node.path.clone());
    for child in &node.children {
        if let Some(found) = find_inner(child, path, chain) {
            return Some(found);
        }
    }
    chain.pop();
    None
}
