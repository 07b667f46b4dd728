//! In-memory directory tree.
//!
//! Nodes live in an arena and refer to each other through [`NodeId`] handles: a node
//! owns the handles of its children and keeps the handle of its parent.

use std::fmt::{self, Write};

use super::dir_entry::DirectoryRecord;
use crate::traits::TreeDisplay;

/// Handle of a node in a [`DirectoryTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// A file or directory of the tree.
#[derive(Debug, Clone)]
pub struct DirectoryNode {
    record: Option<DirectoryRecord>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl DirectoryNode {
    /// Returns the record of the node; `None` for the root.
    pub fn record(&self) -> Option<&DirectoryRecord> {
        self.record.as_ref()
    }

    /// Returns the parent of the node; `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Returns the children of the node in on-disk order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Checks if the node is a directory. The root is one.
    pub fn is_directory(&self) -> bool {
        self.record.as_ref().is_none_or(DirectoryRecord::is_directory)
    }
}

/// Rooted tree of the decoded directories of a volume.
#[derive(Debug, Clone)]
pub struct DirectoryTree {
    nodes: Vec<DirectoryNode>,
}

impl Default for DirectoryTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectoryTree {
    /// Creates a tree holding only the root.
    pub fn new() -> Self {
        DirectoryTree {
            nodes: vec![DirectoryNode {
                record: None,
                parent: None,
                children: vec![],
            }],
        }
    }

    /// Returns the handle of the root.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Returns the node behind a handle.
    ///
    /// # Panics
    /// Panics if the handle comes from another tree.
    pub fn node(&self, id: NodeId) -> &DirectoryNode {
        &self.nodes[id.0]
    }

    /// Returns the record of a node; `None` for the root.
    pub fn record(&self, id: NodeId) -> Option<&DirectoryRecord> {
        self.node(id).record()
    }

    /// Returns the children of a node in on-disk order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).children()
    }

    /// Returns the parent of a node; `None` for the root.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent()
    }

    /// Finds the first child whose short or long name is exactly `name`.
    ///
    /// When several children match, the earliest in on-disk order wins, not the last
    /// one as in shells that keep overwriting their match while scanning.
    pub fn find_child(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&child| self.record(child).is_some_and(|record| record.matches(name)))
    }

    /// Returns the count of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the tree holds only the root.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Appends a record as the last child of `parent` and returns its handle.
    pub(crate) fn add_child(&mut self, parent: NodeId, record: DirectoryRecord) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(DirectoryNode {
            record: Some(record),
            parent: Some(parent),
            children: vec![],
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    fn write_node(&self, out: &mut String, id: NodeId, indent: usize) -> fmt::Result {
        for &child in self.children(id) {
            if let Some(record) = self.record(child) {
                writeln!(out, "{}{}", "  ".repeat(indent), record)?;
            }
            if self.node(child).is_directory() && !self.record(child).is_some_and(|r| r.is_dot()) {
                self.write_node(out, child, indent + 1)?;
            }
        }
        Ok(())
    }
}

impl TreeDisplay for DirectoryTree {
    fn display_tree(&self) -> Result<String, fmt::Error> {
        let mut out = String::from("/\n");
        self.write_node(&mut out, self.root(), 1)?;
        Ok(out)
    }
}
