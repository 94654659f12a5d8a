// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Arena-allocated syntax tree with a side table of node attributes.
//!
//! # Ownership
//!
//! The [`Tree`] owns every node in a flat arena. Nodes reference children by
//! [`NodeId`]; the reverse direction (parent, enclosing declarations) lives in
//! [`Attributes`], a side table indexed by the same id. There are no
//! ownership cycles and contextual lookups are O(1).
//!
//! # Slots
//!
//! A [`Slot`] names the place a child occupies in its parent: a field and a
//! position within it (always `0` for single-child fields). The driver
//! mutates the tree exclusively through [`Tree::replace_at`],
//! [`Tree::remove_at`] and [`Tree::insert_stmt`], each of which keeps the
//! attribute table consistent for every node it touches.
//!
//! # Attribute invariants
//!
//! - After [`Tree::link`], every node reachable from the root has its parent,
//!   slot and enclosing declarations set.
//! - A freshly allocated node has an empty attribute row until it is spliced
//!   into the tree. Replacing a node never copies the replaced node's row.
//! - A detached node (replaced or removed) has no parent and no slot.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use d8rector_core::error::{RectorError, RectorResult};

use crate::nodes::{Callee, MethodName, Node, NodeId, NodeKind, StmtList};

// ============================================================================
// Slots
// ============================================================================

/// A child-bearing field of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    Stmts,
    Expr,
    Callee,
    Var,
    Name,
    Args,
    Items,
    Key,
    Value,
}

/// The place a child occupies inside its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slot {
    pub parent: NodeId,
    pub field: Field,
    pub position: usize,
}

impl Slot {
    pub fn new(parent: NodeId, field: Field, position: usize) -> Self {
        Slot {
            parent,
            field,
            position,
        }
    }

    /// Position `position` of a statement sequence.
    pub fn stmt(parent: NodeId, position: usize) -> Self {
        Slot::new(parent, Field::Stmts, position)
    }
}

/// Child-bearing fields of a node, in source order.
fn fields_of(node: &Node) -> &'static [Field] {
    match node {
        Node::File { .. }
        | Node::Namespace { .. }
        | Node::Function { .. }
        | Node::Class { .. }
        | Node::Trait { .. }
        | Node::ClassMethod { .. } => &[Field::Stmts],
        Node::Expression { .. } | Node::Return { .. } => &[Field::Expr],
        Node::FuncCall { .. } => &[Field::Callee, Field::Args],
        Node::MethodCall { .. } => &[Field::Var, Field::Name, Field::Args],
        Node::StaticCall { .. } | Node::New { .. } => &[Field::Args],
        Node::Assign { .. } => &[Field::Var, Field::Expr],
        Node::PropertyFetch { .. } => &[Field::Var],
        Node::Array { .. } => &[Field::Items],
        Node::ArrayItem { .. } => &[Field::Key, Field::Value],
        Node::Arg { .. } => &[Field::Value],
        Node::Use { .. }
        | Node::TraitUse { .. }
        | Node::Property { .. }
        | Node::Nop
        | Node::Variable { .. }
        | Node::ConstFetch { .. }
        | Node::Str { .. }
        | Node::Int { .. } => &[],
    }
}

/// Child at a non-statement field position.
fn cell(node: &Node, field: Field, position: usize) -> Option<NodeId> {
    match (node, field) {
        (Node::Expression { expr }, Field::Expr) if position == 0 => Some(*expr),
        (Node::Return { expr }, Field::Expr) if position == 0 => *expr,
        (Node::Assign { expr, .. }, Field::Expr) if position == 0 => Some(*expr),
        (Node::Assign { var, .. }, Field::Var)
        | (Node::MethodCall { var, .. }, Field::Var)
        | (Node::PropertyFetch { var, .. }, Field::Var)
            if position == 0 =>
        {
            Some(*var)
        }
        (
            Node::FuncCall {
                callee: Callee::Dynamic(id),
                ..
            },
            Field::Callee,
        ) if position == 0 => Some(*id),
        (
            Node::MethodCall {
                name: MethodName::Dynamic(id),
                ..
            },
            Field::Name,
        ) if position == 0 => Some(*id),
        (Node::FuncCall { args, .. }, Field::Args)
        | (Node::MethodCall { args, .. }, Field::Args)
        | (Node::StaticCall { args, .. }, Field::Args)
        | (Node::New { args, .. }, Field::Args) => args.get(position).copied(),
        (Node::Array { items }, Field::Items) => items.get(position).copied(),
        (Node::ArrayItem { key, .. }, Field::Key) if position == 0 => *key,
        (Node::ArrayItem { value, .. }, Field::Value) | (Node::Arg { value, .. }, Field::Value)
            if position == 0 =>
        {
            Some(*value)
        }
        _ => None,
    }
}

/// Mutable access to a present, non-statement child.
fn cell_mut(node: &mut Node, field: Field, position: usize) -> Option<&mut NodeId> {
    match (node, field) {
        (Node::Expression { expr }, Field::Expr) if position == 0 => Some(expr),
        (Node::Return { expr }, Field::Expr) if position == 0 => expr.as_mut(),
        (Node::Assign { expr, .. }, Field::Expr) if position == 0 => Some(expr),
        (Node::Assign { var, .. }, Field::Var)
        | (Node::MethodCall { var, .. }, Field::Var)
        | (Node::PropertyFetch { var, .. }, Field::Var)
            if position == 0 =>
        {
            Some(var)
        }
        (
            Node::FuncCall {
                callee: Callee::Dynamic(id),
                ..
            },
            Field::Callee,
        ) if position == 0 => Some(id),
        (
            Node::MethodCall {
                name: MethodName::Dynamic(id),
                ..
            },
            Field::Name,
        ) if position == 0 => Some(id),
        (Node::FuncCall { args, .. }, Field::Args)
        | (Node::MethodCall { args, .. }, Field::Args)
        | (Node::StaticCall { args, .. }, Field::Args)
        | (Node::New { args, .. }, Field::Args) => args.get_mut(position),
        (Node::Array { items }, Field::Items) => items.get_mut(position),
        (Node::ArrayItem { key, .. }, Field::Key) if position == 0 => key.as_mut(),
        (Node::ArrayItem { value, .. }, Field::Value) | (Node::Arg { value, .. }, Field::Value)
            if position == 0 =>
        {
            Some(value)
        }
        _ => None,
    }
}

/// Number of positions in a field, holes included.
fn field_len_of(node: &Node, field: Field) -> usize {
    match (node, field) {
        (_, Field::Stmts) => node.stmts().map(|s| s.slot_count()).unwrap_or(0),
        (Node::FuncCall { args, .. }, Field::Args)
        | (Node::MethodCall { args, .. }, Field::Args)
        | (Node::StaticCall { args, .. }, Field::Args)
        | (Node::New { args, .. }, Field::Args) => args.len(),
        (Node::Array { items }, Field::Items) => items.len(),
        _ => usize::from(cell(node, field, 0).is_some()),
    }
}

// ============================================================================
// Attributes
// ============================================================================

/// Contextual information about a node, kept outside the node itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    pub parent: Option<NodeId>,
    pub slot: Option<Slot>,
    pub enclosing_namespace: Option<NodeId>,
    /// Nearest enclosing class or trait declaration.
    pub enclosing_class: Option<NodeId>,
    /// Nearest enclosing function or method.
    pub enclosing_function: Option<NodeId>,
    /// Free-form markers rules can use to communicate across passes.
    pub markers: BTreeSet<String>,
}

impl Attributes {
    fn clear_links(&mut self) {
        self.parent = None;
        self.slot = None;
        self.enclosing_namespace = None;
        self.enclosing_class = None;
        self.enclosing_function = None;
    }
}

// ============================================================================
// Tree
// ============================================================================

/// Serialized form of a tree: the arena and the root.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TreeRepr {
    root: NodeId,
    nodes: Vec<Node>,
}

/// A syntax tree for one source unit.
///
/// Serialization writes the whole arena, detached nodes included, so node
/// ids stay stable across a save and load. Use [`Tree::pruned`] before
/// saving a rewritten tree to drop the nodes rewrites left behind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "TreeRepr", into = "TreeRepr")]
pub struct Tree {
    nodes: Vec<Node>,
    attrs: Vec<Attributes>,
    root: NodeId,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Tree> for TreeRepr {
    fn from(tree: Tree) -> Self {
        TreeRepr {
            root: tree.root,
            nodes: tree.nodes,
        }
    }
}

impl TryFrom<TreeRepr> for Tree {
    type Error = String;

    fn try_from(repr: TreeRepr) -> Result<Self, Self::Error> {
        let len = repr.nodes.len();
        if repr.root.index() >= len {
            return Err(format!("root {} is outside the arena of {} nodes", repr.root, len));
        }
        for (index, node) in repr.nodes.iter().enumerate() {
            if let Some(child) = child_ids(node).into_iter().find(|c| c.index() >= len) {
                return Err(format!("node_{} references missing {}", index, child));
            }
        }
        // Detached nodes may still name children that were moved into a
        // replacement; only the reachable tree must be a proper tree.
        let mut seen = HashSet::from([repr.root]);
        let mut stack = vec![repr.root];
        while let Some(current) = stack.pop() {
            for child in child_ids(&repr.nodes[current.index()]) {
                if !seen.insert(child) {
                    return Err(format!("{} has more than one parent", child));
                }
                stack.push(child);
            }
        }
        let mut tree = Tree {
            attrs: vec![Attributes::default(); len],
            nodes: repr.nodes,
            root: repr.root,
        };
        tree.link();
        Ok(tree)
    }
}

/// Every child id of a node, in no particular order.
fn child_ids(node: &Node) -> Vec<NodeId> {
    let mut ids: Vec<NodeId> = node.stmts().map(|s| s.iter().collect()).unwrap_or_default();
    for field in fields_of(node) {
        if *field == Field::Stmts {
            continue;
        }
        for position in 0..field_len_of(node, *field) {
            ids.extend(cell(node, *field, position));
        }
    }
    ids
}

impl Tree {
    /// Create a tree holding an empty [`Node::File`] root.
    pub fn new() -> Self {
        let mut tree = Tree {
            nodes: Vec::new(),
            attrs: Vec::new(),
            root: NodeId(0),
        };
        tree.root = tree.alloc(Node::File {
            stmts: Default::default(),
        });
        tree
    }

    /// Decode a tree from JSON and populate its attributes.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Encode the tree as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    // ------------------------------------------------------------------------
    // Arena access
    // ------------------------------------------------------------------------

    /// Allocate a detached node.
    pub fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        self.attrs.push(Attributes::default());
        id
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Make `id` the root and relink the whole tree.
    pub fn set_root(&mut self, id: NodeId) {
        self.root = id;
        self.link();
    }

    /// Number of nodes ever allocated, detached ones included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// The node with this id.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not allocated by this tree.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Mutable access to a node.
    ///
    /// Changing child ids through this reference bypasses attribute
    /// maintenance; use the slot primitives for structural edits.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not allocated by this tree.
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.node(id).kind()
    }

    fn check(&self, id: NodeId) -> RectorResult<()> {
        if id.index() < self.nodes.len() {
            Ok(())
        } else {
            Err(RectorError::UnknownNode { node: id.0 })
        }
    }

    // ------------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------------

    pub fn attrs(&self, id: NodeId) -> &Attributes {
        &self.attrs[id.index()]
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.attrs(id).parent
    }

    pub fn slot_of(&self, id: NodeId) -> Option<Slot> {
        self.attrs(id).slot
    }

    pub fn enclosing_class(&self, id: NodeId) -> Option<NodeId> {
        self.attrs(id).enclosing_class
    }

    pub fn enclosing_function(&self, id: NodeId) -> Option<NodeId> {
        self.attrs(id).enclosing_function
    }

    pub fn enclosing_namespace(&self, id: NodeId) -> Option<NodeId> {
        self.attrs(id).enclosing_namespace
    }

    pub fn add_marker(&mut self, id: NodeId, marker: impl Into<String>) {
        self.attrs[id.index()].markers.insert(marker.into());
    }

    pub fn has_marker(&self, id: NodeId, marker: &str) -> bool {
        self.attrs(id).markers.contains(marker)
    }

    /// Returns true if the node is reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        id == self.root || self.attrs(id).parent.is_some()
    }

    /// Returns true if `ancestor` is a proper ancestor of `id`.
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = self.parent(id);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.parent(parent);
        }
        false
    }

    // ------------------------------------------------------------------------
    // Children
    // ------------------------------------------------------------------------

    /// Child-bearing fields of a node, in source order.
    pub fn fields(&self, id: NodeId) -> &'static [Field] {
        fields_of(self.node(id))
    }

    /// Number of positions in a field, holes included.
    pub fn field_len(&self, id: NodeId, field: Field) -> usize {
        field_len_of(self.node(id), field)
    }

    /// The child at a slot; `None` for a hole or an absent optional child.
    pub fn child_at(&self, slot: Slot) -> Option<NodeId> {
        let node = self.get(slot.parent)?;
        match slot.field {
            Field::Stmts => node.stmts()?.get(slot.position),
            field => cell(node, field, slot.position),
        }
    }

    /// Live children in source order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        for field in self.fields(id) {
            for position in 0..self.field_len(id, *field) {
                out.extend(self.child_at(Slot::new(id, *field, position)));
            }
        }
        out
    }

    /// The subtree rooted at `id` in pre-order.
    pub fn preorder(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            let mut children = self.children(current);
            children.reverse();
            stack.extend(children);
        }
        out
    }

    /// Live statements of a block-bearing node.
    pub fn stmts(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id)
            .stmts()
            .map(|s| s.iter().collect())
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------------
    // Mutation primitives
    // ------------------------------------------------------------------------

    /// Replace the child at `slot` with `new`, returning the detached old child.
    ///
    /// `new` must be detached or lie inside the subtree being replaced
    /// (unwrapping). The new subtree is linked under the slot.
    pub fn replace_at(&mut self, slot: Slot, new: NodeId) -> RectorResult<NodeId> {
        self.check(slot.parent)?;
        self.check(new)?;
        let old = self.child_at(slot).ok_or_else(|| {
            RectorError::invalid_mutation(slot.parent.0, format!("no child at {:?}", slot))
        })?;
        if self.is_attached(new) && !self.is_ancestor(old, new) {
            return Err(RectorError::invalid_mutation(
                new.0,
                "replacement node is already attached",
            ));
        }
        let parent = &mut self.nodes[slot.parent.index()];
        match slot.field {
            Field::Stmts => {
                if let Some(stmts) = parent.stmts_mut() {
                    stmts.set(slot.position, new);
                }
            }
            field => {
                if let Some(cell) = cell_mut(parent, field, slot.position) {
                    *cell = new;
                }
            }
        }
        self.detach(old);
        self.link_subtree(new, Some(slot));
        Ok(old)
    }

    /// Remove the statement at `slot`, leaving a hole.
    ///
    /// Only statement sequences support removal; every other field holds a
    /// required child or a positional list whose indices must not shift.
    pub fn remove_at(&mut self, slot: Slot) -> RectorResult<NodeId> {
        self.check(slot.parent)?;
        if slot.field != Field::Stmts {
            return Err(RectorError::invalid_mutation(
                slot.parent.0,
                format!("cannot remove a child from field {:?}", slot.field),
            ));
        }
        let removed = self.nodes[slot.parent.index()]
            .stmts_mut()
            .and_then(|stmts| stmts.remove(slot.position))
            .ok_or_else(|| {
                RectorError::invalid_mutation(
                    slot.parent.0,
                    format!("no statement at position {}", slot.position),
                )
            })?;
        self.detach(removed);
        Ok(removed)
    }

    /// Insert a detached statement into a block at `position`.
    ///
    /// Later statements shift by one. Do not insert into a block whose
    /// statements are being iterated by the driver.
    pub fn insert_stmt(&mut self, parent: NodeId, position: usize, stmt: NodeId) -> RectorResult<()> {
        self.check(parent)?;
        self.check(stmt)?;
        if self.is_attached(stmt) {
            return Err(RectorError::invalid_mutation(stmt.0, "statement is already attached"));
        }
        let stmts = self.nodes[parent.index()].stmts_mut().ok_or_else(|| {
            RectorError::invalid_mutation(parent.0, "node has no statement sequence")
        })?;
        stmts.insert(position, stmt);
        let count = stmts.slot_count();
        let position = position.min(count - 1);
        self.link_subtree(stmt, Some(Slot::stmt(parent, position)));
        for later in position + 1..count {
            if let Some(id) = self.child_at(Slot::stmt(parent, later)) {
                self.attrs[id.index()].slot = Some(Slot::stmt(parent, later));
            }
        }
        Ok(())
    }

    /// Append a detached statement to a block.
    pub fn push_stmt(&mut self, parent: NodeId, stmt: NodeId) -> RectorResult<()> {
        let end = self.field_len(parent, Field::Stmts);
        self.insert_stmt(parent, end, stmt)
    }

    /// Drop the holes of every statement sequence and relink.
    pub fn compact(&mut self) {
        let mut changed = false;
        for node in &mut self.nodes {
            if let Some(stmts) = node.stmts_mut() {
                if stmts.has_holes() {
                    stmts.compact();
                    changed = true;
                }
            }
        }
        if changed {
            self.link();
        }
    }

    /// A copy holding only the nodes reachable from the root, renumbered in
    /// pre-order, with every statement sequence compacted.
    ///
    /// Markers are not carried over.
    pub fn pruned(&self) -> Tree {
        let order = self.preorder(self.root);
        let remap: HashMap<NodeId, NodeId> = order
            .iter()
            .enumerate()
            .map(|(index, id)| (*id, NodeId(index as u32)))
            .collect();
        let mut nodes = Vec::with_capacity(order.len());
        for id in &order {
            let mut node = self.nodes[id.index()].clone();
            if let Some(stmts) = node.stmts_mut() {
                let live: Vec<NodeId> = stmts
                    .iter()
                    .filter_map(|stmt| remap.get(&stmt).copied())
                    .collect();
                *stmts = StmtList::from(live);
            }
            for field in fields_of(&node) {
                for position in 0..field_len_of(&node, *field) {
                    if let Some(child) = cell_mut(&mut node, *field, position) {
                        if let Some(new) = remap.get(child) {
                            *child = *new;
                        }
                    }
                }
            }
            nodes.push(node);
        }
        let mut tree = Tree {
            attrs: vec![Attributes::default(); nodes.len()],
            nodes,
            root: NodeId(0),
        };
        tree.link();
        tree
    }

    /// Clear the links of a whole subtree. Nodes reused elsewhere are
    /// relinked by the caller afterwards.
    fn detach(&mut self, id: NodeId) {
        for node in self.preorder(id) {
            self.attrs[node.index()].clear_links();
        }
    }

    // ------------------------------------------------------------------------
    // Linking
    // ------------------------------------------------------------------------

    /// Recompute parent, slot and enclosing declarations for the whole tree.
    ///
    /// Markers are preserved. Nodes not reachable from the root end up
    /// detached.
    pub fn link(&mut self) {
        for attrs in &mut self.attrs {
            attrs.clear_links();
        }
        self.link_subtree(self.root, None);
    }

    /// Link the subtree rooted at `id`, placed at `slot` (or as the root).
    pub fn link_subtree(&mut self, id: NodeId, slot: Option<Slot>) {
        let mut stack = vec![(id, slot)];
        while let Some((current, slot)) = stack.pop() {
            let context = match slot {
                Some(slot) => self.context_for_children_of(slot.parent),
                None => (None, None, None),
            };
            let attrs = &mut self.attrs[current.index()];
            attrs.parent = slot.map(|s| s.parent);
            attrs.slot = slot;
            attrs.enclosing_namespace = context.0;
            attrs.enclosing_class = context.1;
            attrs.enclosing_function = context.2;

            for field in self.fields(current) {
                for position in 0..self.field_len(current, *field) {
                    let child_slot = Slot::new(current, *field, position);
                    if let Some(child) = self.child_at(child_slot) {
                        stack.push((child, Some(child_slot)));
                    }
                }
            }
        }
    }

    /// Enclosing (namespace, class, function) seen by children of `parent`.
    fn context_for_children_of(
        &self,
        parent: NodeId,
    ) -> (Option<NodeId>, Option<NodeId>, Option<NodeId>) {
        let attrs = self.attrs(parent);
        let mut namespace = attrs.enclosing_namespace;
        let mut class = attrs.enclosing_class;
        let mut function = attrs.enclosing_function;
        match self.kind(parent) {
            NodeKind::Namespace => namespace = Some(parent),
            NodeKind::Class | NodeKind::Trait => {
                class = Some(parent);
                function = None;
            }
            NodeKind::Function | NodeKind::ClassMethod => function = Some(parent),
            _ => {}
        }
        (namespace, class, function)
    }

    // ------------------------------------------------------------------------
    // Equality
    // ------------------------------------------------------------------------

    /// Structural equality of two subtrees: same kinds and fields,
    /// recursively, regardless of node identity and attributes.
    pub fn structurally_equal(&self, a: NodeId, b: NodeId) -> bool {
        if shape(self.node(a)) != shape(self.node(b)) {
            return false;
        }
        let (left, right) = (self.children(a), self.children(b));
        left.len() == right.len()
            && left
                .iter()
                .zip(&right)
                .all(|(l, r)| self.structurally_equal(*l, *r))
    }

    /// Structural equality across two trees.
    pub fn structurally_equal_to(&self, a: NodeId, other: &Tree, b: NodeId) -> bool {
        if shape(self.node(a)) != shape(other.node(b)) {
            return false;
        }
        let (left, right) = (self.children(a), other.children(b));
        left.len() == right.len()
            && left
                .iter()
                .zip(&right)
                .all(|(l, r)| self.structurally_equal_to(*l, other, *r))
    }
}

/// A copy of the node with every child id blanked and holes dropped.
fn shape(node: &Node) -> Node {
    let mut copy = node.clone();
    if let Some(stmts) = copy.stmts_mut() {
        stmts.compact();
        let blank = vec![NodeId(0); stmts.len()];
        *stmts = blank.into();
        return copy;
    }
    for field in fields_of(node) {
        for position in 0..field_len_of(node, *field) {
            if let Some(cell) = cell_mut(&mut copy, *field, position) {
                *cell = NodeId(0);
            }
        }
    }
    copy
}

// ============================================================================
// Tests
// ============================================================================
