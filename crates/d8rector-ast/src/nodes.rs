// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Node types for the syntax tree.
//!
//! Nodes live in the arena owned by [`Tree`](crate::Tree) and refer to each
//! other through [`NodeId`] handles. A node never holds a reference to its
//! parent; that relationship is kept in the tree's attribute side table.

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Identity
// ============================================================================

/// Stable arena index of a node.
///
/// Ids are never reused within a tree: a deleted or replaced node keeps its
/// slot in the arena, it is only detached from its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Create a node id from a raw arena index.
    pub fn new(id: u32) -> Self {
        NodeId(id)
    }

    /// The arena index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node_{}", self.0)
    }
}

// ============================================================================
// Kind tags
// ============================================================================

/// Kind tag of a node. Rules declare their interest as a set of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeKind {
    File,
    Namespace,
    Use,
    Function,
    Class,
    Trait,
    TraitUse,
    Property,
    ClassMethod,
    Expression,
    Return,
    Nop,
    FuncCall,
    MethodCall,
    StaticCall,
    New,
    Assign,
    Variable,
    PropertyFetch,
    ConstFetch,
    Str,
    Int,
    Array,
    ArrayItem,
    Arg,
}

impl NodeKind {
    /// Name of the kind as used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::File => "File",
            NodeKind::Namespace => "Namespace",
            NodeKind::Use => "Use",
            NodeKind::Function => "Function",
            NodeKind::Class => "Class",
            NodeKind::Trait => "Trait",
            NodeKind::TraitUse => "TraitUse",
            NodeKind::Property => "Property",
            NodeKind::ClassMethod => "ClassMethod",
            NodeKind::Expression => "Expression",
            NodeKind::Return => "Return",
            NodeKind::Nop => "Nop",
            NodeKind::FuncCall => "FuncCall",
            NodeKind::MethodCall => "MethodCall",
            NodeKind::StaticCall => "StaticCall",
            NodeKind::New => "New",
            NodeKind::Assign => "Assign",
            NodeKind::Variable => "Variable",
            NodeKind::PropertyFetch => "PropertyFetch",
            NodeKind::ConstFetch => "ConstFetch",
            NodeKind::Str => "Str",
            NodeKind::Int => "Int",
            NodeKind::Array => "Array",
            NodeKind::ArrayItem => "ArrayItem",
            NodeKind::Arg => "Arg",
        }
    }

    /// Returns true for statement kinds (nodes that live in a [`StmtList`]).
    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            NodeKind::Namespace
                | NodeKind::Use
                | NodeKind::Function
                | NodeKind::Class
                | NodeKind::Trait
                | NodeKind::TraitUse
                | NodeKind::Property
                | NodeKind::ClassMethod
                | NodeKind::Expression
                | NodeKind::Return
                | NodeKind::Nop
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Names
// ============================================================================

/// How a name was written in source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NameKind {
    /// `Foo`
    Unqualified,
    /// `Foo\Bar`
    Qualified,
    /// `\Foo\Bar`
    FullyQualified,
}

/// A (possibly namespaced) name such as a function or class reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Name {
    pub parts: Vec<String>,
    pub kind: NameKind,
}

impl Name {
    /// Parse a name as written in source. A leading backslash makes it fully
    /// qualified.
    pub fn parse(text: &str) -> Self {
        let (kind, rest) = match text.strip_prefix('\\') {
            Some(rest) => (NameKind::FullyQualified, rest),
            None if text.contains('\\') => (NameKind::Qualified, text),
            None => (NameKind::Unqualified, text),
        };
        Name {
            parts: rest.split('\\').map(str::to_string).collect(),
            kind,
        }
    }

    /// A fully qualified name, with or without a leading backslash in `text`.
    pub fn fully_qualified(text: &str) -> Self {
        Name {
            parts: text
                .trim_start_matches('\\')
                .split('\\')
                .map(str::to_string)
                .collect(),
            kind: NameKind::FullyQualified,
        }
    }

    /// A single-part unqualified name.
    pub fn unqualified(text: &str) -> Self {
        Name {
            parts: vec![text.to_string()],
            kind: NameKind::Unqualified,
        }
    }

    /// First segment.
    pub fn first(&self) -> &str {
        self.parts.first().map(String::as_str).unwrap_or("")
    }

    /// Last segment (the short name).
    pub fn last(&self) -> &str {
        self.parts.last().map(String::as_str).unwrap_or("")
    }

    pub fn is_fully_qualified(&self) -> bool {
        self.kind == NameKind::FullyQualified
    }

    /// The name as it is written in code, with the leading backslash of a
    /// fully qualified name.
    pub fn to_code(&self) -> String {
        match self.kind {
            NameKind::FullyQualified => format!("\\{}", self),
            _ => self.to_string(),
        }
    }
}

/// Displays the name without the leading backslash.
impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.parts.join("\\"))
    }
}

/// Callee of a function call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Callee {
    /// `foo(...)`
    Name(Name),
    /// `$handle(...)` or any other computed callee.
    Dynamic(NodeId),
}

/// Method name of a method call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MethodName {
    /// `$obj->name(...)`
    Identifier(String),
    /// `$obj->$name(...)`
    Dynamic(NodeId),
}

impl MethodName {
    /// The identifier, if the name is not computed.
    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            MethodName::Identifier(name) => Some(name),
            MethodName::Dynamic(_) => None,
        }
    }
}

/// One imported name of a `use` statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UseItem {
    /// Imported name; always resolved from the global namespace.
    pub name: Name,
    pub alias: Option<String>,
}

impl UseItem {
    pub fn new(fqcn: &str) -> Self {
        UseItem {
            name: Name::parse(fqcn.trim_start_matches('\\')),
            alias: None,
        }
    }

    /// The name the import introduces into the namespace.
    pub fn local_name(&self) -> &str {
        self.alias.as_deref().unwrap_or_else(|| self.name.last())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        }
    }
}

// ============================================================================
// Statement sequences
// ============================================================================

/// Ordered, sparse sequence of statements.
///
/// Removing a statement leaves a hole so the positions of the surviving
/// statements do not move while a traversal is iterating the block. Holes are
/// skipped by iteration and only disappear on [`StmtList::compact`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<NodeId>", into = "Vec<NodeId>")]
pub struct StmtList {
    slots: Vec<Option<NodeId>>,
}

impl StmtList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of positions, holes included.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Statement at a position, `None` for a hole or out of range.
    pub fn get(&self, position: usize) -> Option<NodeId> {
        self.slots.get(position).copied().flatten()
    }

    /// Live statements in source order.
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.slots.iter().filter_map(|slot| *slot)
    }

    /// Live statements with their positions.
    pub fn iter_positions(&self) -> impl Iterator<Item = (usize, NodeId)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(position, slot)| slot.map(|id| (position, id)))
    }

    /// Number of live statements.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn push(&mut self, id: NodeId) {
        self.slots.push(Some(id));
    }

    /// Insert at a position, shifting later positions by one.
    pub fn insert(&mut self, position: usize, id: NodeId) {
        let position = position.min(self.slots.len());
        self.slots.insert(position, Some(id));
    }

    /// Put `id` at a position, returning the previous occupant.
    pub fn set(&mut self, position: usize, id: NodeId) -> Option<NodeId> {
        self.slots
            .get_mut(position)
            .and_then(|slot| slot.replace(id))
    }

    /// Leave a hole at a position, returning the removed statement.
    pub fn remove(&mut self, position: usize) -> Option<NodeId> {
        self.slots.get_mut(position).and_then(Option::take)
    }

    /// Drop all holes.
    pub fn compact(&mut self) {
        self.slots.retain(Option::is_some);
    }

    /// Returns true if any position is a hole.
    pub fn has_holes(&self) -> bool {
        self.slots.iter().any(Option::is_none)
    }
}

impl From<Vec<NodeId>> for StmtList {
    fn from(ids: Vec<NodeId>) -> Self {
        StmtList {
            slots: ids.into_iter().map(Some).collect(),
        }
    }
}

impl From<StmtList> for Vec<NodeId> {
    fn from(list: StmtList) -> Self {
        list.slots.into_iter().flatten().collect()
    }
}

// ============================================================================
// Nodes
// ============================================================================

/// A syntax tree node.
///
/// Child nodes are referenced by [`NodeId`]. Argument lists hold [`Node::Arg`]
/// nodes, array literals hold [`Node::ArrayItem`] nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Node {
    /// Root of a source unit.
    File { stmts: StmtList },
    /// `namespace A\B;` followed by its statements.
    Namespace { name: Option<Name>, stmts: StmtList },
    /// `use A\B, C\D as E;`
    Use { uses: Vec<UseItem> },
    Function {
        name: String,
        params: Vec<String>,
        stmts: StmtList,
    },
    Class {
        name: String,
        extends: Option<Name>,
        stmts: StmtList,
    },
    Trait { name: String, stmts: StmtList },
    /// `use SomeTrait;` inside a class body.
    TraitUse { traits: Vec<Name> },
    Property {
        name: String,
        visibility: Visibility,
        doc: Option<String>,
    },
    ClassMethod {
        name: String,
        visibility: Visibility,
        is_static: bool,
        params: Vec<String>,
        stmts: StmtList,
    },
    /// Expression statement.
    Expression { expr: NodeId },
    Return { expr: Option<NodeId> },
    Nop,
    FuncCall { callee: Callee, args: Vec<NodeId> },
    MethodCall {
        var: NodeId,
        name: MethodName,
        args: Vec<NodeId>,
    },
    StaticCall {
        class: Name,
        name: String,
        args: Vec<NodeId>,
    },
    New { class: Name, args: Vec<NodeId> },
    Assign { var: NodeId, expr: NodeId },
    Variable { name: String },
    PropertyFetch { var: NodeId, name: String },
    ConstFetch { name: Name },
    Str { value: String },
    Int { value: i64 },
    Array { items: Vec<NodeId> },
    ArrayItem { key: Option<NodeId>, value: NodeId },
    Arg { value: NodeId, unpack: bool },
}

impl Node {
    /// Kind tag of this node.
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::File { .. } => NodeKind::File,
            Node::Namespace { .. } => NodeKind::Namespace,
            Node::Use { .. } => NodeKind::Use,
            Node::Function { .. } => NodeKind::Function,
            Node::Class { .. } => NodeKind::Class,
            Node::Trait { .. } => NodeKind::Trait,
            Node::TraitUse { .. } => NodeKind::TraitUse,
            Node::Property { .. } => NodeKind::Property,
            Node::ClassMethod { .. } => NodeKind::ClassMethod,
            Node::Expression { .. } => NodeKind::Expression,
            Node::Return { .. } => NodeKind::Return,
            Node::Nop => NodeKind::Nop,
            Node::FuncCall { .. } => NodeKind::FuncCall,
            Node::MethodCall { .. } => NodeKind::MethodCall,
            Node::StaticCall { .. } => NodeKind::StaticCall,
            Node::New { .. } => NodeKind::New,
            Node::Assign { .. } => NodeKind::Assign,
            Node::Variable { .. } => NodeKind::Variable,
            Node::PropertyFetch { .. } => NodeKind::PropertyFetch,
            Node::ConstFetch { .. } => NodeKind::ConstFetch,
            Node::Str { .. } => NodeKind::Str,
            Node::Int { .. } => NodeKind::Int,
            Node::Array { .. } => NodeKind::Array,
            Node::ArrayItem { .. } => NodeKind::ArrayItem,
            Node::Arg { .. } => NodeKind::Arg,
        }
    }

    /// The statement sequence of a block-bearing node.
    pub fn stmts(&self) -> Option<&StmtList> {
        match self {
            Node::File { stmts }
            | Node::Namespace { stmts, .. }
            | Node::Function { stmts, .. }
            | Node::Class { stmts, .. }
            | Node::Trait { stmts, .. }
            | Node::ClassMethod { stmts, .. } => Some(stmts),
            _ => None,
        }
    }

    pub fn stmts_mut(&mut self) -> Option<&mut StmtList> {
        match self {
            Node::File { stmts }
            | Node::Namespace { stmts, .. }
            | Node::Function { stmts, .. }
            | Node::Class { stmts, .. }
            | Node::Trait { stmts, .. }
            | Node::ClassMethod { stmts, .. } => Some(stmts),
            _ => None,
        }
    }

    /// The argument list of a call-like node.
    pub fn args(&self) -> Option<&[NodeId]> {
        match self {
            Node::FuncCall { args, .. }
            | Node::MethodCall { args, .. }
            | Node::StaticCall { args, .. }
            | Node::New { args, .. } => Some(args),
            _ => None,
        }
    }
}
