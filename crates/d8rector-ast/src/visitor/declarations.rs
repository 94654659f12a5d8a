// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! DeclarationCollector for class and trait declarations.
//!
//! Collects, for every class in a tree, its fully qualified name, parent
//! class and directly used traits; for every trait, its methods and the
//! traits it uses in turn. Names are resolved against the enclosing
//! namespace and its imports.
//!
//! The collected [`DeclarationTable`] is the static stand-in for runtime
//! class reflection. A host collects every tree of a run before rewriting
//! any of them, so ancestors declared in other units are visible.
//!
//! # Usage
//!
//! ```ignore
//! use d8rector_ast::{CapabilityIndex, DeclarationTable};
//!
//! let mut table = DeclarationTable::new();
//! for tree in &trees {
//!     table.add_tree(tree);
//! }
//! let mut index = CapabilityIndex::new(table);
//! ```

use std::collections::HashMap;

use crate::names::NameContext;
use crate::nodes::{Node, NodeId};
use crate::tree::Tree;

/// A class declaration as seen by the capability index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDeclaration {
    /// Fully qualified name, without a leading backslash.
    pub name: String,
    /// Fully qualified parent class, if any.
    pub parent: Option<String>,
    /// Fully qualified traits used directly by the class.
    pub traits: Vec<String>,
}

/// A trait declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraitDeclaration {
    pub name: String,
    /// Method names, in declaration order.
    pub members: Vec<String>,
    /// Traits used by this trait.
    pub traits: Vec<String>,
}

/// Lookup of declarations by fully qualified name.
///
/// Lookups are case-insensitive and ignore a leading backslash.
pub trait ClassResolver {
    fn class(&self, fqcn: &str) -> Option<&ClassDeclaration>;
    fn trait_decl(&self, fqcn: &str) -> Option<&TraitDeclaration>;
}

/// Declarations collected from a set of trees.
#[derive(Debug, Clone, Default)]
pub struct DeclarationTable {
    classes: HashMap<String, ClassDeclaration>,
    traits: HashMap<String, TraitDeclaration>,
}

fn key(fqcn: &str) -> String {
    fqcn.trim_start_matches('\\').to_ascii_lowercase()
}

impl DeclarationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from trees.
    pub fn collect<'t>(trees: impl IntoIterator<Item = &'t Tree>) -> Self {
        let mut table = Self::new();
        for tree in trees {
            table.add_tree(tree);
        }
        table
    }

    /// Add every declaration found in `tree`. A later declaration of the
    /// same name replaces an earlier one.
    pub fn add_tree(&mut self, tree: &Tree) {
        let collector = DeclarationCollector::collect(tree);
        for class in collector.classes {
            self.insert_class(class);
        }
        for declaration in collector.traits {
            self.insert_trait(declaration);
        }
    }

    pub fn insert_class(&mut self, class: ClassDeclaration) {
        self.classes.insert(key(&class.name), class);
    }

    pub fn insert_trait(&mut self, declaration: TraitDeclaration) {
        self.traits.insert(key(&declaration.name), declaration);
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn trait_count(&self) -> usize {
        self.traits.len()
    }
}

impl ClassResolver for DeclarationTable {
    fn class(&self, fqcn: &str) -> Option<&ClassDeclaration> {
        self.classes.get(&key(fqcn))
    }

    fn trait_decl(&self, fqcn: &str) -> Option<&TraitDeclaration> {
        self.traits.get(&key(fqcn))
    }
}

/// Walks one tree and collects its class and trait declarations.
pub struct DeclarationCollector {
    classes: Vec<ClassDeclaration>,
    traits: Vec<TraitDeclaration>,
}

impl DeclarationCollector {
    /// Collect declarations from a tree, in source order.
    pub fn collect(tree: &Tree) -> Self {
        let mut collector = DeclarationCollector {
            classes: Vec::new(),
            traits: Vec::new(),
        };
        for id in tree.preorder(tree.root()) {
            match tree.node(id) {
                Node::Class { name, extends, .. } => {
                    let context = NameContext::for_node(tree, id);
                    collector.classes.push(ClassDeclaration {
                        name: context.qualify(name),
                        parent: extends.as_ref().map(|p| context.resolve_class(p)),
                        traits: used_traits(tree, id, &context),
                    });
                }
                Node::Trait { name, .. } => {
                    let context = NameContext::for_node(tree, id);
                    let members = tree
                        .stmts(id)
                        .into_iter()
                        .filter_map(|stmt| match tree.node(stmt) {
                            Node::ClassMethod { name, .. } => Some(name.clone()),
                            _ => None,
                        })
                        .collect();
                    collector.traits.push(TraitDeclaration {
                        name: context.qualify(name),
                        members,
                        traits: used_traits(tree, id, &context),
                    });
                }
                _ => {}
            }
        }
        collector
    }

    pub fn classes(&self) -> &[ClassDeclaration] {
        &self.classes
    }

    pub fn traits(&self) -> &[TraitDeclaration] {
        &self.traits
    }
}

/// Traits named in the `use` statements of a class-like body.
fn used_traits(tree: &Tree, body: NodeId, context: &NameContext) -> Vec<String> {
    tree.stmts(body)
        .into_iter()
        .filter_map(|stmt| match tree.node(stmt) {
            Node::TraitUse { traits } => Some(traits),
            _ => None,
        })
        .flatten()
        .map(|name| context.resolve_class(name))
        .collect()
}
