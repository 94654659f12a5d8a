// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Adding and removing `use` imports in a namespace.
//!
//! Imports are compared by fully qualified identity, case-insensitively.
//! An existing import of the same class is reused under whatever alias it
//! has. A new import is only planned when its short name is free in the
//! namespace; otherwise the caller must fall back to a fully qualified
//! reference.

use d8rector_core::error::RectorResult;

use crate::nodes::{Name, Node, NodeId, UseItem};
use crate::tree::{Field, Slot, Tree};

/// How a class can be referenced from inside a namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportPlan {
    /// Already imported; refer to it by this local name.
    Existing(String),
    /// Not imported and the short name is free.
    New(String),
    /// Not imported and the short name is taken by another import or
    /// declaration.
    Conflict,
}

impl ImportPlan {
    /// Name to use in generated code. A conflict yields a fully qualified
    /// reference.
    pub fn reference(&self, fqcn: &str) -> Name {
        match self {
            ImportPlan::Existing(local) | ImportPlan::New(local) => Name::unqualified(local),
            ImportPlan::Conflict => Name::fully_qualified(fqcn),
        }
    }
}

fn same_class(a: &str, b: &str) -> bool {
    a.trim_start_matches('\\')
        .eq_ignore_ascii_case(b.trim_start_matches('\\'))
}

fn short_name(fqcn: &str) -> &str {
    fqcn.rsplit('\\').next().unwrap_or(fqcn)
}

/// Decide how `fqcn` can be referenced from `container` (a namespace or the
/// file root).
pub fn plan_import(tree: &Tree, container: NodeId, fqcn: &str) -> ImportPlan {
    let short = short_name(fqcn);
    let mut taken = false;
    for stmt in tree.stmts(container) {
        match tree.node(stmt) {
            Node::Use { uses } => {
                for item in uses {
                    if same_class(&item.name.to_string(), fqcn) {
                        return ImportPlan::Existing(item.local_name().to_string());
                    }
                    if item.local_name().eq_ignore_ascii_case(short) {
                        taken = true;
                    }
                }
            }
            Node::Class { name, .. } | Node::Trait { name, .. } => {
                if name.eq_ignore_ascii_case(short) {
                    taken = true;
                }
            }
            _ => {}
        }
    }
    if taken {
        ImportPlan::Conflict
    } else {
        ImportPlan::New(short.to_string())
    }
}

/// Add `use <fqcn>;` to `container` unless the class is already imported or
/// its short name is taken. Returns true if a statement was inserted.
///
/// The new statement goes after the last existing import, or first in the
/// block when there is none.
pub fn ensure_import(tree: &mut Tree, container: NodeId, fqcn: &str) -> RectorResult<bool> {
    if !matches!(plan_import(tree, container, fqcn), ImportPlan::New(_)) {
        return Ok(false);
    }
    let position = tree
        .node(container)
        .stmts()
        .and_then(|stmts| {
            stmts
                .iter_positions()
                .filter(|(_, id)| matches!(tree.node(*id), Node::Use { .. }))
                .map(|(position, _)| position + 1)
                .last()
        })
        .unwrap_or(0);
    let stmt = tree.use_stmt(&[fqcn.trim_start_matches('\\')]);
    tree.insert_stmt(container, position, stmt)?;
    Ok(true)
}

/// Drop the import of `fqcn` from `container`. A `use` statement left empty
/// is removed. Returns true if anything was removed.
pub fn remove_import(tree: &mut Tree, container: NodeId, fqcn: &str) -> RectorResult<bool> {
    let mut removed = false;
    let positions: Vec<(usize, NodeId)> = tree
        .node(container)
        .stmts()
        .map(|stmts| stmts.iter_positions().collect())
        .unwrap_or_default();
    for (position, stmt) in positions {
        let Node::Use { uses } = tree.node_mut(stmt) else {
            continue;
        };
        let before = uses.len();
        uses.retain(|item: &UseItem| !same_class(&item.name.to_string(), fqcn));
        if uses.len() == before {
            continue;
        }
        removed = true;
        if uses.is_empty() {
            tree.remove_at(Slot::new(container, Field::Stmts, position))?;
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::render_stmts;

    const URL: &str = "Drupal\\Core\\Url";

    fn namespace_with(imports: &[&str]) -> (Tree, NodeId) {
        let mut tree = Tree::new();
        let mut stmts = Vec::new();
        for import in imports {
            stmts.push(tree.use_stmt(&[*import]));
        }
        stmts.push(tree.class("Foo", None, vec![]));
        let namespace = tree.namespace(Some("Drupal\\mymodule"), stmts);
        let root = tree.root();
        tree.push_stmt(root, namespace).unwrap();
        (tree, namespace)
    }

    fn uses(tree: &Tree, namespace: NodeId) -> String {
        let stmts: Vec<NodeId> = tree
            .stmts(namespace)
            .into_iter()
            .filter(|id| matches!(tree.node(*id), Node::Use { .. }))
            .collect();
        render_stmts(tree, &stmts)
    }

    #[test]
    fn new_import_goes_after_last_use() {
        let (mut tree, namespace) = namespace_with(&["A\\B"]);
        assert!(ensure_import(&mut tree, namespace, URL).unwrap());
        assert_eq!(uses(&tree, namespace), "use A\\B;\nuse Drupal\\Core\\Url;");
        let second = tree.stmts(namespace)[1];
        assert_eq!(tree.parent(second), Some(namespace));
    }

    #[test]
    fn existing_import_is_not_duplicated() {
        let (mut tree, namespace) = namespace_with(&[URL]);
        assert!(!ensure_import(&mut tree, namespace, "\\drupal\\core\\url").unwrap());
        assert_eq!(uses(&tree, namespace), "use Drupal\\Core\\Url;");
    }

    #[test]
    fn existing_alias_is_reused() {
        let (mut tree, namespace) = namespace_with(&[URL]);
        let first = tree.stmts(namespace)[0];
        if let Node::Use { uses } = tree.node_mut(first) {
            uses[0].alias = Some("CoreUrl".to_string());
        }
        let plan = plan_import(&tree, namespace, URL);
        assert_eq!(plan, ImportPlan::Existing("CoreUrl".to_string()));
        assert_eq!(plan.reference(URL).to_code(), "CoreUrl");
    }

    #[test]
    fn taken_short_name_is_a_conflict() {
        let (tree, namespace) = namespace_with(&["Other\\Url"]);
        let plan = plan_import(&tree, namespace, URL);
        assert_eq!(plan, ImportPlan::Conflict);
        assert_eq!(plan.reference(URL).to_code(), "\\Drupal\\Core\\Url");
    }

    #[test]
    fn import_without_existing_uses_goes_first() {
        let (mut tree, namespace) = namespace_with(&[]);
        ensure_import(&mut tree, namespace, URL).unwrap();
        let first = tree.stmts(namespace)[0];
        assert!(matches!(tree.node(first), Node::Use { .. }));
    }

    #[test]
    fn remove_import_drops_empty_statement() {
        let (mut tree, namespace) = namespace_with(&["A\\B", URL]);
        assert!(remove_import(&mut tree, namespace, URL).unwrap());
        assert_eq!(uses(&tree, namespace), "use A\\B;");
        assert!(!remove_import(&mut tree, namespace, URL).unwrap());
    }
}
