// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Class name resolution against the enclosing namespace and its imports.

use crate::nodes::{Name, Node, NodeId, NodeKind, UseItem};
use crate::tree::Tree;

/// The namespace and imports in effect at some node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameContext {
    namespace: Option<String>,
    imports: Vec<UseItem>,
}

impl NameContext {
    /// Context of the namespace enclosing `node` (or `node` itself when it is
    /// a namespace). Outside any namespace, the file's top-level imports apply.
    pub fn for_node(tree: &Tree, node: NodeId) -> Self {
        let container = if tree.kind(node) == NodeKind::Namespace {
            node
        } else {
            tree.enclosing_namespace(node).unwrap_or_else(|| tree.root())
        };
        let namespace = match tree.node(container) {
            Node::Namespace {
                name: Some(name), ..
            } => Some(name.to_string()),
            _ => None,
        };
        let imports = tree
            .stmts(container)
            .into_iter()
            .filter_map(|stmt| match tree.node(stmt) {
                Node::Use { uses } => Some(uses.clone()),
                _ => None,
            })
            .flatten()
            .collect();
        NameContext { namespace, imports }
    }

    /// Current namespace, without a leading backslash.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn imports(&self) -> &[UseItem] {
        &self.imports
    }

    /// Fully qualified name (no leading backslash) a class reference
    /// resolves to.
    ///
    /// Fully qualified names are taken as written. Otherwise the first
    /// segment is looked up among the imports, case-insensitively as PHP
    /// does; failing that the name is relative to the current namespace.
    pub fn resolve_class(&self, name: &Name) -> String {
        if name.is_fully_qualified() {
            return name.to_string();
        }
        let first = name.first();
        if let Some(import) = self
            .imports
            .iter()
            .find(|item| item.local_name().eq_ignore_ascii_case(first))
        {
            let mut parts = import.name.parts.clone();
            parts.extend(name.parts.iter().skip(1).cloned());
            return parts.join("\\");
        }
        self.qualify(&name.to_string())
    }

    /// Fully qualified name of something declared here as `short`.
    pub fn qualify(&self, short: &str) -> String {
        match &self.namespace {
            Some(namespace) => format!("{}\\{}", namespace, short),
            None => short.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn namespaced() -> (Tree, NodeId, NodeId) {
        let mut tree = Tree::new();
        let import = tree.use_stmt(&["Drupal\\Core\\Routing\\UrlGeneratorTrait"]);
        let class = tree.class("Foo", None, vec![]);
        let namespace = tree.namespace(Some("Drupal\\mymodule"), vec![import, class]);
        let root = tree.root();
        tree.push_stmt(root, namespace).unwrap();
        (tree, namespace, class)
    }

    #[test]
    fn imported_name_resolves_through_use() {
        let (tree, _, class) = namespaced();
        let context = NameContext::for_node(&tree, class);
        assert_eq!(
            context.resolve_class(&Name::parse("urlgeneratortrait")),
            "Drupal\\Core\\Routing\\UrlGeneratorTrait"
        );
    }

    #[test]
    fn unimported_name_is_relative_to_namespace() {
        let (tree, namespace, _) = namespaced();
        let context = NameContext::for_node(&tree, namespace);
        assert_eq!(context.namespace(), Some("Drupal\\mymodule"));
        assert_eq!(
            context.resolve_class(&Name::parse("Sub\\Thing")),
            "Drupal\\mymodule\\Sub\\Thing"
        );
        assert_eq!(context.qualify("Foo"), "Drupal\\mymodule\\Foo");
    }

    #[test]
    fn fully_qualified_name_is_taken_as_written() {
        let (tree, _, class) = namespaced();
        let context = NameContext::for_node(&tree, class);
        assert_eq!(
            context.resolve_class(&Name::parse("\\Other\\Thing")),
            "Other\\Thing"
        );
    }

    #[test]
    fn global_code_has_no_namespace() {
        let tree = Tree::new();
        let context = NameContext::for_node(&tree, tree.root());
        assert_eq!(context.namespace(), None);
        assert_eq!(context.qualify("Foo"), "Foo");
    }
}
