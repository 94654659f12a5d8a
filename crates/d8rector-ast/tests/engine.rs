// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Engine tests over trees loaded from JSON.

use d8rector_ast::codegen::render;
use d8rector_ast::{
    traverse, CapabilityIndex, DeclarationTable, Node, NodeId, NodeKind, Replacement, Rule,
    RuleContext, RuleDefinition, Tree,
};
use d8rector_core::error::RectorResult;

const URL_TRAIT: &str = "Drupal\\Core\\Routing\\UrlGeneratorTrait";

/// `namespace App; use Drupal\Core\Routing\UrlGeneratorTrait;
/// class Base { use UrlGeneratorTrait; }`
const BASE_UNIT: &str = r#"{
  "root": 0,
  "nodes": [
    {"kind": "File", "stmts": [1]},
    {"kind": "Namespace", "name": {"parts": ["App"], "kind": "Unqualified"}, "stmts": [2, 3]},
    {"kind": "Use", "uses": [{"name": {"parts": ["Drupal", "Core", "Routing", "UrlGeneratorTrait"], "kind": "Qualified"}, "alias": null}]},
    {"kind": "Class", "name": "Base", "extends": null, "stmts": [4]},
    {"kind": "TraitUse", "traits": [{"parts": ["UrlGeneratorTrait"], "kind": "Unqualified"}]}
  ]
}"#;

/// `namespace App\Form; use App\Base; class Child extends Base { ; }`
const CHILD_UNIT: &str = r#"{
  "root": 0,
  "nodes": [
    {"kind": "File", "stmts": [1]},
    {"kind": "Namespace", "name": {"parts": ["App", "Form"], "kind": "Qualified"}, "stmts": [2, 3]},
    {"kind": "Use", "uses": [{"name": {"parts": ["App", "Base"], "kind": "Qualified"}, "alias": null}]},
    {"kind": "Class", "name": "Child", "extends": {"parts": ["Base"], "kind": "Unqualified"}, "stmts": [4]},
    {"kind": "Nop"}
  ]
}"#;

struct DropNops;

impl Rule for DropNops {
    fn id(&self) -> &str {
        "drop_nops"
    }

    fn interest(&self) -> &[NodeKind] {
        &[NodeKind::Nop]
    }

    fn attempt(&mut self, _node: NodeId, _cx: &mut RuleContext<'_>) -> RectorResult<Replacement> {
        Ok(Replacement::Delete)
    }

    fn definition(&self) -> RuleDefinition {
        RuleDefinition::new("Removes empty statements", vec![])
    }
}

mod loading {
    use super::*;

    #[test]
    fn attributes_are_rebuilt_on_load() {
        let tree = Tree::from_json(CHILD_UNIT).unwrap();
        let nop = NodeId::new(4);
        assert_eq!(tree.parent(nop), Some(NodeId::new(3)));
        assert_eq!(tree.enclosing_class(nop), Some(NodeId::new(3)));
        assert_eq!(tree.enclosing_namespace(nop), Some(NodeId::new(1)));
        assert_eq!(tree.enclosing_function(nop), None);
    }

    #[test]
    fn printed_source_reflects_tree() {
        let tree = Tree::from_json(BASE_UNIT).unwrap();
        let source = render(&tree);
        assert!(source.starts_with("<?php\n\nnamespace App;\n"));
        assert!(source.contains("use Drupal\\Core\\Routing\\UrlGeneratorTrait;"));
        assert!(source.contains("class Base\n{\n    use UrlGeneratorTrait;\n}"));
    }
}

mod capabilities {
    use super::*;

    #[test]
    fn trait_inherited_across_units_is_visible() {
        let base = Tree::from_json(BASE_UNIT).unwrap();
        let child = Tree::from_json(CHILD_UNIT).unwrap();
        let table = DeclarationTable::collect([&base, &child]);
        let mut index = CapabilityIndex::new(table);
        assert!(index.uses_capability("App\\Form\\Child", URL_TRAIT));
        assert!(index.uses_capability("App\\Base", URL_TRAIT));
        assert!(!index.uses_capability("App\\Form\\Other", URL_TRAIT));
    }
}

mod traversal {
    use super::*;

    #[test]
    fn deleted_statements_are_compacted_before_saving() {
        let mut tree = Tree::from_json(CHILD_UNIT).unwrap();
        let mut index = CapabilityIndex::default();
        let mut rules: Vec<Box<dyn Rule>> = vec![Box::new(DropNops)];
        let report = traverse(&mut tree, &mut rules, &mut index).unwrap();
        assert_eq!(report.len(), 1);

        let class = NodeId::new(3);
        assert!(tree.stmts(class).is_empty());
        assert!(!tree.node(class).stmts().unwrap().has_holes());

        let saved = tree.to_json_pretty().unwrap();
        let reloaded = Tree::from_json(&saved).unwrap();
        assert!(reloaded.structurally_equal_to(reloaded.root(), &tree, tree.root()));
        assert!(matches!(reloaded.node(class), Node::Class { .. }));
    }

    #[test]
    fn second_run_changes_nothing() {
        let mut tree = Tree::from_json(CHILD_UNIT).unwrap();
        let mut index = CapabilityIndex::default();
        let mut rules: Vec<Box<dyn Rule>> = vec![Box::new(DropNops)];
        traverse(&mut tree, &mut rules, &mut index).unwrap();
        let report = traverse(&mut tree, &mut rules, &mut index).unwrap();
        assert!(report.is_empty());
    }
}
