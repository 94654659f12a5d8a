// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Node construction helpers.
//!
//! Every helper allocates a detached node. Children passed in must be
//! detached too, or be children of a node that is about to be replaced.
//! Nothing here touches the attribute table: a built subtree is linked when
//! it is spliced in through a slot primitive.

use crate::nodes::{Callee, MethodName, Name, Node, NodeId, StmtList, UseItem, Visibility};
use crate::tree::Tree;

impl Tree {
    pub fn string(&mut self, value: impl Into<String>) -> NodeId {
        self.alloc(Node::Str {
            value: value.into(),
        })
    }

    pub fn int(&mut self, value: i64) -> NodeId {
        self.alloc(Node::Int { value })
    }

    pub fn variable(&mut self, name: impl Into<String>) -> NodeId {
        self.alloc(Node::Variable { name: name.into() })
    }

    /// `$this`
    pub fn this(&mut self) -> NodeId {
        self.variable("this")
    }

    pub fn arg(&mut self, value: NodeId) -> NodeId {
        self.alloc(Node::Arg {
            value,
            unpack: false,
        })
    }

    /// Wrap each value in an [`Node::Arg`].
    pub fn args(&mut self, values: impl IntoIterator<Item = NodeId>) -> Vec<NodeId> {
        values.into_iter().map(|value| self.arg(value)).collect()
    }

    pub fn func_call(&mut self, name: Name, args: Vec<NodeId>) -> NodeId {
        self.alloc(Node::FuncCall {
            callee: Callee::Name(name),
            args,
        })
    }

    /// `$callee(...)`
    pub fn dynamic_call(&mut self, callee: NodeId, args: Vec<NodeId>) -> NodeId {
        self.alloc(Node::FuncCall {
            callee: Callee::Dynamic(callee),
            args,
        })
    }

    pub fn method_call(&mut self, var: NodeId, name: &str, args: Vec<NodeId>) -> NodeId {
        self.alloc(Node::MethodCall {
            var,
            name: MethodName::Identifier(name.to_string()),
            args,
        })
    }

    pub fn static_call(&mut self, class: Name, name: &str, args: Vec<NodeId>) -> NodeId {
        self.alloc(Node::StaticCall {
            class,
            name: name.to_string(),
            args,
        })
    }

    pub fn new_object(&mut self, class: Name, args: Vec<NodeId>) -> NodeId {
        self.alloc(Node::New { class, args })
    }

    pub fn assign(&mut self, var: NodeId, expr: NodeId) -> NodeId {
        self.alloc(Node::Assign { var, expr })
    }

    pub fn property_fetch(&mut self, var: NodeId, name: &str) -> NodeId {
        self.alloc(Node::PropertyFetch {
            var,
            name: name.to_string(),
        })
    }

    pub fn const_fetch(&mut self, name: &str) -> NodeId {
        self.alloc(Node::ConstFetch {
            name: Name::parse(name),
        })
    }

    pub fn array(&mut self, items: Vec<NodeId>) -> NodeId {
        self.alloc(Node::Array { items })
    }

    pub fn array_item(&mut self, key: Option<NodeId>, value: NodeId) -> NodeId {
        self.alloc(Node::ArrayItem { key, value })
    }

    /// Expression statement.
    pub fn expression(&mut self, expr: NodeId) -> NodeId {
        self.alloc(Node::Expression { expr })
    }

    pub fn ret(&mut self, expr: Option<NodeId>) -> NodeId {
        self.alloc(Node::Return { expr })
    }

    pub fn nop(&mut self) -> NodeId {
        self.alloc(Node::Nop)
    }

    pub fn namespace(&mut self, name: Option<&str>, stmts: Vec<NodeId>) -> NodeId {
        self.alloc(Node::Namespace {
            name: name.map(Name::parse),
            stmts: StmtList::from(stmts),
        })
    }

    /// `use A\B, C\D;`
    pub fn use_stmt(&mut self, fqcns: &[&str]) -> NodeId {
        self.alloc(Node::Use {
            uses: fqcns.iter().map(|fqcn| UseItem::new(fqcn)).collect(),
        })
    }

    pub fn class(&mut self, name: &str, extends: Option<Name>, stmts: Vec<NodeId>) -> NodeId {
        self.alloc(Node::Class {
            name: name.to_string(),
            extends,
            stmts: StmtList::from(stmts),
        })
    }

    pub fn trait_decl(&mut self, name: &str, stmts: Vec<NodeId>) -> NodeId {
        self.alloc(Node::Trait {
            name: name.to_string(),
            stmts: StmtList::from(stmts),
        })
    }

    /// `use A, B;` inside a class body.
    pub fn trait_use(&mut self, traits: Vec<Name>) -> NodeId {
        self.alloc(Node::TraitUse { traits })
    }

    pub fn function(&mut self, name: &str, params: &[&str], stmts: Vec<NodeId>) -> NodeId {
        self.alloc(Node::Function {
            name: name.to_string(),
            params: params.iter().map(|p| p.to_string()).collect(),
            stmts: StmtList::from(stmts),
        })
    }

    pub fn class_method(
        &mut self,
        name: &str,
        visibility: Visibility,
        params: &[&str],
        stmts: Vec<NodeId>,
    ) -> NodeId {
        self.alloc(Node::ClassMethod {
            name: name.to_string(),
            visibility,
            is_static: false,
            params: params.iter().map(|p| p.to_string()).collect(),
            stmts: StmtList::from(stmts),
        })
    }

    pub fn property(&mut self, name: &str, visibility: Visibility, doc: Option<&str>) -> NodeId {
        self.alloc(Node::Property {
            name: name.to_string(),
            visibility,
            doc: doc.map(str::to_string),
        })
    }
}
