// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Syntax tree model and rewrite engine for d8rector.
//!
//! # Overview
//!
//! - **Tree**: an arena of [`Node`]s with a side table of attributes
//!   (parent, slot, enclosing declarations). See [`Tree`].
//! - **Rules**: the [`Rule`] trait and the [`traverse`] driver that offers
//!   nodes to rules and applies their [`Replacement`]s.
//! - **Context**: [`DeclarationTable`] (collected from trees before any
//!   rewriting) and the memoized [`CapabilityIndex`] built on top of it.
//! - **Output**: [`codegen::render`] prints a tree as PHP.
//!
//! Trees come from an external parser as JSON; see [`Tree::from_json`].

mod builder;
pub mod capability;
pub mod codegen;
pub mod imports;
pub mod names;
pub mod nodes;
pub mod tree;
pub mod visitor;

pub use capability::CapabilityIndex;
pub use imports::{ensure_import, plan_import, remove_import, ImportPlan};
pub use names::NameContext;
pub use nodes::{
    Callee, MethodName, Name, NameKind, Node, NodeId, NodeKind, StmtList, UseItem, Visibility,
};
pub use tree::{Attributes, Field, Slot, Tree};
pub use visitor::{
    traverse, AppliedChange, ChangeAction, ClassDeclaration, ClassResolver, CodeSample,
    DeclarationCollector, DeclarationTable, Replacement, Rule, RuleContext, RuleDefinition,
    TraitDeclaration, TraversalReport,
};
