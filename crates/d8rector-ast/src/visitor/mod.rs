// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Rule dispatch and tree traversal.
//!
//! # Rules
//!
//! A [`Rule`] declares the node kinds it is interested in and answers each
//! offered node with a [`Replacement`]:
//!
//! ```ignore
//! use d8rector_ast::{Replacement, Rule, RuleContext, RuleDefinition};
//!
//! struct DropNops;
//!
//! impl Rule for DropNops {
//!     fn id(&self) -> &str {
//!         "drop_nops"
//!     }
//!
//!     fn interest(&self) -> &[NodeKind] {
//!         &[NodeKind::Nop]
//!     }
//!
//!     fn attempt(&mut self, _node: NodeId, _cx: &mut RuleContext<'_>) -> RectorResult<Replacement> {
//!         Ok(Replacement::Delete)
//!     }
//!
//!     fn definition(&self) -> RuleDefinition {
//!         RuleDefinition::new("Removes empty statements", vec![])
//!     }
//! }
//! ```
//!
//! # Traversal
//!
//! [`traverse`] walks a whole tree with a rule list. Inside a rule,
//! [`RuleContext::traverse_with`] walks a subtree with a closure, using the
//! same walker.

mod context;
pub mod declarations;
mod rule;
mod traverse;

pub use context::RuleContext;
pub use declarations::{
    ClassDeclaration, ClassResolver, DeclarationCollector, DeclarationTable, TraitDeclaration,
};
pub use rule::{CodeSample, Replacement, Rule, RuleDefinition};
pub use traverse::{traverse, AppliedChange, ChangeAction, TraversalReport};
