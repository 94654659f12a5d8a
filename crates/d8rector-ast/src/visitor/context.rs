// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! What a rule sees while it runs.

use std::collections::BTreeSet;

use d8rector_core::error::{RectorError, RectorResult};

use super::rule::Replacement;
use super::traverse::{AppliedChange, ChangeAction, ClosureDispatch, Walker};
use crate::capability::CapabilityIndex;
use crate::nodes::{NodeId, NodeKind};
use crate::tree::{Field, Tree};

/// Mutable view of the tree and the run-wide index handed to a rule.
pub struct RuleContext<'a> {
    tree: &'a mut Tree,
    index: &'a mut CapabilityIndex,
    rule: String,
    changes: Vec<AppliedChange>,
}

impl<'a> RuleContext<'a> {
    pub fn new(tree: &'a mut Tree, index: &'a mut CapabilityIndex) -> Self {
        RuleContext {
            tree,
            index,
            rule: String::new(),
            changes: Vec::new(),
        }
    }

    pub fn tree(&self) -> &Tree {
        self.tree
    }

    pub fn tree_mut(&mut self) -> &mut Tree {
        self.tree
    }

    pub fn index(&mut self) -> &mut CapabilityIndex {
        self.index
    }

    /// Id of the rule currently running.
    pub fn rule_id(&self) -> &str {
        &self.rule
    }

    pub(crate) fn set_rule(&mut self, id: &str) {
        if self.rule != id {
            self.rule = id.to_string();
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.tree.parent(id)
    }

    pub fn enclosing_class(&self, id: NodeId) -> Option<NodeId> {
        self.tree.enclosing_class(id)
    }

    pub fn enclosing_function(&self, id: NodeId) -> Option<NodeId> {
        self.tree.enclosing_function(id)
    }

    pub fn enclosing_namespace(&self, id: NodeId) -> Option<NodeId> {
        self.tree.enclosing_namespace(id)
    }

    /// Traits exposed by a class, inherited ones included.
    pub fn capabilities_of(&mut self, class: &str) -> &BTreeSet<String> {
        self.index.capabilities_of(class)
    }

    /// Remove a statement from its block.
    ///
    /// The block keeps a hole at the statement's position until the
    /// traversal finishes, so sibling iteration is not disturbed.
    pub fn remove_statement(&mut self, stmt: NodeId) -> RectorResult<()> {
        let slot = self
            .tree
            .slot_of(stmt)
            .filter(|slot| slot.field == Field::Stmts)
            .ok_or_else(|| RectorError::invalid_mutation(stmt.0, "not an attached statement"))?;
        let kind = self.tree.kind(stmt);
        self.tree.remove_at(slot)?;
        self.record(stmt, kind, ChangeAction::Deleted);
        Ok(())
    }

    /// Offer every node of the subtree at `root` to `f`, with the same
    /// replacement semantics as the driver.
    ///
    /// `root` itself is offered first. Changes are attributed to the
    /// current rule.
    pub fn traverse_with<F>(&mut self, root: NodeId, f: F) -> RectorResult<()>
    where
        F: FnMut(NodeId, &mut RuleContext<'_>) -> RectorResult<Replacement>,
    {
        let mut dispatch = ClosureDispatch::new(f);
        let slot = self.tree.slot_of(root);
        Walker::new(&mut dispatch).visit(self, slot, root)
    }

    pub(crate) fn record(&mut self, node: NodeId, kind: NodeKind, action: ChangeAction) {
        self.changes.push(AppliedChange {
            rule: self.rule.clone(),
            node,
            kind,
            action,
        });
    }

    pub(crate) fn into_changes(self) -> Vec<AppliedChange> {
        self.changes
    }
}
