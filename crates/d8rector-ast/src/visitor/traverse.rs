// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The traversal driver.
//!
//! # Order
//!
//! Depth-first, pre-order. Children are visited field by field in source
//! order; statements in block order. A node is offered to the rules before
//! its children, so a rule interested in a container sees the container's
//! statements before any rule interested in those statements does.
//!
//! # Dispatch
//!
//! For each node, the rules interested in its kind are tried in
//! registration order and the first answer other than
//! [`Replacement::NoChange`] wins. What happens next depends on the answer:
//!
//! - `ReplaceWith(new)` with a different node: `new` is spliced into the
//!   slot and linked, then offered to the rules that have not fired on this
//!   slot yet. A rule fires at most once per slot, which bounds re-dispatch.
//!   The walk then descends into whatever finally occupies the slot.
//! - `ReplaceWith(same)`: modified in place; the walk descends into it.
//! - `Delete`: the statement is removed (leaving a hole) and the walk moves
//!   on to the next sibling without touching it again.
//!
//! Field lengths and slots are re-read at every step, so a rule may mutate
//! the block currently being walked. No node is offered twice in one
//! traversal; wrapping a node inside its own replacement cannot recurse.
//! A node met again inside its replacement is not offered, but its children
//! are still walked, once.

use std::collections::HashSet;

use tracing::debug;

use d8rector_core::error::{RectorError, RectorResult};
use d8rector_core::output::ChangeInfo;

use super::context::RuleContext;
use super::rule::{Replacement, Rule};
use crate::capability::CapabilityIndex;
use crate::nodes::{NodeId, NodeKind};
use crate::tree::{Field, Slot, Tree};

// ============================================================================
// Report
// ============================================================================

/// What happened to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeAction {
    /// Another node took its slot.
    Replaced { with: NodeId, kind: NodeKind },
    /// Changed in place.
    Modified,
    /// Removed from its block.
    Deleted,
}

impl ChangeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeAction::Replaced { .. } => "replaced",
            ChangeAction::Modified => "modified",
            ChangeAction::Deleted => "deleted",
        }
    }
}

/// One change made by a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedChange {
    pub rule: String,
    pub node: NodeId,
    pub kind: NodeKind,
    pub action: ChangeAction,
}

impl AppliedChange {
    pub fn to_change_info(&self) -> ChangeInfo {
        let replacement = match self.action {
            ChangeAction::Replaced { kind, .. } => Some(kind.to_string()),
            _ => None,
        };
        ChangeInfo {
            rule: self.rule.clone(),
            node: self.node.0,
            kind: self.kind.to_string(),
            action: self.action.as_str().to_string(),
            replacement,
        }
    }
}

/// Changes made during one traversal, in application order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraversalReport {
    pub changes: Vec<AppliedChange>,
}

impl TraversalReport {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Changes made by one rule.
    pub fn by_rule<'r>(&'r self, rule: &'r str) -> impl Iterator<Item = &'r AppliedChange> + 'r {
        self.changes.iter().filter(move |change| change.rule == rule)
    }

    pub fn change_infos(&self) -> Vec<ChangeInfo> {
        self.changes.iter().map(AppliedChange::to_change_info).collect()
    }
}

// ============================================================================
// Entry point
// ============================================================================

/// Run `rules` over the whole tree.
///
/// Holes left by deletions are compacted once the walk finishes. If a rule
/// fails, the error is returned as is and the tree is left as far as the
/// walk got; callers discard it.
pub fn traverse(
    tree: &mut Tree,
    rules: &mut [Box<dyn Rule>],
    index: &mut CapabilityIndex,
) -> RectorResult<TraversalReport> {
    let root = tree.root();
    let changes = {
        let mut cx = RuleContext::new(tree, index);
        let mut dispatch = RulesDispatch { rules };
        Walker::new(&mut dispatch).visit(&mut cx, None, root)?;
        cx.into_changes()
    };
    tree.compact();
    Ok(TraversalReport { changes })
}

// ============================================================================
// Dispatch
// ============================================================================

/// A set of handlers the walker offers nodes to.
pub(crate) trait Dispatch {
    fn handlers(&self) -> usize;
    fn accepts(&self, handler: usize, kind: NodeKind) -> bool;
    fn attempt(
        &mut self,
        handler: usize,
        node: NodeId,
        cx: &mut RuleContext<'_>,
    ) -> RectorResult<Replacement>;
}

struct RulesDispatch<'r> {
    rules: &'r mut [Box<dyn Rule>],
}

impl Dispatch for RulesDispatch<'_> {
    fn handlers(&self) -> usize {
        self.rules.len()
    }

    fn accepts(&self, handler: usize, kind: NodeKind) -> bool {
        self.rules[handler].is_interested(kind)
    }

    fn attempt(
        &mut self,
        handler: usize,
        node: NodeId,
        cx: &mut RuleContext<'_>,
    ) -> RectorResult<Replacement> {
        let rule = &mut self.rules[handler];
        cx.set_rule(rule.id());
        rule.attempt(node, cx)
    }
}

/// A single closure offered every node.
pub(crate) struct ClosureDispatch<F> {
    f: F,
}

impl<F> ClosureDispatch<F> {
    pub(crate) fn new(f: F) -> Self {
        ClosureDispatch { f }
    }
}

impl<F> Dispatch for ClosureDispatch<F>
where
    F: FnMut(NodeId, &mut RuleContext<'_>) -> RectorResult<Replacement>,
{
    fn handlers(&self) -> usize {
        1
    }

    fn accepts(&self, _handler: usize, _kind: NodeKind) -> bool {
        true
    }

    fn attempt(
        &mut self,
        _handler: usize,
        node: NodeId,
        cx: &mut RuleContext<'_>,
    ) -> RectorResult<Replacement> {
        (self.f)(node, cx)
    }
}

// ============================================================================
// Walker
// ============================================================================

pub(crate) struct Walker<'d> {
    dispatch: &'d mut dyn Dispatch,
    offered: HashSet<NodeId>,
    walked: HashSet<NodeId>,
}

impl<'d> Walker<'d> {
    pub(crate) fn new(dispatch: &'d mut dyn Dispatch) -> Self {
        Walker {
            dispatch,
            offered: HashSet::new(),
            walked: HashSet::new(),
        }
    }

    /// Offer `node`, found at `slot` (`None` for the root), then walk
    /// whatever occupies the slot afterwards.
    pub(crate) fn visit(
        &mut self,
        cx: &mut RuleContext<'_>,
        slot: Option<Slot>,
        node: NodeId,
    ) -> RectorResult<()> {
        let mut current = node;
        let mut fired = Vec::new();
        loop {
            if !self.offered.insert(current) {
                break;
            }
            let Some((handler, replacement)) = self.offer(cx, current, &fired)? else {
                break;
            };
            fired.push(handler);
            let kind = cx.tree().kind(current);
            match replacement {
                Replacement::ReplaceWith(new) if new == current => {
                    debug!(rule = cx.rule_id(), node = %current, %kind, "modified");
                    cx.record(current, kind, ChangeAction::Modified);
                    break;
                }
                Replacement::ReplaceWith(new) => {
                    splice(cx, slot, current, new)?;
                    let new_kind = cx.tree().kind(new);
                    debug!(
                        rule = cx.rule_id(),
                        node = %current,
                        %kind,
                        replacement = %new_kind,
                        "replaced"
                    );
                    cx.record(
                        current,
                        kind,
                        ChangeAction::Replaced {
                            with: new,
                            kind: new_kind,
                        },
                    );
                    current = new;
                }
                Replacement::Delete => {
                    let slot = slot.filter(|s| s.field == Field::Stmts).ok_or_else(|| {
                        RectorError::invalid_mutation(
                            current.0,
                            format!("cannot delete {} outside a statement list", kind),
                        )
                    })?;
                    cx.tree_mut().remove_at(slot)?;
                    debug!(rule = cx.rule_id(), node = %current, %kind, "deleted");
                    cx.record(current, kind, ChangeAction::Deleted);
                    return Ok(());
                }
                Replacement::NoChange => break,
            }
        }
        if !self.walked.insert(current) {
            return Ok(());
        }
        self.walk_children(cx, current)
    }

    fn walk_children(&mut self, cx: &mut RuleContext<'_>, parent: NodeId) -> RectorResult<()> {
        for field in cx.tree().fields(parent) {
            let mut position = 0;
            while position < cx.tree().field_len(parent, *field) {
                let slot = Slot::new(parent, *field, position);
                if let Some(child) = cx.tree().child_at(slot) {
                    self.visit(cx, Some(slot), child)?;
                }
                position += 1;
            }
        }
        Ok(())
    }

    /// First handler, skipping those in `fired`, that changes `node`.
    fn offer(
        &mut self,
        cx: &mut RuleContext<'_>,
        node: NodeId,
        fired: &[usize],
    ) -> RectorResult<Option<(usize, Replacement)>> {
        let kind = cx.tree().kind(node);
        for handler in 0..self.dispatch.handlers() {
            if fired.contains(&handler) || !self.dispatch.accepts(handler, kind) {
                continue;
            }
            let replacement = self.dispatch.attempt(handler, node, cx)?;
            if replacement.is_change() {
                return Ok(Some((handler, replacement)));
            }
        }
        Ok(None)
    }
}

fn splice(
    cx: &mut RuleContext<'_>,
    slot: Option<Slot>,
    old: NodeId,
    new: NodeId,
) -> RectorResult<()> {
    match slot {
        Some(slot) => {
            cx.tree_mut().replace_at(slot, new)?;
        }
        None if cx.tree().root() == old => cx.tree_mut().set_root(new),
        None => {
            return Err(RectorError::invalid_mutation(
                old.0,
                "cannot replace a detached node",
            ))
        }
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
