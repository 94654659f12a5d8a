// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The rule contract.

use serde::{Deserialize, Serialize};

use d8rector_core::error::RectorResult;

use super::context::RuleContext;
use crate::nodes::{NodeId, NodeKind};

/// What a rule wants done with the node it was offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Replacement {
    /// Put this node in the offered node's slot.
    ///
    /// Returning the offered node itself means it was modified in place.
    ReplaceWith(NodeId),
    /// Remove the offered node. Only valid for statements.
    Delete,
    /// The pattern did not match.
    #[default]
    NoChange,
}

impl Replacement {
    /// Returns true for anything but `NoChange`.
    pub fn is_change(&self) -> bool {
        !matches!(self, Replacement::NoChange)
    }
}

/// A before/after example of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeSample {
    pub before: String,
    pub after: String,
}

impl CodeSample {
    pub fn new(before: impl Into<String>, after: impl Into<String>) -> Self {
        CodeSample {
            before: before.into(),
            after: after.into(),
        }
    }
}

/// Human-readable documentation of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub description: String,
    pub samples: Vec<CodeSample>,
}

impl RuleDefinition {
    pub fn new(description: impl Into<String>, samples: Vec<CodeSample>) -> Self {
        RuleDefinition {
            description: description.into(),
            samples,
        }
    }
}

/// A migration rule.
///
/// The driver offers a rule every node whose kind is in [`Rule::interest`].
/// The rule answers with a [`Replacement`]; a pattern that does not match,
/// or matches only partially, is answered with [`Replacement::NoChange`].
///
/// A rule may mutate the subtree under the offered node freely. Outside it,
/// the only permitted mutation is [`RuleContext::remove_statement`].
pub trait Rule {
    /// Stable identifier used in configuration and reports.
    fn id(&self) -> &str;

    /// Node kinds this rule is offered.
    fn interest(&self) -> &[NodeKind];

    /// Try to match and rewrite `node`.
    fn attempt(&mut self, node: NodeId, cx: &mut RuleContext<'_>) -> RectorResult<Replacement>;

    fn definition(&self) -> RuleDefinition;

    fn is_interested(&self, kind: NodeKind) -> bool {
        self.interest().contains(&kind)
    }
}
