//! Collapse of the `get_t()` translation handle.
//!
//! ```php
//! $t = get_t();
//! $title = $t('Welcome');
//! ```
//!
//! becomes `t('Welcome');`. The handle statement is deleted and every later
//! call through a recorded handle is replaced by a direct `t()` call with the
//! same arguments. Only the function's own top-level statements are scanned.

use std::collections::BTreeSet;

use tracing::debug;

use d8rector_ast::{
    Callee, CodeSample, Name, Node, NodeId, NodeKind, Replacement, Rule, RuleContext,
    RuleDefinition, Slot, Tree,
};
use d8rector_core::error::RectorResult;

use crate::support::{is_function, named_call};

const INTEREST: &[NodeKind] = &[NodeKind::Function];

/// Variable name assigned by `$h = get_t();`.
fn factory_handle(tree: &Tree, stmt: NodeId) -> Option<String> {
    let Node::Expression { expr } = tree.node(stmt) else {
        return None;
    };
    let Node::Assign { var, expr } = tree.node(*expr) else {
        return None;
    };
    let Node::Variable { name } = tree.node(*var) else {
        return None;
    };
    let (function, _) = named_call(tree, *expr)?;
    is_function(function, "get_t").then(|| name.clone())
}

/// Arguments of `$h(...);` or `$x = $h(...);` when `$h` is a recorded handle.
fn handle_call_args(tree: &Tree, stmt: NodeId, handles: &BTreeSet<String>) -> Option<Vec<NodeId>> {
    let Node::Expression { expr } = tree.node(stmt) else {
        return None;
    };
    let call = match tree.node(*expr) {
        Node::Assign { expr, .. } => *expr,
        _ => *expr,
    };
    let Node::FuncCall {
        callee: Callee::Dynamic(handle),
        args,
    } = tree.node(call)
    else {
        return None;
    };
    let Node::Variable { name } = tree.node(*handle) else {
        return None;
    };
    handles.contains(name).then(|| args.clone())
}

/// Replaces calls through a `get_t()` handle with `t()`.
#[derive(Debug, Default, Clone)]
pub struct GetTRule;

impl GetTRule {
    pub fn new() -> Self {
        GetTRule
    }
}

impl Rule for GetTRule {
    fn id(&self) -> &str {
        "get_t"
    }

    fn interest(&self) -> &[NodeKind] {
        INTEREST
    }

    fn attempt(&mut self, node: NodeId, cx: &mut RuleContext<'_>) -> RectorResult<Replacement> {
        let stmts: Vec<(usize, NodeId)> = cx
            .tree()
            .node(node)
            .stmts()
            .map(|stmts| stmts.iter_positions().collect())
            .unwrap_or_default();

        // Reassigning a handle does not untrack it.
        let mut handles = BTreeSet::new();
        let mut changed = false;
        for (position, stmt) in stmts {
            if let Some(handle) = factory_handle(cx.tree(), stmt) {
                debug!(handle = %handle, "found get_t() handle");
                handles.insert(handle);
                cx.remove_statement(stmt)?;
                changed = true;
                continue;
            }
            if handles.is_empty() {
                continue;
            }
            if let Some(args) = handle_call_args(cx.tree(), stmt, &handles) {
                let tree = cx.tree_mut();
                let call = tree.func_call(Name::unqualified("t"), args);
                let direct = tree.expression(call);
                tree.replace_at(Slot::stmt(node, position), direct)?;
                changed = true;
            }
        }

        if changed {
            Ok(Replacement::ReplaceWith(node))
        } else {
            Ok(Replacement::NoChange)
        }
    }

    fn definition(&self) -> RuleDefinition {
        RuleDefinition::new(
            "Fixes deprecated get_t() calls",
            vec![CodeSample::new(
                "$t = get_t();\n$title = $t('Welcome');",
                "t('Welcome');",
            )],
        )
    }
}
