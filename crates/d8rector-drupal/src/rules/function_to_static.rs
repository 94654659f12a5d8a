//! Free function to static method renames.
//!
//! `check_plain($text)` becomes `\Drupal\Component\Utility\Html::escape($text)`.
//! The argument list moves to the new call untouched.

use d8rector_ast::{
    CodeSample, Name, NodeId, NodeKind, Replacement, Rule, RuleContext, RuleDefinition,
};
use d8rector_core::config::FunctionRenameConfig;
use d8rector_core::error::RectorResult;

use crate::support::{is_function, named_call};

const INTEREST: &[NodeKind] = &[NodeKind::FuncCall];

/// One function and the static method replacing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticCallTarget {
    pub function: String,
    /// Fully qualified class, without a leading backslash.
    pub class: String,
    pub method: String,
}

impl StaticCallTarget {
    pub fn new(function: &str, class: &str, method: &str) -> Self {
        StaticCallTarget {
            function: function.to_string(),
            class: class.trim_start_matches('\\').to_string(),
            method: method.to_string(),
        }
    }
}

/// Rewrites calls of deprecated functions into static calls.
#[derive(Debug, Clone)]
pub struct FunctionToStaticCallRule {
    id: String,
    description: String,
    targets: Vec<StaticCallTarget>,
}

impl FunctionToStaticCallRule {
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        targets: Vec<StaticCallTarget>,
    ) -> Self {
        FunctionToStaticCallRule {
            id: id.into(),
            description: description.into(),
            targets,
        }
    }

    /// `check_plain()` to `Html::escape()`.
    pub fn check_plain() -> Self {
        Self::new(
            "check_plain",
            "Fixes deprecated check_plain() calls",
            vec![StaticCallTarget::new(
                "check_plain",
                "Drupal\\Component\\Utility\\Html",
                "escape",
            )],
        )
    }

    /// `drupal_strtolower()` and `drupal_strtoupper()` to their `Unicode`
    /// counterparts.
    pub fn unicode_case() -> Self {
        Self::new(
            "unicode_case",
            "Fixes deprecated drupal_strtolower() and drupal_strtoupper() calls",
            vec![
                StaticCallTarget::new(
                    "drupal_strtolower",
                    "Drupal\\Component\\Utility\\Unicode",
                    "strtolower",
                ),
                StaticCallTarget::new(
                    "drupal_strtoupper",
                    "Drupal\\Component\\Utility\\Unicode",
                    "strtoupper",
                ),
            ],
        )
    }

    /// All configured renames, as a single rule.
    pub fn from_config(renames: &[FunctionRenameConfig]) -> Self {
        let targets = renames
            .iter()
            .map(|r| StaticCallTarget::new(&r.function, &r.class, &r.method))
            .collect();
        Self::new(
            "function_renames",
            "Renames configured functions to static method calls",
            targets,
        )
    }

    pub fn targets(&self) -> &[StaticCallTarget] {
        &self.targets
    }
}

impl Rule for FunctionToStaticCallRule {
    fn id(&self) -> &str {
        &self.id
    }

    fn interest(&self) -> &[NodeKind] {
        INTEREST
    }

    fn attempt(&mut self, node: NodeId, cx: &mut RuleContext<'_>) -> RectorResult<Replacement> {
        let Some((name, args)) = named_call(cx.tree(), node) else {
            return Ok(Replacement::NoChange);
        };
        let Some(target) = self.targets.iter().find(|t| is_function(name, &t.function)) else {
            return Ok(Replacement::NoChange);
        };
        let args = args.to_vec();
        let class = Name::fully_qualified(&target.class);
        let call = cx.tree_mut().static_call(class, &target.method, args);
        Ok(Replacement::ReplaceWith(call))
    }

    fn definition(&self) -> RuleDefinition {
        let samples = self
            .targets
            .iter()
            .map(|t| {
                CodeSample::new(
                    format!("{}($text);", t.function),
                    format!("\\{}::{}($text);", t.class, t.method),
                )
            })
            .collect();
        RuleDefinition::new(self.description.clone(), samples)
    }
}
