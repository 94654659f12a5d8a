//! `l()` to `Link::fromTextAndUrl()`.
//!
//! ```php
//! l(t('About'), 'node/1', $options);
//! ```
//!
//! becomes
//!
//! ```php
//! \Drupal\Core\Link::fromTextAndUrl(t('About'), \Drupal\Core\Url::fromUri('internal:/node/1', $options))->toString();
//! ```
//!
//! Only literal paths are rewritten. A path containing `http` anywhere is
//! taken as external and passed through as is; any other path gets the
//! `internal:/` scheme.

use tracing::debug;

use d8rector_ast::{
    CodeSample, Name, NodeId, NodeKind, Replacement, Rule, RuleContext, RuleDefinition,
};
use d8rector_core::error::RectorResult;

use crate::support::{is_function, named_call, string_arg};

const INTEREST: &[NodeKind] = &[NodeKind::FuncCall];

const LINK: &str = "Drupal\\Core\\Link";
const URL: &str = "Drupal\\Core\\Url";
const INTERNAL_SCHEME: &str = "internal:/";

/// URI for a literal `l()` path.
pub fn link_uri(path: &str) -> String {
    if path.contains("http") {
        path.to_string()
    } else {
        format!("{}{}", INTERNAL_SCHEME, path)
    }
}

/// Rewrites `l($text, $path, $options)` into a rendered `Link`.
#[derive(Debug, Default, Clone)]
pub struct LinkRule;

impl LinkRule {
    pub fn new() -> Self {
        LinkRule
    }
}

impl Rule for LinkRule {
    fn id(&self) -> &str {
        "link"
    }

    fn interest(&self) -> &[NodeKind] {
        INTEREST
    }

    fn attempt(&mut self, node: NodeId, cx: &mut RuleContext<'_>) -> RectorResult<Replacement> {
        let tree = cx.tree();
        let Some((name, args)) = named_call(tree, node) else {
            return Ok(Replacement::NoChange);
        };
        if !is_function(name, "l") {
            return Ok(Replacement::NoChange);
        }
        let Some(path) = args.get(1).and_then(|arg| string_arg(tree, *arg)) else {
            debug!(node = %node, args = args.len(), "l() without a literal path left unchanged");
            return Ok(Replacement::NoChange);
        };
        let path = path.to_string();
        let text = args[0];
        let options = args.get(2).copied();

        let tree = cx.tree_mut();
        let uri = tree.string(link_uri(&path));
        let mut url_args = vec![tree.arg(uri)];
        url_args.extend(options);
        let url = tree.static_call(Name::fully_qualified(URL), "fromUri", url_args);
        let url_arg = tree.arg(url);
        let link = tree.static_call(
            Name::fully_qualified(LINK),
            "fromTextAndUrl",
            vec![text, url_arg],
        );
        let rendered = tree.method_call(link, "toString", vec![]);
        Ok(Replacement::ReplaceWith(rendered))
    }

    fn definition(&self) -> RuleDefinition {
        RuleDefinition::new(
            "Fixes deprecated l() calls",
            vec![CodeSample::new(
                "l(t('About'), 'node/1');",
                "\\Drupal\\Core\\Link::fromTextAndUrl(t('About'), \\Drupal\\Core\\Url::fromUri('internal:/node/1'))->toString();",
            )],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use d8rector_ast::codegen::render_node;
    use d8rector_ast::{traverse, CapabilityIndex, Tree};

    #[test]
    fn internal_paths_get_the_internal_scheme() {
        assert_eq!(link_uri("node/1"), "internal:/node/1");
        assert_eq!(link_uri("https://example.com"), "https://example.com");
    }

    #[test]
    fn http_anywhere_counts_as_external() {
        assert_eq!(link_uri("node/http-status"), "node/http-status");
    }

    fn l_call(tree: &mut Tree, path: NodeId, with_options: bool) -> NodeId {
        let label = tree.string("About");
        let label_args = tree.args([label]);
        let text = tree.func_call(Name::parse("t"), label_args);
        let mut values = vec![text, path];
        if with_options {
            values.push(tree.variable("options"));
        }
        let args = tree.args(values);
        let call = tree.func_call(Name::parse("l"), args);
        let stmt = tree.expression(call);
        let root = tree.root();
        tree.push_stmt(root, stmt).unwrap();
        stmt
    }

    fn run(tree: &mut Tree) -> usize {
        let mut rules: Vec<Box<dyn Rule>> = vec![Box::new(LinkRule::new())];
        let mut index = CapabilityIndex::default();
        traverse(tree, &mut rules, &mut index).unwrap().len()
    }

    #[test]
    fn options_are_forwarded_to_from_uri() {
        let mut tree = Tree::new();
        let path = tree.string("node/1");
        let stmt = l_call(&mut tree, path, true);
        run(&mut tree);
        assert_eq!(
            render_node(&tree, stmt),
            "\\Drupal\\Core\\Link::fromTextAndUrl(t('About'), \\Drupal\\Core\\Url::fromUri('internal:/node/1', $options))->toString();"
        );
    }

    #[test]
    fn variable_path_is_left_alone() {
        let mut tree = Tree::new();
        let path = tree.variable("path");
        let stmt = l_call(&mut tree, path, false);
        assert_eq!(run(&mut tree), 0);
        assert_eq!(render_node(&tree, stmt), "l(t('About'), $path);");
    }
}
