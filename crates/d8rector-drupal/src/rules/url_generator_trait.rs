//! Removal of `Drupal\Core\Routing\UrlGeneratorTrait`.
//!
//! The rule runs once per namespace. When the first class declared there
//! exposes the trait (directly or through an ancestor), every call of a trait
//! member inside the class is rewritten:
//!
//! | Call | Replacement |
//! |------|-------------|
//! | `redirect($route, $params, $options, $status)` | `new RedirectResponse(Url::fromRoute($route, $params, $options), $status)` |
//! | `url(...)` | `Url::fromRoute(...)` |
//! | `getUrlGenerator()` | `\Drupal::service('url_generator')` |
//! | `setUrlGenerator($g)` | `$this`; `$this->setUrlGenerator($g);` alone is deleted |
//!
//! A member with no entry in this table aborts the unit with
//! [`RectorError::RewriteTableExhausted`]. Afterwards the trait is dropped
//! from the class and the replacement classes are imported.

use tracing::debug;

use d8rector_ast::{
    ensure_import, plan_import, remove_import, CodeSample, Name, NameContext, Node, NodeId,
    NodeKind, Replacement, Rule, RuleContext, RuleDefinition, Tree, Visibility,
};
use d8rector_core::config::UrlGeneratorOptions;
use d8rector_core::error::{RectorError, RectorResult};

use crate::support::{method_call, service_lookup};

pub const URL_GENERATOR_TRAIT: &str = "Drupal\\Core\\Routing\\UrlGeneratorTrait";
const URL: &str = "Drupal\\Core\\Url";
const REDIRECT_RESPONSE: &str = "Symfony\\Component\\HttpFoundation\\RedirectResponse";

/// Trait members assumed when the trait's declaration is not among the
/// loaded units.
pub const DEFAULT_MEMBERS: &[&str] = &["redirect", "url", "getUrlGenerator", "setUrlGenerator"];

const PROPERTY: &str = "urlGenerator";
const PROPERTY_DOC: &str = "/**
 * The url generator.
 *
 * @var \\Drupal\\Core\\Routing\\UrlGeneratorInterface
 */";

const INTEREST: &[NodeKind] = &[NodeKind::Namespace];

/// Class references for generated code.
struct Targets {
    url: Name,
    redirect_response: Name,
}

/// What the member rewrite pass saw.
#[derive(Debug, Default)]
struct Scan {
    /// At least one member call was rewritten or deleted.
    used: bool,
    /// A member call was left in place because it could not be rewritten.
    malformed: bool,
}

/// Rewrites usages of the deprecated URL generator trait.
#[derive(Debug, Default, Clone)]
pub struct UrlGeneratorTraitRule {
    options: UrlGeneratorOptions,
}

impl UrlGeneratorTraitRule {
    pub fn new(options: UrlGeneratorOptions) -> Self {
        UrlGeneratorTraitRule { options }
    }

    fn reference(&self, tree: &Tree, namespace: NodeId, fqcn: &str) -> Name {
        if self.options.replace_with_fqn {
            Name::fully_qualified(fqcn)
        } else {
            plan_import(tree, namespace, fqcn).reference(fqcn)
        }
    }
}

fn first_class(tree: &Tree, namespace: NodeId) -> Option<(NodeId, String)> {
    tree.preorder(namespace)
        .into_iter()
        .find_map(|id| match tree.node(id) {
            Node::Class { name, .. } => Some((id, name.clone())),
            _ => None,
        })
}

/// Returns true for a method call on `$this`.
fn called_on_this(tree: &Tree, call: NodeId) -> bool {
    match tree.node(call) {
        Node::MethodCall { var, .. } => {
            matches!(tree.node(*var), Node::Variable { name } if name == "this")
        }
        _ => false,
    }
}

fn rewrite_member(
    id: NodeId,
    cx: &mut RuleContext<'_>,
    members: &[String],
    targets: &Targets,
    scan: &mut Scan,
) -> RectorResult<Replacement> {
    let is_member = |name: &str| members.iter().any(|m| m == name);
    let tree = cx.tree();

    if let Node::Expression { expr } = tree.node(id) {
        let standalone_setter = method_call(tree, *expr)
            .is_some_and(|(name, _)| name == "setUrlGenerator" && is_member(name))
            && called_on_this(tree, *expr);
        if standalone_setter {
            scan.used = true;
            return Ok(Replacement::Delete);
        }
        return Ok(Replacement::NoChange);
    }

    let Some((name, args)) = method_call(tree, id) else {
        return Ok(Replacement::NoChange);
    };
    if !is_member(name) {
        return Ok(Replacement::NoChange);
    }
    let name = name.to_string();
    let args = args.to_vec();

    let tree = cx.tree_mut();
    let replacement = match name.as_str() {
        "redirect" => {
            if args.is_empty() {
                debug!(node = %id, "redirect() without a route left unchanged");
                scan.malformed = true;
                return Ok(Replacement::NoChange);
            }
            let route_args = args[..args.len().min(3)].to_vec();
            let from_route = tree.static_call(targets.url.clone(), "fromRoute", route_args);
            let mut response_args = vec![tree.arg(from_route)];
            response_args.extend(args.get(3).copied());
            tree.new_object(targets.redirect_response.clone(), response_args)
        }
        "url" => tree.static_call(targets.url.clone(), "fromRoute", args),
        "getUrlGenerator" => service_lookup(tree, "url_generator"),
        "setUrlGenerator" => tree.this(),
        other => {
            return Err(RectorError::unhandled_member(
                cx.rule_id(),
                URL_GENERATOR_TRAIT,
                other,
            ))
        }
    };
    scan.used = true;
    Ok(Replacement::ReplaceWith(replacement))
}

/// Drop the trait from the class's `use` lists. Returns true if it was
/// listed there.
fn remove_trait_use(cx: &mut RuleContext<'_>, class: NodeId) -> RectorResult<bool> {
    let context = NameContext::for_node(cx.tree(), class);
    let trait_uses: Vec<NodeId> = cx
        .tree()
        .stmts(class)
        .into_iter()
        .filter(|id| cx.tree().kind(*id) == NodeKind::TraitUse)
        .collect();

    let mut removed = false;
    for stmt in trait_uses {
        let Node::TraitUse { traits } = cx.tree_mut().node_mut(stmt) else {
            continue;
        };
        let before = traits.len();
        traits.retain(|t| !context.resolve_class(t).eq_ignore_ascii_case(URL_GENERATOR_TRAIT));
        if traits.len() == before {
            continue;
        }
        removed = true;
        if traits.is_empty() {
            cx.remove_statement(stmt)?;
        }
    }
    Ok(removed)
}

fn has_property(tree: &Tree, class: NodeId, property: &str) -> bool {
    tree.stmts(class)
        .into_iter()
        .any(|id| matches!(tree.node(id), Node::Property { name, .. } if name == property))
}

/// Slot position of the first method, or the end of the class body.
fn first_method_position(tree: &Tree, class: NodeId) -> usize {
    tree.node(class)
        .stmts()
        .map(|stmts| {
            stmts
                .iter_positions()
                .find(|(_, id)| tree.kind(*id) == NodeKind::ClassMethod)
                .map(|(position, _)| position)
                .unwrap_or_else(|| stmts.slot_count())
        })
        .unwrap_or(0)
}

impl Rule for UrlGeneratorTraitRule {
    fn id(&self) -> &str {
        "url_generator_trait"
    }

    fn interest(&self) -> &[NodeKind] {
        INTEREST
    }

    fn attempt(&mut self, node: NodeId, cx: &mut RuleContext<'_>) -> RectorResult<Replacement> {
        let Some((class, short)) = first_class(cx.tree(), node) else {
            return Ok(Replacement::NoChange);
        };
        let fqcn = NameContext::for_node(cx.tree(), node).qualify(&short);
        if !cx.index().uses_capability(&fqcn, URL_GENERATOR_TRAIT) {
            return Ok(Replacement::NoChange);
        }
        let members = cx
            .index()
            .trait_members(URL_GENERATOR_TRAIT)
            .unwrap_or_else(|| DEFAULT_MEMBERS.iter().map(|m| m.to_string()).collect());
        let targets = Targets {
            url: self.reference(cx.tree(), node, URL),
            redirect_response: self.reference(cx.tree(), node, REDIRECT_RESPONSE),
        };

        let mut scan = Scan::default();
        cx.traverse_with(class, |id, cx| {
            rewrite_member(id, cx, &members, &targets, &mut scan)
        })?;
        debug!(class = %fqcn, used = scan.used, malformed = scan.malformed, "rewrote url generator calls");

        let mut changed = scan.used;
        if !scan.malformed && remove_trait_use(cx, class)? {
            remove_import(cx.tree_mut(), node, URL_GENERATOR_TRAIT)?;
            changed = true;
        }
        if scan.used && !self.options.replace_with_fqn {
            changed |= ensure_import(cx.tree_mut(), node, URL)?;
            changed |= ensure_import(cx.tree_mut(), node, REDIRECT_RESPONSE)?;
        }
        if scan.used
            && self.options.add_url_generator_property
            && !has_property(cx.tree(), class, PROPERTY)
        {
            let position = first_method_position(cx.tree(), class);
            let tree = cx.tree_mut();
            let property = tree.property(PROPERTY, Visibility::Protected, Some(PROPERTY_DOC));
            tree.insert_stmt(class, position, property)?;
            changed = true;
        }

        if changed {
            Ok(Replacement::ReplaceWith(node))
        } else {
            Ok(Replacement::NoChange)
        }
    }

    fn definition(&self) -> RuleDefinition {
        RuleDefinition::new(
            "Removes usages of deprecated Drupal\\Core\\Routing\\UrlGeneratorTrait trait",
            vec![CodeSample::new(
                "class ExampleForm extends FormBase
{
    use UrlGeneratorTrait;

    public function submitForm($form, $form_state)
    {
        return $this->redirect('user.page');
    }
}",
                "class ExampleForm extends FormBase
{
    public function submitForm($form, $form_state)
    {
        return new RedirectResponse(Url::fromRoute('user.page'));
    }
}",
            )],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use d8rector_ast::codegen::render;
    use d8rector_ast::{traverse, CapabilityIndex, DeclarationTable, TraitDeclaration};
    use d8rector_core::error::OutputErrorCode;

    /// `namespace Drupal\mymodule; use ...UrlGeneratorTrait; class Foo { use
    /// UrlGeneratorTrait; public function build() { <body> } }`
    fn unit(tree: &mut Tree, body: Vec<NodeId>) -> NodeId {
        let import = tree.use_stmt(&[URL_GENERATOR_TRAIT]);
        let trait_use = tree.trait_use(vec![Name::parse("UrlGeneratorTrait")]);
        let method = tree.class_method("build", Visibility::Public, &[], body);
        let class = tree.class("Foo", None, vec![trait_use, method]);
        let namespace = tree.namespace(Some("Drupal\\mymodule"), vec![import, class]);
        let root = tree.root();
        tree.push_stmt(root, namespace).unwrap();
        namespace
    }

    fn this_call(tree: &mut Tree, method: &str, args: Vec<NodeId>) -> NodeId {
        let this = tree.this();
        let args = tree.args(args);
        tree.method_call(this, method, args)
    }

    fn returning(tree: &mut Tree, expr: NodeId) -> NodeId {
        tree.ret(Some(expr))
    }

    fn index_for(tree: &Tree) -> CapabilityIndex {
        CapabilityIndex::new(DeclarationTable::collect([tree]))
    }

    fn run(tree: &mut Tree, options: UrlGeneratorOptions) -> RectorResult<usize> {
        let mut index = index_for(tree);
        let mut rules: Vec<Box<dyn Rule>> = vec![Box::new(UrlGeneratorTraitRule::new(options))];
        traverse(tree, &mut rules, &mut index).map(|report| report.len())
    }

    #[test]
    fn redirect_becomes_redirect_response_with_imports() {
        let mut tree = Tree::new();
        let route = tree.string("user.page");
        let params = tree.variable("params");
        let options = tree.variable("options");
        let status = tree.int(302);
        let call = this_call(&mut tree, "redirect", vec![route, params, options, status]);
        let body = vec![returning(&mut tree, call)];
        unit(&mut tree, body);

        run(&mut tree, UrlGeneratorOptions::default()).unwrap();
        let source = render(&tree);
        assert!(source.contains(
            "return new RedirectResponse(Url::fromRoute('user.page', $params, $options), 302);"
        ));
        assert!(source.contains("use Drupal\\Core\\Url;\nuse Symfony\\Component\\HttpFoundation\\RedirectResponse;"));
        assert!(!source.contains("UrlGeneratorTrait"));
    }

    #[test]
    fn url_getter_and_setter_rewrites() {
        let mut tree = Tree::new();
        let route = tree.string("entity.node.canonical");
        let url = this_call(&mut tree, "url", vec![route]);
        let url_stmt = {
            let var = tree.variable("link");
            let assign = tree.assign(var, url);
            tree.expression(assign)
        };
        let generator = this_call(&mut tree, "getUrlGenerator", vec![]);
        let generator_stmt = {
            let var = tree.variable("generator");
            let assign = tree.assign(var, generator);
            tree.expression(assign)
        };
        let value = tree.variable("generator");
        let setter = this_call(&mut tree, "setUrlGenerator", vec![value]);
        let setter_stmt = tree.expression(setter);
        let value = tree.variable("generator");
        let chained = this_call(&mut tree, "setUrlGenerator", vec![value]);
        let chained_stmt = returning(&mut tree, chained);
        unit(
            &mut tree,
            vec![url_stmt, generator_stmt, setter_stmt, chained_stmt],
        );

        run(&mut tree, UrlGeneratorOptions::default()).unwrap();
        let source = render(&tree);
        assert!(source.contains("$link = Url::fromRoute('entity.node.canonical');"));
        assert!(source.contains("$generator = \\Drupal::service('url_generator');"));
        assert!(!source.contains("setUrlGenerator"));
        assert!(source.contains("return $this;"));
    }

    #[test]
    fn standalone_setter_on_another_receiver_is_kept_as_a_statement() {
        let mut tree = Tree::new();
        let receiver = tree.variable("form");
        let value = tree.variable("generator");
        let args = tree.args([value]);
        let setter = tree.method_call(receiver, "setUrlGenerator", args);
        let setter_stmt = tree.expression(setter);
        unit(&mut tree, vec![setter_stmt]);

        run(&mut tree, UrlGeneratorOptions::default()).unwrap();
        let source = render(&tree);
        assert!(source.contains("$this;"), "{}", source);
        assert!(!source.contains("setUrlGenerator"));
    }

    #[test]
    fn existing_import_alias_is_reused() {
        let mut tree = Tree::new();
        let route = tree.string("user.page");
        let call = this_call(&mut tree, "url", vec![route]);
        let body = vec![returning(&mut tree, call)];
        let namespace = unit(&mut tree, body);
        let mut aliased = d8rector_ast::UseItem::new(URL);
        aliased.alias = Some("CoreUrl".to_string());
        let import = tree.alloc(Node::Use {
            uses: vec![aliased],
        });
        tree.insert_stmt(namespace, 0, import).unwrap();

        run(&mut tree, UrlGeneratorOptions::default()).unwrap();
        let source = render(&tree);
        assert!(source.contains("return CoreUrl::fromRoute('user.page');"));
        assert_eq!(source.matches("Drupal\\Core\\Url").count(), 1);
    }

    #[test]
    fn fqn_mode_adds_no_imports() {
        let mut tree = Tree::new();
        let route = tree.string("user.page");
        let call = this_call(&mut tree, "redirect", vec![route]);
        let body = vec![returning(&mut tree, call)];
        unit(&mut tree, body);

        let options = UrlGeneratorOptions {
            replace_with_fqn: true,
            add_url_generator_property: false,
        };
        run(&mut tree, options).unwrap();
        let source = render(&tree);
        assert!(source.contains(
            "return new \\Symfony\\Component\\HttpFoundation\\RedirectResponse(\\Drupal\\Core\\Url::fromRoute('user.page'));"
        ));
        assert!(!source.contains("use Drupal\\Core\\Url;"));
    }

    #[test]
    fn property_is_added_before_first_method() {
        let mut tree = Tree::new();
        let call = this_call(&mut tree, "getUrlGenerator", vec![]);
        let body = vec![returning(&mut tree, call)];
        unit(&mut tree, body);

        let options = UrlGeneratorOptions {
            replace_with_fqn: false,
            add_url_generator_property: true,
        };
        run(&mut tree, options).unwrap();
        let source = render(&tree);
        let expected = "{
    /**
     * The url generator.
     *
     * @var \\Drupal\\Core\\Routing\\UrlGeneratorInterface
     */
    protected $urlGenerator;

    public function build()";
        assert!(source.contains(expected), "{}", source);
    }

    #[test]
    fn malformed_redirect_keeps_the_trait() {
        let mut tree = Tree::new();
        let call = this_call(&mut tree, "redirect", vec![]);
        let body = vec![returning(&mut tree, call)];
        unit(&mut tree, body);

        assert_eq!(run(&mut tree, UrlGeneratorOptions::default()).unwrap(), 0);
        let source = render(&tree);
        assert!(source.contains("return $this->redirect();"));
        assert!(source.contains("    use UrlGeneratorTrait;"));
    }

    #[test]
    fn unknown_member_aborts_the_unit() {
        let mut tree = Tree::new();
        let call = this_call(&mut tree, "getRouteName", vec![]);
        let body = vec![returning(&mut tree, call)];
        unit(&mut tree, body);

        let mut table = DeclarationTable::collect([&tree]);
        let mut members: Vec<String> = DEFAULT_MEMBERS.iter().map(|m| m.to_string()).collect();
        members.push("getRouteName".to_string());
        table.insert_trait(TraitDeclaration {
            name: URL_GENERATOR_TRAIT.to_string(),
            members,
            traits: vec![],
        });
        let mut index = CapabilityIndex::new(table);
        let mut rules: Vec<Box<dyn Rule>> =
            vec![Box::new(UrlGeneratorTraitRule::default())];
        let err = traverse(&mut tree, &mut rules, &mut index).unwrap_err();
        assert_eq!(err.error_code(), OutputErrorCode::RewriteAborted);
        assert!(err.to_string().contains("getRouteName"));
    }

    #[test]
    fn class_without_trait_is_ignored() {
        let mut tree = Tree::new();
        let call = this_call(&mut tree, "url", vec![]);
        let ret = returning(&mut tree, call);
        let method = tree.class_method("build", Visibility::Public, &[], vec![ret]);
        let class = tree.class("Plain", None, vec![method]);
        let namespace = tree.namespace(Some("Drupal\\mymodule"), vec![class]);
        let root = tree.root();
        tree.push_stmt(root, namespace).unwrap();

        assert_eq!(run(&mut tree, UrlGeneratorOptions::default()).unwrap(), 0);
        assert!(render(&tree).contains("return $this->url();"));
    }

    #[test]
    fn second_run_changes_nothing() {
        let mut tree = Tree::new();
        let route = tree.string("user.page");
        let call = this_call(&mut tree, "redirect", vec![route]);
        let body = vec![returning(&mut tree, call)];
        unit(&mut tree, body);

        run(&mut tree, UrlGeneratorOptions::default()).unwrap();
        let first = render(&tree);
        assert_eq!(run(&mut tree, UrlGeneratorOptions::default()).unwrap(), 0);
        assert_eq!(render(&tree), first);
    }
}
