//! Matching and construction helpers shared by the rules.

use d8rector_ast::{Callee, Name, Node, NodeId, Tree};

/// The global service container class.
pub const DRUPAL: &str = "Drupal";

/// Name and arguments of a call whose callee is written as a name.
///
/// Dynamic callees (`$handle(...)`) never match.
pub fn named_call(tree: &Tree, id: NodeId) -> Option<(&Name, &[NodeId])> {
    match tree.node(id) {
        Node::FuncCall {
            callee: Callee::Name(name),
            args,
        } => Some((name, args)),
        _ => None,
    }
}

/// Returns true if `name` calls the global function `function`.
///
/// PHP function names are case-insensitive. A leading backslash does not
/// change the function called; any other namespace prefix does.
pub fn is_function(name: &Name, function: &str) -> bool {
    name.parts.len() == 1 && name.first().eq_ignore_ascii_case(function)
}

/// Method name and arguments of a call with a non-computed name.
pub fn method_call(tree: &Tree, id: NodeId) -> Option<(&str, &[NodeId])> {
    match tree.node(id) {
        Node::MethodCall { name, args, .. } => name.as_identifier().map(|name| (name, &args[..])),
        _ => None,
    }
}

/// The value wrapped by an argument node.
pub fn arg_value(tree: &Tree, arg: NodeId) -> NodeId {
    match tree.node(arg) {
        Node::Arg { value, .. } => *value,
        _ => arg,
    }
}

/// String literal wrapped by an argument node.
pub fn string_arg(tree: &Tree, arg: NodeId) -> Option<&str> {
    match tree.node(arg_value(tree, arg)) {
        Node::Str { value } => Some(value),
        _ => None,
    }
}

/// `\Drupal::service('<service>')`
pub fn service_lookup(tree: &mut Tree, service: &str) -> NodeId {
    let id = tree.string(service);
    let args = tree.args([id]);
    tree.static_call(Name::fully_qualified(DRUPAL), "service", args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use d8rector_ast::codegen::render_node;

    #[test]
    fn function_match_ignores_case_and_leading_backslash() {
        assert!(is_function(&Name::parse("check_plain"), "check_plain"));
        assert!(is_function(&Name::parse("\\Check_Plain"), "check_plain"));
        assert!(!is_function(&Name::parse("Foo\\check_plain"), "check_plain"));
    }

    #[test]
    fn dynamic_callee_is_not_a_named_call() {
        let mut tree = Tree::new();
        let handle = tree.variable("f");
        let call = tree.dynamic_call(handle, vec![]);
        assert!(named_call(&tree, call).is_none());
    }

    #[test]
    fn service_lookup_renders_fully_qualified() {
        let mut tree = Tree::new();
        let lookup = service_lookup(&mut tree, "url_generator");
        assert_eq!(
            render_node(&tree, lookup),
            "\\Drupal::service('url_generator')"
        );
    }
}
