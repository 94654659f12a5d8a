//! End-to-end runs of the `process` command over unit files on disk.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use d8rector::ast::codegen::render;
use d8rector::ast::{Name, NodeId, Tree, Visibility};
use d8rector::cli::{load_unit, run_process, save_unit, EmitFormat, ProcessOptions};
use d8rector::config::RectorConfig;
use d8rector::output::UnitStatus;

const URL_GENERATOR_TRAIT: &str = "Drupal\\Core\\Routing\\UrlGeneratorTrait";

fn this_call(tree: &mut Tree, method: &str) -> NodeId {
    let this = tree.this();
    let route = tree.string("user.page");
    let args = tree.args([route]);
    tree.method_call(this, method, args)
}

/// `namespace Drupal\mymodule; use ...UrlGeneratorTrait; class Base { use
/// UrlGeneratorTrait; }`
fn base_unit() -> Tree {
    let mut tree = Tree::new();
    let import = tree.use_stmt(&[URL_GENERATOR_TRAIT]);
    let trait_use = tree.trait_use(vec![Name::parse("UrlGeneratorTrait")]);
    let class = tree.class("Base", None, vec![trait_use]);
    let namespace = tree.namespace(Some("Drupal\\mymodule"), vec![import, class]);
    let root = tree.root();
    tree.push_stmt(root, namespace).unwrap();
    tree
}

/// `namespace Drupal\mymodule\Form; use Drupal\mymodule\Base; class
/// ExampleForm extends Base { ... $this-><method>('user.page') ... }`
fn child_unit(method: &str) -> Tree {
    let mut tree = Tree::new();
    let import = tree.use_stmt(&["Drupal\\mymodule\\Base"]);
    let call = this_call(&mut tree, method);
    let ret = tree.ret(Some(call));
    let submit = tree.class_method("submitForm", Visibility::Public, &[], vec![ret]);
    let class = tree.class("ExampleForm", Some(Name::parse("Base")), vec![submit]);
    let namespace = tree.namespace(Some("Drupal\\mymodule\\Form"), vec![import, class]);
    let root = tree.root();
    tree.push_stmt(root, namespace).unwrap();
    tree
}

/// `namespace Drupal\Core\Routing; trait UrlGeneratorTrait { ... }` with an
/// extra member no rule knows how to rewrite.
fn trait_unit() -> Tree {
    let mut tree = Tree::new();
    let methods: Vec<NodeId> = ["redirect", "url", "getUrlGenerator", "setUrlGenerator", "getRouteName"]
        .iter()
        .map(|m| tree.class_method(m, Visibility::Protected, &[], vec![]))
        .collect();
    let declaration = tree.trait_decl("UrlGeneratorTrait", methods);
    let namespace = tree.namespace(Some("Drupal\\Core\\Routing"), vec![declaration]);
    let root = tree.root();
    tree.push_stmt(root, namespace).unwrap();
    tree
}

/// `mymodule_escape($text) { return check_plain($text); }`
fn procedural_unit() -> Tree {
    let mut tree = Tree::new();
    let text = tree.variable("text");
    let args = tree.args([text]);
    let call = tree.func_call(Name::parse("check_plain"), args);
    let ret = tree.ret(Some(call));
    let function = tree.function("mymodule_escape", &["text"], vec![ret]);
    let root = tree.root();
    tree.push_stmt(root, function).unwrap();
    tree
}

fn write_unit(dir: &Path, name: &str, tree: &Tree) -> PathBuf {
    let path = dir.join(name);
    save_unit(&path, tree).unwrap();
    path
}

fn outcome_for<'r>(
    response: &'r d8rector::output::ProcessResponse,
    path: &Path,
) -> &'r d8rector::output::UnitOutcome {
    let display = path.display().to_string();
    response
        .units
        .iter()
        .find(|unit| unit.path == display)
        .unwrap()
}

#[test]
fn trait_inherited_from_another_unit_is_migrated() {
    let dir = TempDir::new().unwrap();
    write_unit(dir.path(), "base.json", &base_unit());
    let child = write_unit(dir.path(), "child.json", &child_unit("redirect"));

    let options = ProcessOptions {
        write: false,
        emit: EmitFormat::Php,
    };
    let response = run_process(&[dir.path().to_path_buf()], &RectorConfig::default(), options)
        .unwrap();
    assert_eq!(response.status, "ok");
    assert_eq!(response.summary.units, 2);

    let outcome = outcome_for(&response, &child);
    assert_eq!(outcome.status, UnitStatus::Migrated);
    let source = outcome.source.as_deref().unwrap();
    assert!(source.contains("return new RedirectResponse(Url::fromRoute('user.page'));"));
    assert!(source.contains("use Drupal\\Core\\Url;"));
}

#[test]
fn aborted_unit_does_not_stop_the_run() {
    let dir = TempDir::new().unwrap();
    write_unit(dir.path(), "a_trait.json", &trait_unit());
    write_unit(dir.path(), "base.json", &base_unit());
    let child = write_unit(dir.path(), "child.json", &child_unit("getRouteName"));
    let procedural = write_unit(dir.path(), "procedural.json", &procedural_unit());
    let child_before = fs::read_to_string(&child).unwrap();

    let options = ProcessOptions {
        write: true,
        emit: EmitFormat::Json,
    };
    let response = run_process(&[dir.path().to_path_buf()], &RectorConfig::default(), options)
        .unwrap();
    assert_eq!(response.status, "error");
    assert_eq!(response.summary.aborted, 1);

    let aborted = outcome_for(&response, &child);
    assert_eq!(aborted.status, UnitStatus::Aborted);
    let error = aborted.error.as_ref().unwrap();
    assert_eq!(error.code, 6);
    assert!(error.message.contains("getRouteName"));
    assert_eq!(fs::read_to_string(&child).unwrap(), child_before);

    let migrated = outcome_for(&response, &procedural);
    assert_eq!(migrated.status, UnitStatus::Migrated);
    assert!(migrated.source.is_none());
    let written = load_unit(&procedural).unwrap();
    assert!(render(&written).contains("return \\Drupal\\Component\\Utility\\Html::escape($text);"));
}

#[test]
fn without_write_files_are_untouched() {
    let dir = TempDir::new().unwrap();
    let path = write_unit(dir.path(), "procedural.json", &procedural_unit());
    let before = fs::read_to_string(&path).unwrap();

    let response = run_process(
        std::slice::from_ref(&path),
        &RectorConfig::default(),
        ProcessOptions::default(),
    )
    .unwrap();
    assert_eq!(response.summary.migrated, 1);
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn rule_selection_from_config() {
    let dir = TempDir::new().unwrap();
    let path = write_unit(dir.path(), "procedural.json", &procedural_unit());
    let config = RectorConfig::from_json_str(r#"{"rules": ["drupal_render"]}"#).unwrap();

    let response = run_process(&[path], &config, ProcessOptions::default()).unwrap();
    assert_eq!(response.summary.unchanged, 1);
    assert_eq!(response.summary.changes, 0);
}

#[test]
fn unknown_rule_fails_the_run() {
    let dir = TempDir::new().unwrap();
    let path = write_unit(dir.path(), "procedural.json", &procedural_unit());
    let config = RectorConfig::from_json_str(r#"{"rules": ["no_such_rule"]}"#).unwrap();

    let err = run_process(&[path], &config, ProcessOptions::default()).unwrap_err();
    assert_eq!(err.error_code().code(), 2);
}

#[test]
fn response_serializes_with_schema_version() {
    let dir = TempDir::new().unwrap();
    let path = write_unit(dir.path(), "procedural.json", &procedural_unit());
    let response = run_process(&[path], &RectorConfig::default(), ProcessOptions::default())
        .unwrap();
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["schema_version"], "1");
    assert_eq!(json["units"][0]["status"], "migrated");
    assert_eq!(json["units"][0]["changes"][0]["rule"], "check_plain");
}
