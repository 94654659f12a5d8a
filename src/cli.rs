//! Command implementations for the `d8rector` binary.
//!
//! ## Processing
//!
//! [`run_process`] works in two passes. The first loads every unit and
//! collects declarations from all of them, so a class can inherit the
//! deprecated trait from a parent declared in another unit. The second runs
//! the rules over each unit in input order.
//!
//! A unit whose rewrite is aborted by a rule is reported and left untouched
//! on disk; the remaining units are still processed. Any other error ends
//! the run.

use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use tracing::{info, warn};
use walkdir::WalkDir;

use d8rector_ast::codegen::render;
use d8rector_ast::{traverse, CapabilityIndex, DeclarationTable, Tree};
use d8rector_core::config::RectorConfig;
use d8rector_core::error::{RectorError, RectorResult};
use d8rector_core::output::{ProcessResponse, RulesResponse, UnitOutcome};
use d8rector_drupal::{default_rules, RuleRegistry};

/// Extension of serialized tree files.
pub const UNIT_EXTENSION: &str = "json";

/// What to include in each unit's outcome besides the change list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum EmitFormat {
    /// Changes only.
    #[default]
    Json,
    /// Changes plus the migrated unit rendered as PHP.
    Php,
}

/// Options of the `process` command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProcessOptions {
    /// Overwrite each migrated unit file with its new tree.
    pub write: bool,
    pub emit: EmitFormat,
}

/// Expand `paths` into unit files.
///
/// Files are taken as given. Directories are walked recursively for
/// `*.json` files, in file name order.
pub fn collect_units(paths: &[PathBuf]) -> RectorResult<Vec<PathBuf>> {
    let mut units = Vec::new();
    for path in paths {
        if !path.exists() {
            return Err(RectorError::InputNotFound {
                path: path.display().to_string(),
            });
        }
        if path.is_file() {
            units.push(path.clone());
            continue;
        }
        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = entry.map_err(|e| RectorError::io(path.display().to_string(), e.into()))?;
            let is_unit = entry.file_type().is_file()
                && entry.path().extension().is_some_and(|ext| ext == UNIT_EXTENSION);
            if is_unit {
                units.push(entry.into_path());
            }
        }
    }
    Ok(units)
}

/// Read one serialized tree.
pub fn load_unit(path: &Path) -> RectorResult<Tree> {
    let shown = path.display().to_string();
    let text = fs::read_to_string(path).map_err(|e| RectorError::io(&shown, e))?;
    Tree::from_json(&text).map_err(|e| RectorError::json(&shown, e))
}

/// Write a tree back to its file.
///
/// Only nodes reachable from the root are written, renumbered, so change
/// reports name ids of the tree as it was loaded.
pub fn save_unit(path: &Path, tree: &Tree) -> RectorResult<()> {
    let shown = path.display().to_string();
    let mut json = tree
        .pruned()
        .to_json_pretty()
        .map_err(|e| RectorError::json(&shown, e))?;
    json.push('\n');
    fs::write(path, json).map_err(|e| RectorError::io(&shown, e))
}

/// Run the configured rules over every unit under `paths`.
pub fn run_process(
    paths: &[PathBuf],
    config: &RectorConfig,
    options: ProcessOptions,
) -> RectorResult<ProcessResponse> {
    let mut rules = default_rules(config)?;
    let files = collect_units(paths)?;

    let mut units = Vec::with_capacity(files.len());
    for file in files {
        let tree = load_unit(&file)?;
        units.push((file, tree));
    }
    let table = DeclarationTable::collect(units.iter().map(|(_, tree)| tree));
    info!(
        units = units.len(),
        classes = table.class_count(),
        traits = table.trait_count(),
        "collected declarations"
    );
    let mut index = CapabilityIndex::new(table);

    let mut outcomes = Vec::with_capacity(units.len());
    for (path, mut tree) in units {
        let shown = path.display().to_string();
        match traverse(&mut tree, &mut rules, &mut index) {
            Ok(report) => {
                info!(unit = %shown, changes = report.len(), "processed unit");
                if options.write && !report.is_empty() {
                    save_unit(&path, &tree)?;
                }
                let mut outcome = UnitOutcome::completed(shown, report.change_infos());
                if options.emit == EmitFormat::Php {
                    outcome.source = Some(render(&tree));
                }
                outcomes.push(outcome);
            }
            Err(err) if err.is_unit_fatal() => {
                warn!(unit = %shown, error = %err, "unit aborted");
                outcomes.push(UnitOutcome::aborted(shown, &err));
            }
            Err(err) => return Err(err),
        }
    }
    Ok(ProcessResponse::new(outcomes))
}

/// Describe every rule available under `config`.
pub fn run_rules(config: &RectorConfig) -> RectorResult<RulesResponse> {
    let registry = RuleRegistry::with_config(config)?;
    Ok(RulesResponse::new(registry.rule_infos()))
}

/// Load the configuration file, or the defaults when none is given.
pub fn load_config(path: Option<&Path>) -> RectorResult<RectorConfig> {
    match path {
        Some(path) => RectorConfig::load(path),
        None => Ok(RectorConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_input_is_not_found() {
        let err = collect_units(&[PathBuf::from("/nonexistent/units")]).unwrap_err();
        assert!(matches!(err, RectorError::InputNotFound { .. }));
        assert_eq!(err.error_code().code(), 3);
    }

    #[test]
    fn directories_are_walked_for_json_files() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("module");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("b.json"), "{}").unwrap();
        fs::write(dir.path().join("a.json"), "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let units = collect_units(&[dir.path().to_path_buf()]).unwrap();
        let names: Vec<String> = units
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.json", "b.json"]);
    }

    #[test]
    fn malformed_tree_is_a_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{\"root\": 0}").unwrap();
        let err = load_unit(&path).unwrap_err();
        assert!(matches!(err, RectorError::Json { .. }));
    }

    #[test]
    fn saved_unit_holds_only_reachable_nodes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unit.json");
        let mut tree = Tree::new();
        let root = tree.root();
        let stale = tree.nop();
        tree.push_stmt(root, stale).unwrap();
        let fresh = tree.nop();
        tree.replace_at(d8rector_ast::Slot::stmt(root, 0), fresh).unwrap();

        save_unit(&path, &tree).unwrap();
        let saved = load_unit(&path).unwrap();
        assert_eq!(tree.len(), 3);
        assert_eq!(saved.len(), 2);
        save_unit(&path, &saved).unwrap();
        assert_eq!(load_unit(&path).unwrap().len(), 2);
    }

    #[test]
    fn default_config_without_file() {
        assert_eq!(load_config(None).unwrap(), RectorConfig::default());
    }

    #[test]
    fn rules_response_lists_built_ins() {
        let response = run_rules(&RectorConfig::default()).unwrap();
        assert_eq!(response.status, "ok");
        assert!(response.rules.iter().any(|rule| rule.id == "url_generator_trait"));
    }
}
