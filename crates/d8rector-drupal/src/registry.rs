//! Rule registry.
//!
//! Registration order is dispatch order: when two rules match the same node,
//! the one registered first wins.

use std::collections::BTreeSet;

use tracing::debug;

use d8rector_ast::Rule;
use d8rector_core::config::RectorConfig;
use d8rector_core::error::{RectorError, RectorResult};
use d8rector_core::output::{RuleInfo, SampleInfo};

use crate::rules::{
    FunctionToServiceRule, FunctionToStaticCallRule, GetTRule, LinkRule, UrlGeneratorTraitRule,
};

/// Registry of available rules.
#[derive(Default)]
pub struct RuleRegistry {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with every built-in rule plus the renames declared
    /// in `config`.
    pub fn with_config(config: &RectorConfig) -> RectorResult<Self> {
        let mut registry = Self::new();
        registry.register(Box::new(GetTRule::new()));
        registry.register(Box::new(UrlGeneratorTraitRule::new(
            config.url_generator.clone(),
        )));
        registry.register(Box::new(LinkRule::new()));
        registry.register(Box::new(FunctionToStaticCallRule::check_plain()));
        registry.register(Box::new(FunctionToStaticCallRule::unicode_case()));
        registry.register(Box::new(FunctionToServiceRule::drupal_render()));
        registry.register(Box::new(FunctionToServiceRule::format_date()));
        registry.register(Box::new(FunctionToServiceRule::file_prepare_directory()));

        if !config.function_renames.is_empty() {
            registry.register(Box::new(FunctionToStaticCallRule::from_config(
                &config.function_renames,
            )));
        }
        for rename in &config.service_renames {
            if registry.contains(&rename.id) {
                return Err(RectorError::config(format!(
                    "service rename '{}' collides with an existing rule",
                    rename.id
                )));
            }
            registry.register(Box::new(FunctionToServiceRule::from_config(rename)));
        }
        Ok(registry)
    }

    /// Register a rule after the existing ones.
    pub fn register(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.rules.iter().any(|rule| rule.id() == id)
    }

    /// Rule ids in registration order.
    pub fn ids(&self) -> Vec<&str> {
        self.rules.iter().map(|rule| rule.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Descriptions of every registered rule, for the `rules` command.
    pub fn rule_infos(&self) -> Vec<RuleInfo> {
        self.rules
            .iter()
            .map(|rule| {
                let definition = rule.definition();
                RuleInfo {
                    id: rule.id().to_string(),
                    description: definition.description,
                    interest: rule.interest().iter().map(|k| k.to_string()).collect(),
                    samples: definition
                        .samples
                        .into_iter()
                        .map(|sample| SampleInfo {
                            before: sample.before,
                            after: sample.after,
                        })
                        .collect(),
                }
            })
            .collect()
    }

    /// Keep the rules `config` enables, in registration order.
    ///
    /// Naming a rule that is not registered is a configuration error.
    pub fn select(self, config: &RectorConfig) -> RectorResult<Vec<Box<dyn Rule>>> {
        if let Some(enabled) = &config.rules {
            let known: BTreeSet<&str> = self.rules.iter().map(|rule| rule.id()).collect();
            if let Some(unknown) = enabled.iter().find(|id| !known.contains(id.as_str())) {
                return Err(RectorError::config(format!("unknown rule '{}'", unknown)));
            }
        }
        let selected: Vec<Box<dyn Rule>> = self
            .rules
            .into_iter()
            .filter(|rule| config.is_enabled(rule.id()))
            .collect();
        debug!(
            rules = ?selected.iter().map(|rule| rule.id()).collect::<Vec<_>>(),
            "selected rules"
        );
        Ok(selected)
    }
}

/// The rule list for a run.
pub fn default_rules(config: &RectorConfig) -> RectorResult<Vec<Box<dyn Rule>>> {
    RuleRegistry::with_config(config)?.select(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use d8rector_core::config::{FunctionRenameConfig, ServiceRenameConfig};

    #[test]
    fn built_in_rules_in_dispatch_order() {
        let registry = RuleRegistry::with_config(&RectorConfig::default()).unwrap();
        assert_eq!(
            registry.ids(),
            vec![
                "get_t",
                "url_generator_trait",
                "link",
                "check_plain",
                "unicode_case",
                "drupal_render",
                "format_date",
                "file_prepare_directory",
            ]
        );
    }

    #[test]
    fn configured_renames_are_registered_last() {
        let config = RectorConfig {
            function_renames: vec![FunctionRenameConfig {
                function: "drupal_set_title".to_string(),
                class: "Drupal\\mymodule\\Title".to_string(),
                method: "set".to_string(),
            }],
            service_renames: vec![ServiceRenameConfig {
                id: "cache_clear".to_string(),
                service: "cache_tags.invalidator".to_string(),
                methods: BTreeMap::from([("cache_clear_all".to_string(), "invalidateAll".to_string())]),
            }],
            ..Default::default()
        };
        let registry = RuleRegistry::with_config(&config).unwrap();
        let ids = registry.ids();
        assert_eq!(&ids[ids.len() - 2..], &["function_renames", "cache_clear"]);
    }

    #[test]
    fn service_rename_cannot_shadow_built_in() {
        let config = RectorConfig {
            service_renames: vec![ServiceRenameConfig {
                id: "drupal_render".to_string(),
                service: "renderer".to_string(),
                methods: BTreeMap::from([("drupal_render".to_string(), "render".to_string())]),
            }],
            ..Default::default()
        };
        assert!(matches!(
            RuleRegistry::with_config(&config),
            Err(RectorError::Config { .. })
        ));
    }

    #[test]
    fn selection_keeps_registration_order() {
        let config = RectorConfig {
            rules: Some(vec!["drupal_render".to_string(), "get_t".to_string()]),
            ..Default::default()
        };
        let rules = default_rules(&config).unwrap();
        let ids: Vec<&str> = rules.iter().map(|rule| rule.id()).collect();
        assert_eq!(ids, vec!["get_t", "drupal_render"]);
    }

    #[test]
    fn unknown_rule_is_a_config_error() {
        let config = RectorConfig {
            rules: Some(vec!["nope".to_string()]),
            ..Default::default()
        };
        let err = default_rules(&config).err().unwrap();
        assert_eq!(err.error_code().code(), 2);
        assert!(err.to_string().contains("'nope'"));
    }

    #[test]
    fn rule_infos_carry_interest_and_samples() {
        let registry = RuleRegistry::with_config(&RectorConfig::default()).unwrap();
        let infos = registry.rule_infos();
        let link = infos.iter().find(|info| info.id == "link").unwrap();
        assert_eq!(link.interest, vec!["FuncCall"]);
        assert!(!link.samples.is_empty());
    }
}
