//! Free function to service method renames.
//!
//! `drupal_render($build)` becomes
//! `\Drupal::service('renderer')->render($build)`.

use std::collections::BTreeMap;

use d8rector_ast::{
    CodeSample, Name, NodeId, NodeKind, Replacement, Rule, RuleContext, RuleDefinition,
};
use d8rector_core::config::ServiceRenameConfig;
use d8rector_core::error::RectorResult;

use crate::support::{is_function, named_call, service_lookup};

const INTEREST: &[NodeKind] = &[NodeKind::FuncCall];

/// Rewrites calls of deprecated functions into method calls on a service
/// fetched from the container.
#[derive(Debug, Clone)]
pub struct FunctionToServiceRule {
    id: String,
    description: String,
    service: String,
    /// Function name to service method name.
    methods: BTreeMap<String, String>,
}

impl FunctionToServiceRule {
    pub fn new<'m>(
        id: impl Into<String>,
        description: impl Into<String>,
        service: impl Into<String>,
        methods: impl IntoIterator<Item = (&'m str, &'m str)>,
    ) -> Self {
        FunctionToServiceRule {
            id: id.into(),
            description: description.into(),
            service: service.into(),
            methods: methods
                .into_iter()
                .map(|(function, method)| (function.to_string(), method.to_string()))
                .collect(),
        }
    }

    pub fn drupal_render() -> Self {
        Self::new(
            "drupal_render",
            "Fixes deprecated drupal_render() and drupal_render_root() calls",
            "renderer",
            [("drupal_render", "render"), ("drupal_render_root", "renderRoot")],
        )
    }

    pub fn format_date() -> Self {
        Self::new(
            "format_date",
            "Fixes deprecated format_date() calls",
            "date.formatter",
            [("format_date", "format")],
        )
    }

    pub fn file_prepare_directory() -> Self {
        Self::new(
            "file_prepare_directory",
            "Fixes deprecated file_prepare_directory() calls",
            "file_system",
            [("file_prepare_directory", "prepareDirectory")],
        )
    }

    pub fn from_config(config: &ServiceRenameConfig) -> Self {
        Self::new(
            config.id.clone(),
            format!("Moves configured functions to the '{}' service", config.service),
            config.service.clone(),
            config
                .methods
                .iter()
                .map(|(function, method)| (function.as_str(), method.as_str())),
        )
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    fn method_for(&self, name: &Name) -> Option<&str> {
        self.methods
            .iter()
            .find(|(function, _)| is_function(name, function))
            .map(|(_, method)| method.as_str())
    }
}

impl Rule for FunctionToServiceRule {
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
        let Some(method) = self.method_for(name) else {
            return Ok(Replacement::NoChange);
        };
        let args = args.to_vec();
        let tree = cx.tree_mut();
        let lookup = service_lookup(tree, &self.service);
        let call = tree.method_call(lookup, method, args);
        Ok(Replacement::ReplaceWith(call))
    }

    fn definition(&self) -> RuleDefinition {
        let samples = self
            .methods
            .iter()
            .map(|(function, method)| {
                CodeSample::new(
                    format!("{}($value);", function),
                    format!("\\Drupal::service('{}')->{}($value);", self.service, method),
                )
            })
            .collect();
        RuleDefinition::new(self.description.clone(), samples)
    }
}
