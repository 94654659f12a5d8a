//! Run configuration.
//!
//! A run is configured by an optional JSON file. Every field has a default,
//! so an empty object (or no file at all) enables the full built-in rule set
//! with default options.
//!
//! ```json
//! {
//!   "rules": ["drupal_render", "url_generator_trait"],
//!   "url_generator": { "replace_with_fqn": false, "add_url_generator_property": true },
//!   "function_renames": [
//!     { "function": "drupal_set_title", "class": "Drupal\\Core\\Title", "method": "set" }
//!   ],
//!   "service_renames": [
//!     { "id": "cache_clear", "service": "cache_tags.invalidator",
//!       "methods": { "cache_clear_all": "invalidateAll" } }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RectorError, RectorResult};

/// Options of the URL generator trait rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UrlGeneratorOptions {
    /// Reference replacement classes by fully qualified name instead of
    /// importing them.
    pub replace_with_fqn: bool,
    /// Add a protected `$urlGenerator` property to classes that used the trait.
    pub add_url_generator_property: bool,
}

/// An extra free-function to static-call rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FunctionRenameConfig {
    /// Deprecated function name.
    pub function: String,
    /// Fully qualified target class.
    pub class: String,
    /// Static method on the target class.
    pub method: String,
}

/// An extra free-function to service-method rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceRenameConfig {
    /// Rule identifier; must not collide with a built-in rule.
    pub id: String,
    /// Service name passed to the service lookup.
    pub service: String,
    /// Deprecated function name to service method name.
    pub methods: BTreeMap<String, String>,
}

/// Complete run configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RectorConfig {
    /// Enabled rule ids, in registration order. `None` enables every rule.
    pub rules: Option<Vec<String>>,
    /// URL generator trait rule options.
    pub url_generator: UrlGeneratorOptions,
    /// Additional static-call renames.
    pub function_renames: Vec<FunctionRenameConfig>,
    /// Additional service renames.
    pub service_renames: Vec<ServiceRenameConfig>,
}

impl RectorConfig {
    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> RectorResult<Self> {
        let shown = path.display().to_string();
        if !path.exists() {
            return Err(RectorError::InputNotFound { path: shown });
        }
        let text = fs::read_to_string(path).map_err(|e| RectorError::io(&shown, e))?;
        let config: RectorConfig =
            serde_json::from_str(&text).map_err(|e| RectorError::json(&shown, e))?;
        config.validate()?;
        debug!(path = %shown, rules = ?config.rules, "loaded configuration");
        Ok(config)
    }

    /// Parse and validate a configuration from a JSON string.
    pub fn from_json_str(text: &str) -> RectorResult<Self> {
        let config: RectorConfig =
            serde_json::from_str(text).map_err(|e| RectorError::json("<inline>", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Check field-level constraints serde cannot express.
    pub fn validate(&self) -> RectorResult<()> {
        for rename in &self.function_renames {
            if rename.function.trim().is_empty() {
                return Err(RectorError::config("function rename with empty function name"));
            }
            if rename.class.trim_start_matches('\\').is_empty() || rename.method.is_empty() {
                return Err(RectorError::config(format!(
                    "function rename for '{}' needs a target class and method",
                    rename.function
                )));
            }
        }
        for rename in &self.service_renames {
            if rename.service.is_empty() {
                return Err(RectorError::config(format!(
                    "service rename '{}' has an empty service name",
                    rename.id
                )));
            }
            if rename.methods.is_empty() {
                return Err(RectorError::config(format!(
                    "service rename '{}' maps no functions",
                    rename.id
                )));
            }
        }
        Ok(())
    }

    /// Returns true if the rule with this id should be registered.
    pub fn is_enabled(&self, id: &str) -> bool {
        match &self.rules {
            Some(ids) => ids.iter().any(|enabled| enabled == id),
            None => true,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
