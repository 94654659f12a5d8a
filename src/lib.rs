//! d8rector: rule-based migration of Drupal 7 API usage to Drupal 8.
//!
//! Source units arrive as serialized syntax trees produced by an external
//! PHP parser. The host loads every unit of a run, collects class and trait
//! declarations across all of them, then runs the configured rules over each
//! unit independently.
//!
//! ## Modules
//!
//! - `cli` - command implementations used by the `d8rector` binary

pub mod cli;

// Re-export core types for convenience
pub use d8rector_core::config;
pub use d8rector_core::error::{OutputErrorCode, RectorError, RectorResult};
pub use d8rector_core::output;

pub use d8rector_ast as ast;
pub use d8rector_drupal as drupal;
pub use d8rector_drupal::{default_rules, RuleRegistry};
