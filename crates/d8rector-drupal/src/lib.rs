//! Drupal 7 to Drupal 8 migration rules.
//!
//! This crate provides the concrete rules run by the d8rector engine:
//! - Function renames to static calls and to service methods
//! - `get_t()` handle collapse
//! - `l()` to `Link::fromTextAndUrl()`
//! - Removal of `UrlGeneratorTrait`
//!
//! [`default_rules`] builds the rule list for a run from its configuration.

pub mod registry;
pub mod rules;
pub mod support;

pub use registry::{default_rules, RuleRegistry};
