//! Core infrastructure for d8rector.
//!
//! This crate provides language-agnostic infrastructure:
//! - Error types and exit code mapping
//! - JSON output types for CLI responses
//! - Run configuration (enabled rules and rule options)

pub mod config;
pub mod error;
pub mod output;
