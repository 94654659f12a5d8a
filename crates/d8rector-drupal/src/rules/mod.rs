//! The migration rules.

pub mod function_to_service;
pub mod function_to_static;
pub mod get_t;
pub mod link;
pub mod url_generator_trait;

pub use function_to_service::FunctionToServiceRule;
pub use function_to_static::{FunctionToStaticCallRule, StaticCallTarget};
pub use get_t::GetTRule;
pub use link::LinkRule;
pub use url_generator_trait::{UrlGeneratorTraitRule, URL_GENERATOR_TRAIT};
