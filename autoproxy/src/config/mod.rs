//! Configuration: which strategies to search and the manual proxy table

pub mod builtin;
pub mod loader;
pub mod schema;
pub mod validator;

pub use loader::ConfigLoader;
pub use schema::{Config, ManualConfig, SearchConfig};
pub use validator::ConfigValidator;
