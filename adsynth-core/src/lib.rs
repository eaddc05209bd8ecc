pub mod artifacts;
pub mod config;
pub mod error;
pub mod error_utils;
pub mod product;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod types;

pub use config::{AppConfig, RedditCredentials};
pub use error::*;
pub use error_utils::*;
pub use types::*;
