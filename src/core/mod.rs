pub mod config;
pub mod error;

pub use config::{config, RuntimeConfig};
pub use error::{DocentError, Result};
