pub mod config;
pub mod error;
pub mod types;

pub use config::DroverConfig;
pub use error::{DroverError, Result};
pub use types::*;
