pub mod alert;
pub mod config;
pub mod error;

pub use alert::{AlertId, AlertRecord};
pub use config::DispatchConfig;
pub use error::ConfigError;
