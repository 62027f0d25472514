pub mod env;
mod loader;

pub use env::{AppConfig, FailurePolicy, RegistrationConfig, WhoisConfig};
pub use loader::load_config;
