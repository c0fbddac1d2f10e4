pub mod config;
pub mod relay;
pub mod service;
pub mod upstream;

pub use config::Config;
