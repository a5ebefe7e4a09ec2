//! Configuration: the `config.toml` file and the resolved per-run settings

mod config;
mod run;

pub use config::{Config, CONFIG_DIR_ENV};
pub use run::RunConfig;
