//! Process plumbing shared by paging binaries: layered configuration and logging setup.

pub mod config;
pub mod logging;

pub use config::{
    default_logging_config, AppConfig, CliArgs, DemoConfig, LoggingConfig, PagingConfig, Section,
};
pub use logging::init_logging_from_config;
