//! Maintenance commands around the bot and the batch runner.

pub mod check_config;
pub mod deploy;
pub mod view_results;

pub use check_config::run_check_config;
pub use deploy::deploy_commands;
pub use view_results::run_view_results;
