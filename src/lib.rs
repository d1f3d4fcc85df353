pub mod cli;
pub mod config;
pub mod fetch;
pub mod load_config;
pub mod pipeline;
pub mod publish;

pub use cli::{run, Cli, Commands};
