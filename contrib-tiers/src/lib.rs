pub mod cli;
pub mod load_config;

pub use cli::{report, run, Cli};
