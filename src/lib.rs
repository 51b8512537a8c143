pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod hostlist;
pub mod runner;
pub mod security;
pub mod session;
pub mod ui;
pub mod utils;

pub use cli::Cli;
pub use config::Config;
pub use error::RunError;
pub use runner::RunController;
