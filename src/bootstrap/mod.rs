pub mod config;
pub mod paths;
pub mod run;
pub mod tracing;
pub mod wiring;

pub use config::{load_config, load_or_default};
pub use paths::{resolve_app_dirs, AppPaths};
pub use run::run_app;
