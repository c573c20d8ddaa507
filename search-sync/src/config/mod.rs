//! Configuration and dependency wiring for the command-line front end.

pub mod dependencies;
pub mod settings;

pub use dependencies::Dependencies;
pub use settings::Settings;
