//! Project configuration (`.opvault.toml`).

pub mod settings;

pub use settings::Settings;
