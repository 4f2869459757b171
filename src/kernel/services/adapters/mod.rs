//! Service adapters: network, filesystem and runtime implementations.

pub mod http;
pub mod paths;
pub mod runtime;
pub mod settings;

pub use http::{ClientInitError, HttpDataSource};
pub use paths::{ensure_log_dir, get_cache_dir, get_log_dir};
pub use runtime::{AppMessage, AsyncRuntime};
pub use settings::{
    ensure_settings_file, get_settings_path, load_settings, load_settings_from, SettingsError,
};
