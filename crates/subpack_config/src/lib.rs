pub mod config_loader;
pub mod pages_json;

pub use config_loader::ConfigLoader;
pub use config_loader::LoadedConfig;
pub use pages_json::PagesJson;
