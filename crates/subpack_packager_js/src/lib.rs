pub mod async_loads;
pub mod block_promise;
pub mod runtime_template;

pub use async_loads::relative_bundle_path;
pub use async_loads::rewrite_async_loads;
pub use block_promise::render_block_promise;
pub use block_promise::AsyncBlock;
pub use runtime_template::check_stylesheet_runtime;
pub use runtime_template::render_load_script;
pub use runtime_template::strip_script_injection;
