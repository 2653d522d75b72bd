pub use self::asset_table::*;
pub use self::bundle::*;
pub use self::module::*;
pub use self::module_graph::*;
pub use self::plugin_options::*;
pub use self::subpackage::*;

mod asset_table;
mod bundle;
mod module;
mod module_graph;
mod plugin_options;
mod subpackage;
