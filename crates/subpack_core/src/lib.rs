pub mod build_context;
pub mod diagnostic;
pub mod macros;
pub mod path;
pub mod result;
pub mod types;

pub use build_context::*;
