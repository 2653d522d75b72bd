//! Decides which bundle every module lands in, and checks that the resulting bundle
//! graph is loadable by the host.
pub mod placement;
pub mod split_chunks;
pub mod validator;

pub use placement::place_modules;
pub use placement::Placement;
pub use placement::PlacementMap;
pub use split_chunks::SplitChunksOptions;
pub use validator::validate_bundle_graph;
