pub mod dist;
pub mod graph_input;
pub mod pipeline;
pub mod source_patch;

pub use pipeline::BuildReport;
pub use pipeline::Pipeline;
pub use pipeline::PlacementReport;
pub use pipeline::Stage;
pub use pipeline::StageInput;
