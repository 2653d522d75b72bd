//! Manifest stages: per-component async loading config and the root application manifest.
pub mod app_manifest;
pub mod builtin_tags;
pub mod component_manifest;
pub mod fragments;

pub use app_manifest::patch_app_manifest;
pub use app_manifest::patch_app_manifest_asset;
pub use component_manifest::merge_component_manifest;
pub use component_manifest::merge_component_manifests;
pub use fragments::ComponentFragment;
pub use fragments::FragmentTable;
pub use fragments::FragmentTableBuilder;
