//! Transform stage: raw records -> normalized records -> load plan

pub mod artifacts;
pub mod fields;
pub mod normalizer;
pub mod plan;

pub use artifacts::{save_intermediate_data, ArtifactPaths};
pub use normalizer::{NormalizeStats, Normalized, Normalizer};
pub use plan::LoadPlan;
