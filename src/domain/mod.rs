/// Domain Layer - Core Simulation Model
///
/// Pure data model and numerics with no I/O: the omics layers, the
/// two-group study design, dense feature matrices, config validation and
/// the statistics behind the quality metrics.
///
/// ## Modules
/// - `omics`: Layer definitions and feature id formats
/// - `design`: Samples, groups and batches
/// - `matrix`: Feature-by-sample matrix
/// - `config`: Simulation parameters
/// - `validation`: Parameter range checks
/// - `stats`: t-test, FDR adjustment, descriptive statistics

pub mod omics;
pub mod design;
pub mod matrix;
pub mod config;
pub mod validation;
pub mod stats;

// Re-export key types
pub use omics::OmicsLayer;
pub use design::{Group, SampleMetadata, StudyDesign};
pub use matrix::{FeatureMatrix, MatrixPreview};
pub use config::{MethylationScale, SimulationConfig};
pub use validation::{ConfigValidator, ValidationError};
