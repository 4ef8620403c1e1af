//! Data Transfer Objects
//!
//! JSON shapes returned by the HTTP API and printed by the CLI preview.

use crate::application::quality::LayerSummary;
use crate::domain::config::SimulationConfig;
use crate::domain::design::SampleMetadata;
use crate::domain::matrix::MatrixPreview;
use crate::domain::omics::OmicsLayer;
use serde::{Deserialize, Serialize};

/// 单层预览
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerPreview {
    pub omic: OmicsLayer,
    pub file_name: String,
    pub preview: MatrixPreview,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<LayerSummary>,
}

/// 一次模拟的摘要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub config: SimulationConfig,
    pub total_samples: usize,
    pub metadata_preview: Vec<SampleMetadata>,
    pub layers: Vec<LayerPreview>,
    /// Artifact file names available for export
    pub artifacts: Vec<String>,
}

/// Error body returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
