//! Application error types

use crate::application::export::ExportError;
use crate::domain::matrix::ShapeError;
use crate::domain::validation::ValidationError;

/// 模拟流程中的错误
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    #[error("Distribution error: {0}")]
    Distribution(String),

    #[error("Matrix error: {0}")]
    Shape(#[from] ShapeError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Worker failed: {0}")]
    Worker(String),
}

impl SimulationError {
    /// Label used for the `errors_total` metric
    pub fn kind(&self) -> &'static str {
        match self {
            SimulationError::Validation(_) => "validation",
            SimulationError::Distribution(_) => "distribution",
            SimulationError::Shape(_) => "shape",
            SimulationError::Export(_) => "export",
            SimulationError::Worker(_) => "worker",
        }
    }

    /// Errors caused by the request rather than the simulator
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            SimulationError::Validation(_)
                | SimulationError::Export(
                    ExportError::MissingLayer(_)
                        | ExportError::MissingQuality
                        | ExportError::UnknownArtifact(_)
                )
        )
    }
}
