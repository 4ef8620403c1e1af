/// Simulation Service - Use Case Facade
///
/// Coordinates the simulator, quality metrics and CSV export for the
/// interfaces layer (CLI and HTTP). All methods are synchronous and
/// CPU-bound; async callers should run them on a blocking thread.
///
/// ## Usage
/// ```rust
/// use omics_simulator::application::services::SimulationService;
/// use omics_simulator::domain::SimulationConfig;
///
/// let service = SimulationService::new();
/// let run = service.run(SimulationConfig::default()).unwrap();
/// let summary = service.summarize(&run);
/// assert_eq!(summary.layers.len(), 4);
/// ```

use crate::application::dto::{LayerPreview, SimulationSummary};
use crate::application::error::SimulationError;
use crate::application::export::{export_all, export_artifact, Artifact, ExportError};
use crate::application::quality::{QualityReport, DEFAULT_ALPHA};
use crate::application::simulator::{MultiOmicsSimulator, SimulatedDataset};
use crate::domain::config::SimulationConfig;
use crate::shared::metrics::METRICS;
use std::path::{Path, PathBuf};
use tracing::warn;

/// 预览默认行列数
pub const DEFAULT_PREVIEW: usize = 5;

/// Result of one simulation run
#[derive(Debug, Clone)]
pub struct SimulationRun {
    pub dataset: SimulatedDataset,
    pub report: Option<QualityReport>,
}

/// Simulation use-case service
#[derive(Debug, Clone)]
pub struct SimulationService {
    alpha: f64,
    preview_rows: usize,
    preview_cols: usize,
}

impl SimulationService {
    pub fn new() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            preview_rows: DEFAULT_PREVIEW,
            preview_cols: DEFAULT_PREVIEW,
        }
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_preview(mut self, rows: usize, cols: usize) -> Self {
        self.preview_rows = rows;
        self.preview_cols = cols;
        self
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Simulates and computes quality metrics
    pub fn run(&self, config: SimulationConfig) -> Result<SimulationRun, SimulationError> {
        self.execute(config, true)
    }

    /// Simulates without the quality stage
    pub fn simulate_only(&self, config: SimulationConfig) -> Result<SimulationRun, SimulationError> {
        self.execute(config, false)
    }

    fn execute(&self, config: SimulationConfig, with_quality: bool) -> Result<SimulationRun, SimulationError> {
        let result = MultiOmicsSimulator::new(config)
            .and_then(|simulator| simulator.simulate())
            .map(|dataset| {
                let report = with_quality.then(|| QualityReport::compute(&dataset, self.alpha));
                SimulationRun { dataset, report }
            });

        match &result {
            Ok(_) => METRICS.simulations_total.with_label_values(&["ok"]).inc(),
            Err(e) => {
                warn!("模拟失败: {}", e);
                METRICS.simulations_total.with_label_values(&["error"]).inc();
                METRICS.errors_total.with_label_values(&[e.kind()]).inc();
            }
        }
        result
    }

    /// Simulates and renders a single artifact
    pub fn export(&self, config: SimulationConfig, artifact: Artifact) -> Result<Vec<u8>, SimulationError> {
        // 未选择的组学层无需模拟即可拒绝
        if let Artifact::Data(layer) = artifact {
            if !config.features.contains_key(&layer) {
                METRICS.errors_total.with_label_values(&["export"]).inc();
                return Err(ExportError::MissingLayer(layer).into());
            }
        }
        let needs_quality = matches!(artifact, Artifact::QualityMetrics | Artifact::QualitySummary);
        let run = self.execute(config, needs_quality)?;
        Ok(export_artifact(&run.dataset, run.report.as_ref(), artifact)?)
    }

    /// Writes every artifact of `run` into `dir`
    pub fn export_to_dir(&self, run: &SimulationRun, dir: &Path) -> Result<Vec<PathBuf>, SimulationError> {
        export_all(dir, &run.dataset, run.report.as_ref()).map_err(|e| {
            METRICS.errors_total.with_label_values(&["export"]).inc();
            SimulationError::from(e)
        })
    }

    pub fn summarize(&self, run: &SimulationRun) -> SimulationSummary {
        let dataset = &run.dataset;
        let layers = dataset
            .layers
            .iter()
            .map(|(layer, matrix)| LayerPreview {
                omic: *layer,
                file_name: layer.data_file_name(),
                preview: matrix.head(self.preview_rows, self.preview_cols),
                quality: run
                    .report
                    .as_ref()
                    .and_then(|r| r.summary(*layer))
                    .cloned(),
            })
            .collect();

        SimulationSummary {
            config: dataset.config.clone(),
            total_samples: dataset.design.total_samples(),
            metadata_preview: dataset
                .metadata
                .iter()
                .take(self.preview_rows)
                .cloned()
                .collect(),
            layers,
            artifacts: Artifact::all_for(dataset, run.report.is_some())
                .iter()
                .map(Artifact::file_name)
                .collect(),
        }
    }
}

impl Default for SimulationService {
    fn default() -> Self {
        Self::new()
    }
}
