//! Quality Metrics
//!
//! Per-feature differential statistics (treatment vs control, Welch t-test,
//! BH-adjusted within each layer) and per-layer summaries.

use crate::application::simulator::SimulatedDataset;
use crate::domain::omics::OmicsLayer;
use crate::domain::stats::{benjamini_hochberg, describe, mean, welch_t_test};
use crate::shared::metrics::METRICS;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

/// 默认显著性阈值
pub const DEFAULT_ALPHA: f64 = 0.05;

/// 单个特征的质量指标
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureQuality {
    pub omic: OmicsLayer,
    pub feature_id: String,
    pub mean_control: f64,
    pub mean_treatment: f64,
    /// `mean_treatment - mean_control`
    pub mean_difference: f64,
    pub t_statistic: f64,
    pub p_value: f64,
    pub p_adjusted: f64,
}

/// 单个组学层的汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSummary {
    pub omic: OmicsLayer,
    pub n_features: usize,
    pub n_samples: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    /// Features with `p_adjusted < alpha`
    pub n_significant: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub alpha: f64,
    pub features: Vec<FeatureQuality>,
    pub summaries: Vec<LayerSummary>,
}

impl QualityReport {
    pub fn compute(dataset: &SimulatedDataset, alpha: f64) -> Self {
        let started = Instant::now();
        let design = dataset.design;
        let mut features = Vec::new();
        let mut summaries = Vec::with_capacity(dataset.layers.len());

        for (layer, matrix) in &dataset.layers {
            let mut layer_rows: Vec<FeatureQuality> = matrix
                .rows()
                .map(|(id, row)| {
                    let control = &row[design.control_range()];
                    let treatment = &row[design.treatment_range()];
                    let mean_control = mean(control);
                    let mean_treatment = mean(treatment);
                    let test = welch_t_test(treatment, control);
                    FeatureQuality {
                        omic: *layer,
                        feature_id: id.to_string(),
                        mean_control,
                        mean_treatment,
                        mean_difference: mean_treatment - mean_control,
                        t_statistic: test.statistic,
                        p_value: test.p_value,
                        p_adjusted: test.p_value,
                    }
                })
                .collect();

            // 在层内做 BH 校正
            let raw: Vec<f64> = layer_rows.iter().map(|f| f.p_value).collect();
            for (row, adj) in layer_rows.iter_mut().zip(benjamini_hochberg(&raw)) {
                row.p_adjusted = adj;
            }

            let n_significant = layer_rows.iter().filter(|f| f.p_adjusted < alpha).count();
            let stats = describe(matrix.values());
            debug!("{} 层: {} 个显著特征 (alpha={})", layer, n_significant, alpha);

            summaries.push(LayerSummary {
                omic: *layer,
                n_features: matrix.n_features(),
                n_samples: matrix.n_samples(),
                mean: stats.mean,
                std_dev: stats.std_dev,
                min: stats.min,
                max: stats.max,
                n_significant,
            });
            features.append(&mut layer_rows);
        }

        METRICS
            .stage_duration
            .with_label_values(&["quality"])
            .observe(started.elapsed().as_secs_f64());
        info!("质量指标计算完成: {} 个特征", features.len());

        Self {
            alpha,
            features,
            summaries,
        }
    }

    pub fn summary(&self, layer: OmicsLayer) -> Option<&LayerSummary> {
        self.summaries.iter().find(|s| s.omic == layer)
    }

    pub fn features_for(&self, layer: OmicsLayer) -> impl Iterator<Item = &FeatureQuality> + '_ {
        self.features.iter().filter(move |f| f.omic == layer)
    }
}
