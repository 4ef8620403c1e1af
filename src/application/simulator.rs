/// Multi-Omics Simulator - Seeded Data Generation
///
/// Builds one feature matrix per selected omics layer for a two-group
/// (control / treatment) study.
///
/// ## Sampling Model
/// - Transcriptomics: Poisson(5) for control, Poisson(5.5) for treatment
/// - Proteomics, metabolomics, methylation: Normal(0, 1), treatment shifted by +0.5
/// - Methylation may be reported as beta values, β = 2^M / (2^M + 1)
///
/// ## Determinism
/// Every layer draws from its own `StdRng`, seeded from the config seed and
/// the layer's canonical index. The same config always yields the same data,
/// and selecting or dropping one layer never changes another layer's values.
/// Layers are generated on scoped threads.
///
/// ## Usage
/// ```rust
/// use omics_simulator::application::simulator::MultiOmicsSimulator;
/// use omics_simulator::domain::SimulationConfig;
///
/// let simulator = MultiOmicsSimulator::new(SimulationConfig::default()).unwrap();
/// let dataset = simulator.simulate().unwrap();
/// assert_eq!(dataset.layers.len(), 4);
/// ```

use crate::application::error::SimulationError;
use crate::domain::config::{MethylationScale, SimulationConfig};
use crate::domain::design::{SampleMetadata, StudyDesign};
use crate::domain::matrix::FeatureMatrix;
use crate::domain::omics::OmicsLayer;
use crate::domain::validation::ConfigValidator;
use crate::shared::metrics::METRICS;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Poisson, StandardNormal};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, info_span, Span};

/// 对照组泊松均值
pub const CONTROL_POISSON_MEAN: f64 = 5.0;
/// 处理组泊松均值
pub const TREATMENT_POISSON_MEAN: f64 = 5.5;
/// 处理组在连续型组学层上的均值偏移
pub const TREATMENT_SHIFT: f64 = 0.5;

/// Per-layer value generator
///
/// The simulator is generic over this trait so alternative sampling models
/// can be swapped in (e.g. in tests) without touching the orchestration.
pub trait LayerSampler: Send + Sync {
    /// Returns `n_features * design.total_samples()` values, row-major by feature
    fn sample_layer(
        &self,
        layer: OmicsLayer,
        n_features: usize,
        design: &StudyDesign,
        rng: &mut StdRng,
    ) -> Result<Vec<f64>, SimulationError>;
}

/// The group-shift model: Poisson counts for transcripts, shifted normals elsewhere
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupShiftSampler {
    pub methylation_scale: MethylationScale,
}

impl GroupShiftSampler {
    pub fn new(methylation_scale: MethylationScale) -> Self {
        Self { methylation_scale }
    }
}

impl LayerSampler for GroupShiftSampler {
    fn sample_layer(
        &self,
        layer: OmicsLayer,
        n_features: usize,
        design: &StudyDesign,
        rng: &mut StdRng,
    ) -> Result<Vec<f64>, SimulationError> {
        let mut values = Vec::with_capacity(n_features * design.total_samples());

        if layer.is_count_data() {
            let control = Poisson::new(CONTROL_POISSON_MEAN)
                .map_err(|e| SimulationError::Distribution(e.to_string()))?;
            let treatment = Poisson::new(TREATMENT_POISSON_MEAN)
                .map_err(|e| SimulationError::Distribution(e.to_string()))?;
            for _ in 0..n_features {
                values.extend((0..design.control).map(|_| control.sample(&mut *rng)));
                values.extend((0..design.treatment).map(|_| treatment.sample(&mut *rng)));
            }
            return Ok(values);
        }

        let beta = layer == OmicsLayer::Methylation && self.methylation_scale == MethylationScale::Beta;
        for _ in 0..n_features {
            for j in 0..design.total_samples() {
                let mut v: f64 = rng.sample(StandardNormal);
                if j >= design.control {
                    v += TREATMENT_SHIFT;
                }
                values.push(if beta { m_to_beta(v) } else { v });
            }
        }
        Ok(values)
    }
}

/// M-value 转 beta 值
pub fn m_to_beta(m: f64) -> f64 {
    let p = m.exp2();
    p / (p + 1.0)
}

/// Derives an independent seed per layer (splitmix64 finaliser)
pub fn layer_seed(seed: u64, layer: OmicsLayer) -> u64 {
    let mut z = seed.wrapping_add(0x9E37_79B9_7F4A_7C15u64.wrapping_mul(layer.index() as u64 + 1));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// 模拟结果
#[derive(Debug, Clone)]
pub struct SimulatedDataset {
    pub config: SimulationConfig,
    pub design: StudyDesign,
    pub metadata: Vec<SampleMetadata>,
    /// Layers in canonical order
    pub layers: Vec<(OmicsLayer, FeatureMatrix)>,
}

impl SimulatedDataset {
    pub fn layer(&self, layer: OmicsLayer) -> Option<&FeatureMatrix> {
        self.layers
            .iter()
            .find(|(l, _)| *l == layer)
            .map(|(_, m)| m)
    }

    pub fn layer_kinds(&self) -> Vec<OmicsLayer> {
        self.layers.iter().map(|(l, _)| *l).collect()
    }
}

/// Multi-omics simulator
///
/// # Type Parameters
/// * `S` - sampling model (defaults to [`GroupShiftSampler`])
pub struct MultiOmicsSimulator<S: LayerSampler = GroupShiftSampler> {
    config: SimulationConfig,
    sampler: S,
}

impl MultiOmicsSimulator<GroupShiftSampler> {
    /// Validates `config` and builds a simulator with the group-shift model
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        let sampler = GroupShiftSampler::new(config.methylation_scale);
        Self::with_sampler(config, sampler)
    }
}

impl<S: LayerSampler> MultiOmicsSimulator<S> {
    pub fn with_sampler(config: SimulationConfig, sampler: S) -> Result<Self, SimulationError> {
        ConfigValidator::new().validate(&config)?;
        Ok(Self { config, sampler })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Generates metadata plus every selected layer
    pub fn simulate(&self) -> Result<SimulatedDataset, SimulationError> {
        let started = Instant::now();
        let span = info_span!("simulate", seed = self.config.seed, layers = self.config.features.len());
        let _entered = span.enter();
        let design = self.config.design();
        let sample_names: Arc<[String]> = design.sample_names().into();

        info!(
            "开始模拟: {} 对照 + {} 处理, 种子 {}, 组学层 {}",
            design.control,
            design.treatment,
            self.config.seed,
            self.config.features.len()
        );

        let requested: Vec<(OmicsLayer, usize)> = self.config.layers().collect();
        let results: Vec<Result<(OmicsLayer, FeatureMatrix), SimulationError>> =
            std::thread::scope(|scope| {
                let handles: Vec<_> = requested
                    .iter()
                    .map(|&(layer, n)| {
                        let names = sample_names.clone();
                        let design = &design;
                        let parent = &span;
                        (
                            layer,
                            scope.spawn(move || self.simulate_layer(parent, layer, n, design, names)),
                        )
                    })
                    .collect();

                handles
                    .into_iter()
                    .map(|(layer, handle)| {
                        handle.join().unwrap_or_else(|_| {
                            Err(SimulationError::Worker(format!("{} worker panicked", layer)))
                        })
                    })
                    .collect()
            });

        let layers = results.into_iter().collect::<Result<Vec<_>, _>>()?;

        let elapsed = started.elapsed();
        METRICS
            .stage_duration
            .with_label_values(&["simulate"])
            .observe(elapsed.as_secs_f64());
        info!("模拟完成, 耗时 {:?}", elapsed);

        Ok(SimulatedDataset {
            config: self.config.clone(),
            design,
            metadata: design.metadata(),
            layers,
        })
    }

    fn simulate_layer(
        &self,
        parent: &Span,
        layer: OmicsLayer,
        n_features: usize,
        design: &StudyDesign,
        sample_names: Arc<[String]>,
    ) -> Result<(OmicsLayer, FeatureMatrix), SimulationError> {
        let span = info_span!(parent: parent, "simulate_layer", omic = %layer, features = n_features);
        let _guard = span.enter();

        let mut rng = StdRng::seed_from_u64(layer_seed(self.config.seed, layer));
        let values = self.sampler.sample_layer(layer, n_features, design, &mut rng)?;
        let matrix = FeatureMatrix::new(layer.feature_ids(n_features), sample_names, values)?;

        METRICS
            .features_generated_total
            .with_label_values(&[layer.slug()])
            .inc_by(n_features as f64);
        debug!("{} 层生成完毕: {} x {}", layer, matrix.n_features(), matrix.n_samples());

        Ok((layer, matrix))
    }
}
