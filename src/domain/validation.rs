/// Config Validator - Parameter Range Validation
///
/// This module checks a simulation config before any data is generated.
///
/// ## Validation Rules
/// - Samples per group must lie within the configured range (10..=500)
/// - At least one omics layer must be selected
/// - Each layer's feature count must lie within that layer's range
/// - A layer may be selected only once
///
/// ## Usage
/// ```rust
/// use omics_simulator::domain::config::SimulationConfig;
/// use omics_simulator::domain::validation::ConfigValidator;
///
/// let validator = ConfigValidator::new();
/// assert!(validator.validate(&SimulationConfig::default()).is_ok());
/// ```

use super::config::SimulationConfig;
use super::omics::OmicsLayer;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// Validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Control or treatment sample count outside the allowed range
    InvalidSampleCount(String),

    /// Feature count outside the layer's range
    FeatureCountOutOfRange(String),

    /// No omics layer selected
    NoLayersSelected,

    /// The same layer was requested twice
    DuplicateLayer(OmicsLayer),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::InvalidSampleCount(msg) => write!(f, "Invalid sample count: {}", msg),
            ValidationError::FeatureCountOutOfRange(msg) => {
                write!(f, "Feature count out of range: {}", msg)
            }
            ValidationError::NoLayersSelected => write!(f, "At least one omics layer must be selected"),
            ValidationError::DuplicateLayer(layer) => write!(f, "Omics layer '{}' selected more than once", layer),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validation configuration
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Samples per group (inclusive bounds)
    pub samples_per_group: RangeInclusive<usize>,

    /// Per-layer feature bounds, layers missing here use [`OmicsLayer::feature_range`]
    pub feature_ranges: BTreeMap<OmicsLayer, RangeInclusive<usize>>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            samples_per_group: 10..=500,
            feature_ranges: OmicsLayer::ALL
                .into_iter()
                .map(|layer| (layer, layer.feature_range()))
                .collect(),
        }
    }
}

impl ValidationConfig {
    fn feature_range(&self, layer: OmicsLayer) -> RangeInclusive<usize> {
        self.feature_ranges
            .get(&layer)
            .cloned()
            .unwrap_or_else(|| layer.feature_range())
    }
}

/// Config validator
pub struct ConfigValidator {
    config: ValidationConfig,
}

impl ConfigValidator {
    /// Creates a new validator with default ranges
    pub fn new() -> Self {
        Self {
            config: ValidationConfig::default(),
        }
    }

    /// Creates a new validator with custom ranges
    pub fn with_config(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validates a simulation config
    ///
    /// # Returns
    /// * `Ok(())` if every parameter is in range
    /// * `Err(ValidationError)` for the first violation found
    pub fn validate(&self, request: &SimulationConfig) -> Result<(), ValidationError> {
        self.validate_samples("control", request.control_samples)?;
        self.validate_samples("treatment", request.treatment_samples)?;

        if request.features.is_empty() {
            return Err(ValidationError::NoLayersSelected);
        }

        for (layer, n) in request.layers() {
            self.validate_features(layer, n)?;
        }

        Ok(())
    }

    /// Validates a layer selection list (e.g. from `--omics`)
    pub fn validate_selection(&self, layers: &[OmicsLayer]) -> Result<(), ValidationError> {
        if layers.is_empty() {
            return Err(ValidationError::NoLayersSelected);
        }
        for (i, layer) in layers.iter().enumerate() {
            if layers[..i].contains(layer) {
                return Err(ValidationError::DuplicateLayer(*layer));
            }
        }
        Ok(())
    }

    fn validate_samples(&self, group: &str, n: usize) -> Result<(), ValidationError> {
        let range = &self.config.samples_per_group;
        if !range.contains(&n) {
            return Err(ValidationError::InvalidSampleCount(format!(
                "{} group has {} samples, expected {}..={}",
                group,
                n,
                range.start(),
                range.end()
            )));
        }
        Ok(())
    }

    fn validate_features(&self, layer: OmicsLayer, n: usize) -> Result<(), ValidationError> {
        let range = self.config.feature_range(layer);
        if !range.contains(&n) {
            return Err(ValidationError::FeatureCountOutOfRange(format!(
                "{} has {} features, expected {}..={}",
                layer,
                n,
                range.start(),
                range.end()
            )));
        }
        Ok(())
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}
