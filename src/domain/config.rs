//! Simulation Configuration
//!
//! Shared by the CLI (`generate`, `--config file.json`) and the JSON API.
//! 缺省值与原始模拟器一致：每组100个样本、默认特征数、种子42。

use super::design::StudyDesign;
use super::omics::OmicsLayer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// 甲基化数值尺度
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MethylationScale {
    /// log2 ratio, unbounded
    #[default]
    MValue,
    /// β = 2^M / (2^M + 1), in (0, 1)
    Beta,
}

impl MethylationScale {
    pub fn as_str(&self) -> &'static str {
        match self {
            MethylationScale::MValue => "m-value",
            MethylationScale::Beta => "beta",
        }
    }
}

impl fmt::Display for MethylationScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown methylation scale: '{0}' (expected m-value or beta)")]
pub struct UnknownScale(pub String);

impl FromStr for MethylationScale {
    type Err = UnknownScale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "m-value" | "mvalue" | "m" => Ok(MethylationScale::MValue),
            "beta" => Ok(MethylationScale::Beta),
            _ => Err(UnknownScale(s.to_string())),
        }
    }
}

/// 模拟参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub control_samples: usize,
    pub treatment_samples: usize,
    /// Selected layers and their feature counts
    pub features: BTreeMap<OmicsLayer, usize>,
    pub seed: u64,
    pub methylation_scale: MethylationScale,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            control_samples: 100,
            treatment_samples: 100,
            features: OmicsLayer::ALL
                .into_iter()
                .map(|layer| (layer, layer.default_features()))
                .collect(),
            seed: 42,
            methylation_scale: MethylationScale::MValue,
        }
    }
}

impl SimulationConfig {
    pub fn design(&self) -> StudyDesign {
        StudyDesign::new(self.control_samples, self.treatment_samples)
    }

    /// Selected layers in canonical order
    pub fn layers(&self) -> impl Iterator<Item = (OmicsLayer, usize)> + '_ {
        self.features.iter().map(|(layer, n)| (*layer, *n))
    }

    pub fn feature_count(&self, layer: OmicsLayer) -> Option<usize> {
        self.features.get(&layer).copied()
    }

    /// Keeps only `layers`, preserving configured counts and filling defaults for new ones
    pub fn retain_layers(&mut self, layers: &[OmicsLayer]) {
        let mut selected = BTreeMap::new();
        for layer in layers {
            let n = self
                .features
                .get(layer)
                .copied()
                .unwrap_or_else(|| layer.default_features());
            selected.insert(*layer, n);
        }
        self.features = selected;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SimulationConfig::default();
        assert_eq!(config.control_samples, 100);
        assert_eq!(config.treatment_samples, 100);
        assert_eq!(config.seed, 42);
        assert_eq!(config.features.len(), 4);
        assert_eq!(config.feature_count(OmicsLayer::Metabolomics), Some(129));
        assert_eq!(config.design().total_samples(), 200);
    }

    #[test]
    fn test_layers_in_canonical_order() {
        let config = SimulationConfig::default();
        let layers: Vec<OmicsLayer> = config.layers().map(|(l, _)| l).collect();
        assert_eq!(layers, OmicsLayer::ALL.to_vec());
    }

    #[test]
    fn test_retain_layers() {
        let mut config = SimulationConfig::default();
        config.features.insert(OmicsLayer::Proteomics, 300);
        config.retain_layers(&[OmicsLayer::Methylation, OmicsLayer::Proteomics]);
        assert_eq!(config.features.len(), 2);
        assert_eq!(config.feature_count(OmicsLayer::Proteomics), Some(300));
        assert_eq!(config.feature_count(OmicsLayer::Methylation), Some(1110));
        assert_eq!(config.feature_count(OmicsLayer::Transcriptomics), None);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SimulationConfig =
            serde_json::from_str(r#"{"seed": 7, "features": {"metabolomics": 50}}"#).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.control_samples, 100);
        assert_eq!(config.features.len(), 1);
        assert_eq!(config.feature_count(OmicsLayer::Metabolomics), Some(50));
        assert_eq!(config.methylation_scale, MethylationScale::MValue);
    }

    #[test]
    fn test_json_roundtrip_keys() {
        let json = serde_json::to_value(SimulationConfig::default()).unwrap();
        assert_eq!(json["features"]["transcriptomics"], 3234);
        assert_eq!(json["methylation_scale"], "m-value");
    }

    #[test]
    fn test_scale_parse() {
        assert_eq!("beta".parse::<MethylationScale>().unwrap(), MethylationScale::Beta);
        assert_eq!("M-Value".parse::<MethylationScale>().unwrap(), MethylationScale::MValue);
        assert!("logit".parse::<MethylationScale>().is_err());
    }
}
