//! Omics Layers
//!
//! 四种组学层及其特征命名规则
//!
//! | layer           | feature id                 | default | range      |
//! |-----------------|----------------------------|---------|------------|
//! | transcriptomics | `ENSG` + 11 digits         | 3234    | 100..=5000 |
//! | proteomics      | `PROT` + 6 digits          | 2187    | 100..=5000 |
//! | metabolomics    | `HMDB` + 7 digits          | 129     | 10..=500   |
//! | methylation     | `cg` + 8 digits            | 1110    | 100..=2000 |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// 组学层
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OmicsLayer {
    /// 基因表达（计数）
    Transcriptomics,
    /// 蛋白丰度
    Proteomics,
    /// 代谢物水平
    Metabolomics,
    /// DNA 甲基化
    Methylation,
}

impl OmicsLayer {
    /// All layers in canonical order
    pub const ALL: [OmicsLayer; 4] = [
        OmicsLayer::Transcriptomics,
        OmicsLayer::Proteomics,
        OmicsLayer::Metabolomics,
        OmicsLayer::Methylation,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            OmicsLayer::Transcriptomics => "transcriptomics",
            OmicsLayer::Proteomics => "proteomics",
            OmicsLayer::Metabolomics => "metabolomics",
            OmicsLayer::Methylation => "methylation",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            OmicsLayer::Transcriptomics => "Transcriptomics",
            OmicsLayer::Proteomics => "Proteomics",
            OmicsLayer::Metabolomics => "Metabolomics",
            OmicsLayer::Methylation => "Methylation",
        }
    }

    /// Position in [`OmicsLayer::ALL`], used to derive per-layer RNG streams
    pub fn index(&self) -> usize {
        match self {
            OmicsLayer::Transcriptomics => 0,
            OmicsLayer::Proteomics => 1,
            OmicsLayer::Metabolomics => 2,
            OmicsLayer::Methylation => 3,
        }
    }

    fn id_prefix(&self) -> (&'static str, usize) {
        match self {
            OmicsLayer::Transcriptomics => ("ENSG", 11),
            OmicsLayer::Proteomics => ("PROT", 6),
            OmicsLayer::Metabolomics => ("HMDB", 7),
            OmicsLayer::Methylation => ("cg", 8),
        }
    }

    /// 生成特征ID（索引从1开始）
    pub fn feature_id(&self, index: usize) -> String {
        let (prefix, width) = self.id_prefix();
        format!("{}{:0width$}", prefix, index, width = width)
    }

    /// Feature ids `1..=n`
    pub fn feature_ids(&self, n: usize) -> Vec<String> {
        (1..=n).map(|i| self.feature_id(i)).collect()
    }

    pub fn default_features(&self) -> usize {
        match self {
            OmicsLayer::Transcriptomics => 3234,
            OmicsLayer::Proteomics => 2187,
            OmicsLayer::Metabolomics => 129,
            OmicsLayer::Methylation => 1110,
        }
    }

    /// 允许的特征数量范围
    pub fn feature_range(&self) -> RangeInclusive<usize> {
        match self {
            OmicsLayer::Transcriptomics => 100..=5000,
            OmicsLayer::Proteomics => 100..=5000,
            OmicsLayer::Metabolomics => 10..=500,
            OmicsLayer::Methylation => 100..=2000,
        }
    }

    /// 导出文件名，例如 `proteomics_data.csv`
    pub fn data_file_name(&self) -> String {
        format!("{}_data.csv", self.slug())
    }

    /// Whether values are integer counts rather than continuous measurements
    pub fn is_count_data(&self) -> bool {
        matches!(self, OmicsLayer::Transcriptomics)
    }
}

impl fmt::Display for OmicsLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// 无法识别的组学层名称
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown omics layer: '{0}' (expected transcriptomics, proteomics, metabolomics or methylation)")]
pub struct UnknownLayer(pub String);

impl FromStr for OmicsLayer {
    type Err = UnknownLayer;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        OmicsLayer::ALL
            .into_iter()
            .find(|layer| layer.slug() == needle)
            .ok_or_else(|| UnknownLayer(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_id_formats() {
        assert_eq!(OmicsLayer::Transcriptomics.feature_id(1), "ENSG00000000001");
        assert_eq!(OmicsLayer::Proteomics.feature_id(42), "PROT000042");
        assert_eq!(OmicsLayer::Metabolomics.feature_id(129), "HMDB0000129");
        assert_eq!(OmicsLayer::Methylation.feature_id(1110), "cg00001110");
    }

    #[test]
    fn test_feature_ids_are_one_based() {
        let ids = OmicsLayer::Proteomics.feature_ids(3);
        assert_eq!(ids, vec!["PROT000001", "PROT000002", "PROT000003"]);
    }

    #[test]
    fn test_defaults_within_range() {
        for layer in OmicsLayer::ALL {
            assert!(layer.feature_range().contains(&layer.default_features()));
        }
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("Methylation".parse::<OmicsLayer>().unwrap(), OmicsLayer::Methylation);
        assert_eq!(" proteomics ".parse::<OmicsLayer>().unwrap(), OmicsLayer::Proteomics);
        assert!("genomics".parse::<OmicsLayer>().is_err());
    }

    #[test]
    fn test_index_matches_canonical_order() {
        for (i, layer) in OmicsLayer::ALL.iter().enumerate() {
            assert_eq!(layer.index(), i);
        }
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&OmicsLayer::Metabolomics).unwrap();
        assert_eq!(json, "\"metabolomics\"");
    }
}
