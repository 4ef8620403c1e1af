//! Feature Matrix
//!
//! 行为特征、列为样本的稠密矩阵（行主序存储）

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 矩阵维度不一致
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("matrix shape mismatch: {features} features x {samples} samples needs {expected} values, got {actual}")]
pub struct ShapeError {
    pub features: usize,
    pub samples: usize,
    pub expected: usize,
    pub actual: usize,
}

/// Dense feature-by-sample matrix
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    feature_ids: Vec<String>,
    // 所有层共享同一份样本名
    sample_names: Arc<[String]>,
    values: Vec<f64>,
}

impl FeatureMatrix {
    pub fn new(
        feature_ids: Vec<String>,
        sample_names: Arc<[String]>,
        values: Vec<f64>,
    ) -> Result<Self, ShapeError> {
        let expected = feature_ids.len() * sample_names.len();
        if values.len() != expected {
            return Err(ShapeError {
                features: feature_ids.len(),
                samples: sample_names.len(),
                expected,
                actual: values.len(),
            });
        }
        Ok(Self {
            feature_ids,
            sample_names,
            values,
        })
    }

    pub fn n_features(&self) -> usize {
        self.feature_ids.len()
    }

    pub fn n_samples(&self) -> usize {
        self.sample_names.len()
    }

    pub fn feature_ids(&self) -> &[String] {
        &self.feature_ids
    }

    pub fn sample_names(&self) -> &[String] {
        &self.sample_names
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn row(&self, feature: usize) -> &[f64] {
        let n = self.n_samples();
        &self.values[feature * n..(feature + 1) * n]
    }

    pub fn value(&self, feature: usize, sample: usize) -> f64 {
        self.values[feature * self.n_samples() + sample]
    }

    /// Iterates `(feature_id, row)` pairs
    pub fn rows(&self) -> impl Iterator<Item = (&str, &[f64])> + '_ {
        let n = self.n_samples().max(1);
        self.feature_ids
            .iter()
            .map(String::as_str)
            .zip(self.values.chunks(n))
    }

    /// 预览：前 `rows` 行、前 `cols` 列
    pub fn head(&self, rows: usize, cols: usize) -> MatrixPreview {
        let rows = rows.min(self.n_features());
        let cols = cols.min(self.n_samples());
        MatrixPreview {
            feature_ids: self.feature_ids[..rows].to_vec(),
            sample_names: self.sample_names[..cols].to_vec(),
            values: (0..rows)
                .map(|i| self.row(i)[..cols].to_vec())
                .collect(),
            total_features: self.n_features(),
            total_samples: self.n_samples(),
        }
    }
}

/// 矩阵左上角预览
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixPreview {
    pub feature_ids: Vec<String>,
    pub sample_names: Vec<String>,
    pub values: Vec<Vec<f64>>,
    pub total_features: usize,
    pub total_samples: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(n: usize) -> Arc<[String]> {
        (1..=n).map(|i| format!("Sample_{}", i)).collect()
    }

    fn sample_matrix() -> FeatureMatrix {
        FeatureMatrix::new(
            vec!["a".into(), "b".into()],
            samples(3),
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
        )
        .unwrap()
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let err = FeatureMatrix::new(vec!["a".into()], samples(3), vec![1.0]).unwrap_err();
        assert_eq!(err.expected, 3);
        assert_eq!(err.actual, 1);
    }

    #[test]
    fn test_row_and_value_access() {
        let m = sample_matrix();
        assert_eq!(m.n_features(), 2);
        assert_eq!(m.n_samples(), 3);
        assert_eq!(m.row(1), &[4.0, 5.0, 6.0]);
        assert_eq!(m.value(0, 2), 3.0);
    }

    #[test]
    fn test_rows_iterator() {
        let m = sample_matrix();
        let ids: Vec<&str> = m.rows().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(m.rows().nth(1).unwrap().1, &[4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_head_truncates() {
        let preview = sample_matrix().head(1, 2);
        assert_eq!(preview.feature_ids, vec!["a"]);
        assert_eq!(preview.sample_names, vec!["Sample_1", "Sample_2"]);
        assert_eq!(preview.values, vec![vec![1.0, 2.0]]);
        assert_eq!(preview.total_features, 2);
        assert_eq!(preview.total_samples, 3);
    }

    #[test]
    fn test_head_larger_than_matrix() {
        let preview = sample_matrix().head(10, 10);
        assert_eq!(preview.values.len(), 2);
        assert_eq!(preview.values[0].len(), 3);
    }
}
