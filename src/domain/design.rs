//! Study Design
//!
//! Two-group layout (control first, then treatment) with alternating batches.
//! 样本名为 `Sample_1` … `Sample_N`。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// 实验分组
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Group {
    Control,
    Treatment,
}

impl Group {
    pub fn as_str(&self) -> &'static str {
        match self {
            Group::Control => "Control",
            Group::Treatment => "Treatment",
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单个样本的元数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleMetadata {
    pub sample_id: String,
    pub group: Group,
    pub batch: String,
}

/// 实验设计：每组样本数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyDesign {
    pub control: usize,
    pub treatment: usize,
}

impl StudyDesign {
    pub fn new(control: usize, treatment: usize) -> Self {
        Self { control, treatment }
    }

    pub fn total_samples(&self) -> usize {
        self.control + self.treatment
    }

    /// Column indices of control samples
    pub fn control_range(&self) -> Range<usize> {
        0..self.control
    }

    /// Column indices of treatment samples
    pub fn treatment_range(&self) -> Range<usize> {
        self.control..self.total_samples()
    }

    pub fn group_of(&self, index: usize) -> Group {
        if index < self.control {
            Group::Control
        } else {
            Group::Treatment
        }
    }

    /// `Batch1`, `Batch2`, `Batch1`, … by sample position
    pub fn batch_of(index: usize) -> &'static str {
        if index % 2 == 0 {
            "Batch1"
        } else {
            "Batch2"
        }
    }

    pub fn sample_names(&self) -> Vec<String> {
        (1..=self.total_samples())
            .map(|i| format!("Sample_{}", i))
            .collect()
    }

    pub fn metadata(&self) -> Vec<SampleMetadata> {
        self.sample_names()
            .into_iter()
            .enumerate()
            .map(|(i, sample_id)| SampleMetadata {
                sample_id,
                group: self.group_of(i),
                batch: Self::batch_of(i).to_string(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_names() {
        let design = StudyDesign::new(2, 3);
        assert_eq!(design.total_samples(), 5);
        assert_eq!(
            design.sample_names(),
            vec!["Sample_1", "Sample_2", "Sample_3", "Sample_4", "Sample_5"]
        );
    }

    #[test]
    fn test_groups_control_first() {
        let design = StudyDesign::new(2, 2);
        let groups: Vec<Group> = design.metadata().iter().map(|m| m.group).collect();
        assert_eq!(
            groups,
            vec![Group::Control, Group::Control, Group::Treatment, Group::Treatment]
        );
        assert_eq!(design.control_range(), 0..2);
        assert_eq!(design.treatment_range(), 2..4);
    }

    #[test]
    fn test_batches_alternate() {
        let design = StudyDesign::new(2, 2);
        let batches: Vec<String> = design.metadata().into_iter().map(|m| m.batch).collect();
        assert_eq!(batches, vec!["Batch1", "Batch2", "Batch1", "Batch2"]);
    }

    #[test]
    fn test_odd_total_gets_batch1_last() {
        // 奇数样本数时最后一个样本落在 Batch1
        let design = StudyDesign::new(10, 11);
        let meta = design.metadata();
        assert_eq!(meta.len(), 21);
        assert_eq!(meta[20].batch, "Batch1");
        assert_eq!(meta[20].group, Group::Treatment);
    }
}
