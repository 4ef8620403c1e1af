//! CSV Export
//!
//! 输出与 pandas `to_csv` 相同布局的 CSV 文件
//!
//! ## Artifacts
//! - `{omic}_data.csv` - empty first header cell, then sample names; one row per feature
//! - `metadata.csv` - `,sample_id,group,batch` with a 0-based index column
//! - `quality_metrics.csv` - one row per feature, no index column
//! - `quality_summary.csv` - one row per layer
//!
//! Floats use shortest round-trip formatting with exponent notation for very
//! small or large magnitudes; transcript counts are written as integers.

use crate::application::quality::QualityReport;
use crate::application::simulator::SimulatedDataset;
use crate::domain::design::SampleMetadata;
use crate::domain::matrix::FeatureMatrix;
use crate::domain::omics::OmicsLayer;
use crate::shared::metrics::METRICS;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Instant;
use tracing::{debug, info};

/// 导出错误
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Layer not simulated: {0}")]
    MissingLayer(OmicsLayer),

    #[error("Quality metrics were not computed")]
    MissingQuality,

    #[error("Unknown artifact: {0}")]
    UnknownArtifact(String),
}

/// 可导出的文件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Artifact {
    Data(OmicsLayer),
    Metadata,
    QualityMetrics,
    QualitySummary,
}

impl Artifact {
    pub fn file_name(&self) -> String {
        match self {
            Artifact::Data(layer) => layer.data_file_name(),
            Artifact::Metadata => "metadata.csv".to_string(),
            Artifact::QualityMetrics => "quality_metrics.csv".to_string(),
            Artifact::QualitySummary => "quality_summary.csv".to_string(),
        }
    }

    /// Label for the `exports_total` metric
    pub fn label(&self) -> &'static str {
        match self {
            Artifact::Data(layer) => layer.slug(),
            Artifact::Metadata => "metadata",
            Artifact::QualityMetrics => "quality_metrics",
            Artifact::QualitySummary => "quality_summary",
        }
    }

    /// Every artifact a dataset produces, in export order
    pub fn all_for(dataset: &SimulatedDataset, with_quality: bool) -> Vec<Artifact> {
        let mut artifacts: Vec<Artifact> = dataset.layer_kinds().into_iter().map(Artifact::Data).collect();
        artifacts.push(Artifact::Metadata);
        if with_quality {
            artifacts.push(Artifact::QualityMetrics);
            artifacts.push(Artifact::QualitySummary);
        }
        artifacts
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}

impl FromStr for Artifact {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        let stem = name.strip_suffix(".csv").unwrap_or(&name);
        match stem {
            "metadata" => return Ok(Artifact::Metadata),
            "quality_metrics" => return Ok(Artifact::QualityMetrics),
            "quality_summary" => return Ok(Artifact::QualitySummary),
            _ => {}
        }
        let layer = stem.strip_suffix("_data").unwrap_or(stem);
        layer
            .parse::<OmicsLayer>()
            .map(Artifact::Data)
            .map_err(|_| ExportError::UnknownArtifact(s.to_string()))
    }
}

/// 浮点数格式化：NaN 写为空串，指数写成 `e-05` / `e+16`（与 pandas 一致）
pub fn format_float(v: f64) -> String {
    if v.is_nan() {
        return String::new();
    }
    let repr = format!("{:?}", v);
    match repr.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(d) => ('-', d),
                None => ('+', exp),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => repr,
    }
}

fn format_value(v: f64, integer: bool) -> String {
    if integer && v.is_finite() {
        format!("{}", v as i64)
    } else {
        format_float(v)
    }
}

/// Writes a feature matrix with feature ids as the index column
pub fn write_matrix<W: Write>(writer: W, matrix: &FeatureMatrix, integer: bool) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);

    csv.write_record(std::iter::once("").chain(matrix.sample_names().iter().map(String::as_str)))?;

    let mut record = Vec::with_capacity(matrix.n_samples() + 1);
    for (id, row) in matrix.rows() {
        record.clear();
        record.push(id.to_string());
        record.extend(row.iter().map(|v| format_value(*v, integer)));
        csv.write_record(&record)?;
    }

    csv.flush()?;
    Ok(())
}

pub fn write_metadata<W: Write>(writer: W, metadata: &[SampleMetadata]) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(["", "sample_id", "group", "batch"])?;
    for (i, sample) in metadata.iter().enumerate() {
        let index = i.to_string();
        csv.write_record([
            index.as_str(),
            sample.sample_id.as_str(),
            sample.group.as_str(),
            sample.batch.as_str(),
        ])?;
    }
    csv.flush()?;
    Ok(())
}

pub fn write_quality<W: Write>(writer: W, report: &QualityReport) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record([
        "omic",
        "feature_id",
        "mean_control",
        "mean_treatment",
        "mean_difference",
        "t_statistic",
        "p_value",
        "p_adjusted",
    ])?;
    for f in &report.features {
        csv.write_record([
            f.omic.slug().to_string(),
            f.feature_id.clone(),
            format_float(f.mean_control),
            format_float(f.mean_treatment),
            format_float(f.mean_difference),
            format_float(f.t_statistic),
            format_float(f.p_value),
            format_float(f.p_adjusted),
        ])?;
    }
    csv.flush()?;
    Ok(())
}

pub fn write_summary<W: Write>(writer: W, report: &QualityReport) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record([
        "omic",
        "n_features",
        "n_samples",
        "mean",
        "std_dev",
        "min",
        "max",
        "n_significant",
        "alpha",
    ])?;
    for s in &report.summaries {
        csv.write_record([
            s.omic.slug().to_string(),
            s.n_features.to_string(),
            s.n_samples.to_string(),
            format_float(s.mean),
            format_float(s.std_dev),
            format_float(s.min),
            format_float(s.max),
            s.n_significant.to_string(),
            format_float(report.alpha),
        ])?;
    }
    csv.flush()?;
    Ok(())
}

fn write_artifact<W: Write>(
    writer: W,
    dataset: &SimulatedDataset,
    report: Option<&QualityReport>,
    artifact: Artifact,
) -> Result<(), ExportError> {
    let written = match artifact {
        Artifact::Data(layer) => {
            let matrix = dataset.layer(layer).ok_or(ExportError::MissingLayer(layer))?;
            write_matrix(writer, matrix, layer.is_count_data())
        }
        Artifact::Metadata => write_metadata(writer, &dataset.metadata),
        Artifact::QualityMetrics => write_quality(writer, report.ok_or(ExportError::MissingQuality)?),
        Artifact::QualitySummary => write_summary(writer, report.ok_or(ExportError::MissingQuality)?),
    };
    written?;
    METRICS.exports_total.with_label_values(&[artifact.label()]).inc();
    Ok(())
}

/// Renders one artifact into memory
pub fn export_artifact(
    dataset: &SimulatedDataset,
    report: Option<&QualityReport>,
    artifact: Artifact,
) -> Result<Vec<u8>, ExportError> {
    let mut buffer = Vec::new();
    write_artifact(&mut buffer, dataset, report, artifact)?;
    Ok(buffer)
}

/// Writes every artifact into `dir`, creating it if needed
pub fn export_all(
    dir: &Path,
    dataset: &SimulatedDataset,
    report: Option<&QualityReport>,
) -> Result<Vec<PathBuf>, ExportError> {
    let started = Instant::now();
    fs::create_dir_all(dir)?;

    let mut written = Vec::new();
    for artifact in Artifact::all_for(dataset, report.is_some()) {
        let path = dir.join(artifact.file_name());
        let mut file = BufWriter::new(File::create(&path)?);
        write_artifact(&mut file, dataset, report, artifact)?;
        file.flush()?;
        debug!("已写入 {}", path.display());
        written.push(path);
    }

    METRICS
        .stage_duration
        .with_label_values(&["export"])
        .observe(started.elapsed().as_secs_f64());
    info!("导出 {} 个文件到 {}", written.len(), dir.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::quality::DEFAULT_ALPHA;
    use crate::application::simulator::MultiOmicsSimulator;
    use crate::domain::config::SimulationConfig;
    use std::sync::Arc;

    fn small_dataset() -> SimulatedDataset {
        let mut config = SimulationConfig::default();
        config.control_samples = 10;
        config.treatment_samples = 10;
        config.features.insert(OmicsLayer::Transcriptomics, 100);
        config.features.insert(OmicsLayer::Proteomics, 100);
        config.features.insert(OmicsLayer::Metabolomics, 10);
        config.features.insert(OmicsLayer::Methylation, 100);
        MultiOmicsSimulator::new(config).unwrap().simulate().unwrap()
    }

    fn lines(bytes: &[u8]) -> Vec<String> {
        String::from_utf8(bytes.to_vec())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_matrix_layout() {
        let names: Arc<[String]> = vec!["Sample_1".to_string(), "Sample_2".to_string()].into();
        let matrix = FeatureMatrix::new(
            vec!["PROT000001".into(), "PROT000002".into()],
            names,
            vec![0.5, -1.25, 1.0, 1e-7],
        )
        .unwrap();
        let mut out = Vec::new();
        write_matrix(&mut out, &matrix, false).unwrap();
        assert_eq!(
            lines(&out),
            vec![",Sample_1,Sample_2", "PROT000001,0.5,-1.25", "PROT000002,1.0,1e-07"]
        );
    }

    #[test]
    fn test_counts_written_as_integers() {
        let ds = small_dataset();
        let bytes = export_artifact(&ds, None, Artifact::Data(OmicsLayer::Transcriptomics)).unwrap();
        let out = lines(&bytes);
        assert_eq!(out.len(), 101);
        assert!(out[0].starts_with(",Sample_1,Sample_2"));
        assert!(out[1].starts_with("ENSG00000000001,"));
        assert!(!out[1].contains('.'));
        assert_eq!(out[1].split(',').count(), 21);
    }

    #[test]
    fn test_metadata_layout() {
        let ds = small_dataset();
        let out = lines(&export_artifact(&ds, None, Artifact::Metadata).unwrap());
        assert_eq!(out[0], ",sample_id,group,batch");
        assert_eq!(out[1], "0,Sample_1,Control,Batch1");
        assert_eq!(out[2], "1,Sample_2,Control,Batch2");
        assert_eq!(out[20], "19,Sample_20,Treatment,Batch2");
        assert_eq!(out.len(), 21);
    }

    #[test]
    fn test_quality_layout() {
        let ds = small_dataset();
        let report = QualityReport::compute(&ds, DEFAULT_ALPHA);
        let out = lines(&export_artifact(&ds, Some(&report), Artifact::QualityMetrics).unwrap());
        assert_eq!(
            out[0],
            "omic,feature_id,mean_control,mean_treatment,mean_difference,t_statistic,p_value,p_adjusted"
        );
        assert_eq!(out.len(), 1 + 310);
        assert!(out[1].starts_with("transcriptomics,ENSG00000000001,"));

        let summary = lines(&export_artifact(&ds, Some(&report), Artifact::QualitySummary).unwrap());
        assert_eq!(summary.len(), 5);
        assert!(summary[4].starts_with("methylation,100,20,"));
        assert!(summary[4].ends_with(",0.05"));
    }

    #[test]
    fn test_missing_quality_and_layer() {
        let mut config = SimulationConfig::default();
        config.control_samples = 10;
        config.treatment_samples = 10;
        config.retain_layers(&[OmicsLayer::Metabolomics]);
        let ds = MultiOmicsSimulator::new(config).unwrap().simulate().unwrap();

        assert!(matches!(
            export_artifact(&ds, None, Artifact::QualityMetrics),
            Err(ExportError::MissingQuality)
        ));
        assert!(matches!(
            export_artifact(&ds, None, Artifact::Data(OmicsLayer::Proteomics)),
            Err(ExportError::MissingLayer(OmicsLayer::Proteomics))
        ));
    }

    #[test]
    fn test_artifact_parse() {
        assert_eq!("metadata.csv".parse::<Artifact>().unwrap(), Artifact::Metadata);
        assert_eq!("quality_metrics".parse::<Artifact>().unwrap(), Artifact::QualityMetrics);
        assert_eq!(
            "proteomics_data.csv".parse::<Artifact>().unwrap(),
            Artifact::Data(OmicsLayer::Proteomics)
        );
        assert_eq!(
            "Methylation".parse::<Artifact>().unwrap(),
            Artifact::Data(OmicsLayer::Methylation)
        );
        assert!("genomics_data.csv".parse::<Artifact>().is_err());
        assert_eq!(Artifact::Data(OmicsLayer::Metabolomics).file_name(), "metabolomics_data.csv");
    }

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(1.0), "1.0");
        assert_eq!(format_float(0.25), "0.25");
        assert_eq!(format_float(f64::NAN), "");
        assert_eq!(format_float(f64::INFINITY), "inf");
        assert_eq!(format_value(6.0, true), "6");
    }

    #[test]
    fn test_format_float_exponent() {
        assert_eq!(format_float(1e-5), "1e-05");
        assert_eq!(format_float(1.5e-7), "1.5e-07");
        assert_eq!(format_float(-3.8600674063711386e-5), "-3.8600674063711386e-05");
        assert_eq!(format_float(1e16), "1e+16");
        assert_eq!(format_float(2.5e-123), "2.5e-123");
        assert_eq!(format_float(0.0001), "0.0001");
        assert_eq!(format_float(1e15), "1000000000000000.0");
    }

    #[test]
    fn test_export_all_writes_files() {
        let ds = small_dataset();
        let report = QualityReport::compute(&ds, DEFAULT_ALPHA);
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("out");
        let written = export_all(&dir, &ds, Some(&report)).unwrap();

        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "transcriptomics_data.csv",
                "proteomics_data.csv",
                "metabolomics_data.csv",
                "methylation_data.csv",
                "metadata.csv",
                "quality_metrics.csv",
                "quality_summary.csv",
            ]
        );
        for path in &written {
            assert!(fs::metadata(path).unwrap().len() > 0);
        }
    }

    #[test]
    fn test_export_all_without_quality() {
        let ds = small_dataset();
        let tmp = tempfile::tempdir().unwrap();
        let written = export_all(tmp.path(), &ds, None).unwrap();

        assert_eq!(written.len(), 5);
        let mut on_disk: Vec<String> = fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        on_disk.sort();
        assert_eq!(
            on_disk,
            vec![
                "metabolomics_data.csv",
                "metadata.csv",
                "methylation_data.csv",
                "proteomics_data.csv",
                "transcriptomics_data.csv",
            ]
        );
        assert!(!on_disk.iter().any(|n| n.starts_with("quality_")));
    }
}
