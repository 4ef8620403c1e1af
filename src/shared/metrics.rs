//! Prometheus Metrics Module
//!
//! 模拟器的核心运行指标
//!
//! ## 指标类型
//! - **Counter**: 模拟次数、生成特征数、导出文件数、HTTP请求数
//! - **Histogram**: 各阶段耗时
//!
//! ## 使用示例
//! ```rust,ignore
//! use omics_simulator::shared::metrics::METRICS;
//!
//! METRICS.simulations_total.with_label_values(&["ok"]).inc();
//!
//! let timer = METRICS.stage_duration.with_label_values(&["simulate"]).start_timer();
//! // ... 生成数据 ...
//! timer.observe_duration();
//! ```

use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};

lazy_static! {
    /// 全局Metrics实例
    pub static ref METRICS: Metrics = Metrics::new();
}

/// 模拟器核心指标
pub struct Metrics {
    /// 模拟总次数 (按结果: ok/error)
    pub simulations_total: CounterVec,

    /// 生成的特征总数 (按组学层)
    pub features_generated_total: CounterVec,

    /// 各阶段耗时分布 (秒): simulate / quality / export
    pub stage_duration: HistogramVec,

    /// 导出文件总数 (按产物)
    pub exports_total: CounterVec,

    /// HTTP请求总数
    pub http_requests_total: CounterVec,

    /// 错误总数 (按类型)
    pub errors_total: CounterVec,
}

impl Metrics {
    /// 创建新的Metrics实例
    pub fn new() -> Self {
        Self {
            simulations_total: register_counter_vec!(
                "omics_simulator_simulations_total",
                "Total number of simulation runs",
                &["status"]
            )
            .unwrap(),

            features_generated_total: register_counter_vec!(
                "omics_simulator_features_generated_total",
                "Total number of simulated features",
                &["omic"]
            )
            .unwrap(),

            stage_duration: register_histogram_vec!(
                "omics_simulator_stage_duration_seconds",
                "Duration of each simulation stage in seconds",
                &["stage"],
                vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]
            )
            .unwrap(),

            exports_total: register_counter_vec!(
                "omics_simulator_exports_total",
                "Total number of exported CSV artifacts",
                &["artifact"]
            )
            .unwrap(),

            http_requests_total: register_counter_vec!(
                "omics_simulator_http_requests_total",
                "Total number of API requests",
                &["endpoint", "status"]
            )
            .unwrap(),

            errors_total: register_counter_vec!(
                "omics_simulator_errors_total",
                "Total number of errors",
                &["error_type"]
            )
            .unwrap(),
        }
    }

    /// 导出Prometheus格式的指标
    pub fn export(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = prometheus::gather();
        let mut buffer = vec![];
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            tracing::warn!("指标编码失败: {}", e);
        }
        String::from_utf8(buffer).unwrap_or_default()
    }

    /// Total features generated across all layers
    pub fn total_features(&self) -> u64 {
        crate::domain::OmicsLayer::ALL
            .iter()
            .map(|layer| {
                self.features_generated_total
                    .with_label_values(&[layer.slug()])
                    .get() as u64
            })
            .sum()
    }

    pub fn completed_simulations(&self) -> u64 {
        self.simulations_total.with_label_values(&["ok"]).get() as u64
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
