//! Health Check Endpoint
//!
//! 根据模拟结果与在途请求数推导服务健康状态
//!
//! ## 状态规则
//! - 连续内部失败达到 `degraded_after` 次 → `degraded`
//! - 连续内部失败达到 `unhealthy_after` 次 → `unhealthy`（存活检查失败）
//! - 任意一次成功的模拟会清零失败计数
//! - 请求参数错误（4xx）不计入失败
//!
//! ## 响应格式
//! ```json
//! {
//!   "status": "healthy",
//!   "uptime_seconds": 3600,
//!   "version": "0.1.0",
//!   "timestamp": 1234567890,
//!   "details": {
//!     "simulations_completed": 12,
//!     "features_generated": 80000,
//!     "simulations_in_flight": 1,
//!     "consecutive_failures": 0
//!   }
//! }
//! ```

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;

/// 健康状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    /// 仍可服务，但最近的模拟持续失败
    Degraded,
    Unhealthy,
}

/// 状态阈值
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthPolicy {
    pub degraded_after: u32,
    pub unhealthy_after: u32,
    /// 在途模拟数达到该值时就绪检查失败
    pub max_in_flight: usize,
}

impl Default for HealthPolicy {
    fn default() -> Self {
        Self {
            degraded_after: 3,
            unhealthy_after: 10,
            max_in_flight: 8,
        }
    }
}

/// 健康检查响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub uptime_seconds: u64,
    pub version: String,
    pub timestamp: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HealthDetails>,
}

/// 详细健康信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthDetails {
    pub simulations_completed: u64,
    pub features_generated: u64,
    pub simulations_in_flight: usize,
    pub consecutive_failures: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// 健康检查器
pub struct HealthChecker {
    start_time: SystemTime,
    version: String,
    policy: HealthPolicy,
    consecutive_failures: AtomicU32,
    in_flight: AtomicUsize,
    last_error: RwLock<Option<String>>,
}

/// Counts one simulation as in flight until dropped
pub struct InFlightGuard<'a> {
    checker: &'a HealthChecker,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.checker.in_flight.fetch_sub(1, Ordering::Relaxed);
    }
}

impl HealthChecker {
    pub fn new(version: impl Into<String>) -> Self {
        Self::with_policy(version, HealthPolicy::default())
    }

    pub fn with_policy(version: impl Into<String>, policy: HealthPolicy) -> Self {
        Self {
            start_time: SystemTime::now(),
            version: version.into(),
            policy,
            consecutive_failures: AtomicU32::new(0),
            in_flight: AtomicUsize::new(0),
            last_error: RwLock::new(None),
        }
    }

    /// 运行时间（秒）
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time
            .elapsed()
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }

    fn current_timestamp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }

    pub fn begin_simulation(&self) -> InFlightGuard<'_> {
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        InFlightGuard { checker: self }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }

    pub fn record_success(&self) {
        if self.consecutive_failures.swap(0, Ordering::Relaxed) > 0 {
            *self.last_error.write() = None;
        }
    }

    /// 记录一次内部失败（非请求参数错误）
    pub fn record_failure(&self, error: impl Into<String>) {
        let failures = self.consecutive_failures.fetch_add(1, Ordering::Relaxed) + 1;
        *self.last_error.write() = Some(error.into());
        if failures == self.policy.degraded_after || failures == self.policy.unhealthy_after {
            warn!("连续 {} 次模拟失败, 状态: {:?}", failures, self.status());
        }
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures.load(Ordering::Relaxed)
    }

    pub fn status(&self) -> HealthStatus {
        let failures = self.consecutive_failures();
        if failures >= self.policy.unhealthy_after {
            HealthStatus::Unhealthy
        } else if failures >= self.policy.degraded_after {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        }
    }

    pub fn check_health(&self) -> HealthResponse {
        HealthResponse {
            status: self.status(),
            uptime_seconds: self.uptime_seconds(),
            version: self.version.clone(),
            timestamp: Self::current_timestamp(),
            details: None,
        }
    }

    /// Health response with the checker's own counters filled into `details`
    pub fn check_health_detailed(&self, simulations_completed: u64, features_generated: u64) -> HealthResponse {
        HealthResponse {
            details: Some(HealthDetails {
                simulations_completed,
                features_generated,
                simulations_in_flight: self.in_flight(),
                consecutive_failures: self.consecutive_failures(),
                last_error: self.last_error.read().clone(),
            }),
            ..self.check_health()
        }
    }

    /// 存活检查（liveness probe）
    pub fn check_liveness(&self) -> bool {
        self.status() != HealthStatus::Unhealthy
    }

    /// 就绪检查（readiness probe）：健康且未满载
    pub fn check_readiness(&self) -> bool {
        self.status() == HealthStatus::Healthy && self.in_flight() < self.policy.max_in_flight
    }
}

impl Default for HealthChecker {
    fn default() -> Self {
        Self::new(env!("CARGO_PKG_VERSION"))
    }
}
