//! Observability and HTTP Module
//!
//! 提供模拟器的对外HTTP服务：
//! - 模拟与CSV导出API
//! - Prometheus metrics导出
//! - 健康检查端点
//!
//! ## 模块结构
//! - `health` - 健康检查
//! - `http_server` - axum HTTP服务器

pub mod health;
pub mod http_server;

pub use health::{HealthChecker, HealthDetails, HealthPolicy, HealthResponse, HealthStatus, InFlightGuard};
pub use http_server::{AppState, ServerError, SimulatorServer};
