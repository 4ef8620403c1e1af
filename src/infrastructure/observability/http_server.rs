//! HTTP Simulator Server
//!
//! 提供模拟API、Prometheus metrics和健康检查端点
//!
//! ## 端点
//! - `GET /metrics` - Prometheus格式的指标
//! - `GET /health` - 健康检查
//! - `GET /health/ready` - 就绪检查
//! - `GET /health/live` - 存活检查
//! - `GET /api/defaults` - 默认模拟参数
//! - `POST /api/simulate` - 运行模拟，返回摘要与预览 (JSON)
//! - `POST /api/export/:artifact` - 运行模拟并下载单个CSV文件
//!
//! ## 使用示例
//! ```rust,ignore
//! let server = SimulatorServer::new(SocketAddr::from(([127, 0, 0, 1], 8080)));
//! server.run().await?;
//! ```

use super::health::{HealthChecker, HealthPolicy, HealthStatus};
use crate::application::dto::{ErrorBody, SimulationSummary};
use crate::application::error::SimulationError;
use crate::application::export::Artifact;
use crate::application::services::SimulationService;
use crate::domain::config::SimulationConfig;
use crate::shared::metrics::METRICS;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info, warn};

/// 服务器错误
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// 路由共享状态
#[derive(Clone)]
pub struct AppState {
    health: Arc<HealthChecker>,
    service: Arc<SimulationService>,
}

impl AppState {
    pub fn new(service: SimulationService, policy: HealthPolicy) -> Self {
        Self {
            health: Arc::new(HealthChecker::with_policy(env!("CARGO_PKG_VERSION"), policy)),
            service: Arc::new(service),
        }
    }

    /// 记录模拟结果，仅内部错误影响健康状态
    fn observe<T>(&self, result: &Result<T, SimulationError>) {
        match result {
            Ok(_) => self.health.record_success(),
            Err(e) if !e.is_client_error() => self.health.record_failure(e.to_string()),
            Err(_) => {}
        }
    }
}

/// 模拟服务器
pub struct SimulatorServer {
    addr: SocketAddr,
    state: AppState,
}

impl SimulatorServer {
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            state: AppState::new(SimulationService::new(), HealthPolicy::default()),
        }
    }

    pub fn with_service(mut self, service: SimulationService) -> Self {
        self.state.service = Arc::new(service);
        self
    }

    /// 替换健康阈值（会重置健康计数）
    pub fn with_health_policy(mut self, policy: HealthPolicy) -> Self {
        self.state.health = Arc::new(HealthChecker::with_policy(env!("CARGO_PKG_VERSION"), policy));
        self
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn health_checker(&self) -> Arc<HealthChecker> {
        self.state.health.clone()
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/metrics", get(metrics_handler))
            .route("/health", get(health_handler))
            .route("/health/ready", get(readiness_handler))
            .route("/health/live", get(liveness_handler))
            .route("/api/defaults", get(defaults_handler))
            .route("/api/simulate", post(simulate_handler))
            .route("/api/export/:artifact", post(export_handler))
            .with_state(self.state.clone())
    }

    /// 启动HTTP服务器
    pub async fn run(self) -> Result<(), ServerError> {
        let app = self.router();

        info!("模拟服务器启动于 {}", self.addr);
        info!("模拟端点: http://{}/api/simulate", self.addr);
        info!("健康检查端点: http://{}/health", self.addr);

        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

fn record(endpoint: &str, status: StatusCode) {
    METRICS
        .http_requests_total
        .with_label_values(&[endpoint, status.as_str()])
        .inc();
}

fn error_response(endpoint: &str, err: SimulationError) -> Response {
    let status = if err.is_client_error() {
        warn!("请求参数无效: {}", err);
        StatusCode::BAD_REQUEST
    } else {
        error!("模拟失败: {}", err);
        StatusCode::INTERNAL_SERVER_ERROR
    };
    record(endpoint, status);
    (status, Json(ErrorBody { error: err.to_string() })).into_response()
}

/// Prometheus metrics端点
async fn metrics_handler() -> Response {
    (StatusCode::OK, METRICS.export()).into_response()
}

/// 健康检查端点
async fn health_handler(State(state): State<AppState>) -> Response {
    let response = state
        .health
        .check_health_detailed(METRICS.completed_simulations(), METRICS.total_features());

    let status_code = match response.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(response)).into_response()
}

/// 就绪检查端点（用于Kubernetes readiness probe）
async fn readiness_handler(State(state): State<AppState>) -> Response {
    if state.health.check_readiness() {
        StatusCode::OK.into_response()
    } else {
        StatusCode::SERVICE_UNAVAILABLE.into_response()
    }
}

/// 存活检查端点（用于Kubernetes liveness probe）
async fn liveness_handler(State(state): State<AppState>) -> Response {
    if state.health.check_liveness() {
        StatusCode::OK.into_response()
    } else {
        StatusCode::SERVICE_UNAVAILABLE.into_response()
    }
}

async fn defaults_handler() -> Json<SimulationConfig> {
    Json(SimulationConfig::default())
}

/// 请求体无法解析为配置时返回 400
fn rejection_response(endpoint: &str, rejection: JsonRejection) -> Response {
    warn!("请求体无效: {}", rejection.body_text());
    METRICS.errors_total.with_label_values(&["request"]).inc();
    record(endpoint, StatusCode::BAD_REQUEST);
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: format!("Invalid configuration: {}", rejection.body_text()),
        }),
    )
        .into_response()
}

async fn simulate_handler(
    State(state): State<AppState>,
    payload: Result<Json<SimulationConfig>, JsonRejection>,
) -> Response {
    let config = match payload {
        Ok(Json(config)) => config,
        Err(rejection) => return rejection_response("simulate", rejection),
    };
    let _guard = state.health.begin_simulation();
    let service = state.service.clone();

    // 模拟是CPU密集型任务，放到阻塞线程池
    let result: Result<SimulationSummary, SimulationError> =
        tokio::task::spawn_blocking(move || -> Result<SimulationSummary, SimulationError> {
            let run = service.run(config)?;
            Ok(service.summarize(&run))
        })
        .await
        .unwrap_or_else(|e| Err(SimulationError::Worker(e.to_string())));
    state.observe(&result);

    match result {
        Ok(summary) => {
            record("simulate", StatusCode::OK);
            (StatusCode::OK, Json(summary)).into_response()
        }
        Err(e) => error_response("simulate", e),
    }
}

async fn export_handler(
    State(state): State<AppState>,
    Path(artifact): Path<String>,
    payload: Result<Json<SimulationConfig>, JsonRejection>,
) -> Response {
    let artifact: Artifact = match artifact.parse() {
        Ok(a) => a,
        Err(e) => {
            record("export", StatusCode::NOT_FOUND);
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorBody {
                    error: format!("{}", e),
                }),
            )
                .into_response();
        }
    };

    let config = match payload {
        Ok(Json(config)) => config,
        Err(rejection) => return rejection_response("export", rejection),
    };

    let _guard = state.health.begin_simulation();
    let service = state.service.clone();
    let result = tokio::task::spawn_blocking(move || service.export(config, artifact))
        .await
        .unwrap_or_else(|e| Err(SimulationError::Worker(e.to_string())));
    state.observe(&result);

    match result {
        Ok(bytes) => {
            record("export", StatusCode::OK);
            let disposition = format!("attachment; filename=\"{}\"", artifact.file_name());
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                bytes,
            )
                .into_response()
        }
        Err(e) => error_response("export", e),
    }
}
