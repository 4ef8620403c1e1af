/// Infrastructure Layer - Technical Implementations
///
/// This layer contains the technical pieces that talk to the outside
/// world: the HTTP server, health probes and metrics export.
///
/// The infrastructure layer depends on the application layer but the
/// domain layer does not depend on infrastructure.
///
/// ## Modules
/// - `observability`: HTTP API, health checks, Prometheus endpoint

pub mod observability;

// Re-export key types
pub use observability::{HealthChecker, SimulatorServer};
