/// Application Layer - Use Cases and Services
///
/// This layer orchestrates domain logic into the simulator's workflows:
/// seeded generation, quality metrics and CSV export. It depends on the
/// domain layer but is independent of the CLI and HTTP surfaces.
///
/// ## Modules
/// - `simulator`: Seeded multi-omics data generation
/// - `quality`: Differential statistics and layer summaries
/// - `export`: pandas-compatible CSV writers
/// - `services`: The `SimulationService` facade
/// - `dto`: Data Transfer Objects for cross-layer communication
/// - `error`: `SimulationError`

pub mod error;
pub mod simulator;
pub mod quality;
pub mod export;
pub mod services;
pub mod dto;

// Re-export key services
pub use error::SimulationError;
pub use services::{SimulationRun, SimulationService};
pub use simulator::{MultiOmicsSimulator, SimulatedDataset};
