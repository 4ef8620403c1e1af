/// Application Services
///
/// Services coordinate domain logic to implement application workflows.

pub mod simulation_service;

pub use simulation_service::{SimulationRun, SimulationService};
