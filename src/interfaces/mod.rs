/// Interfaces Layer - External Entry Points
///
/// This layer contains the external interfaces of the simulator.
/// The HTTP API lives in `infrastructure::observability` and is started
/// from the CLI's `serve` subcommand.
///
/// ## Modules
/// - `cli`: Command-line interface (main.rs logic)

pub mod cli;
