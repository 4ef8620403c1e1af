/// Main entry point for the omics simulator
///
/// This serves as a thin wrapper that delegates to the interfaces layer.
/// The actual application logic is implemented in `interfaces::cli`.

use omics_simulator::interfaces::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        tracing::error!("{}", e);
        eprintln!("错误: {}", e);
        std::process::exit(1);
    }
}
