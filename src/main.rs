use std::sync::Arc;

use ordersim::catalog::InstrumentCatalog;
use ordersim::engine::config::SimConfig;
use ordersim::engine::delivery::HttpOrderSink;
use ordersim::engine::supervisor::Supervisor;
use ordersim::DynError;

#[tokio::main]
async fn main() -> Result<(), DynError> {
    dotenv::dotenv().ok();

    let config = SimConfig::from_env()?;
    let catalog = InstrumentCatalog::builtin();

    println!(
        "[BOOT] order simulator | {} instruments | {} producers | {} consumers | queue={} (soft {})",
        catalog.len(),
        config.producers,
        config.consumers,
        config.queue_capacity,
        config.queue_soft_threshold
    );
    println!("[BOOT] target endpoint: {}", config.order_endpoint);

    let sink = Arc::new(HttpOrderSink::new(
        &config.order_endpoint,
        &config.secret_token,
        config.request_timeout,
    )?);

    let supervisor = Supervisor::start(config, catalog, sink)?;

    tokio::signal::ctrl_c().await?;
    eprintln!("\n[SHUTDOWN] signal received, stopping workers...");

    supervisor.shutdown();
    let (snapshot, elapsed) = supervisor.join().await;
    eprintln!("[SHUTDOWN] all workers joined");

    snapshot.print_summary(elapsed);

    Ok(())
}
