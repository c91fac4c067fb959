//! Challenger binary

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use xlayer_dispute_host::demo::faulty_log;
use xlayer_dispute_host::{Config, CounterMachine, DisputeGame, Sequencer, Verdict};

#[tokio::main]
async fn main() -> Result<()> {
    // Setup logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("╔═══════════════════════════════════════════════╗");
    info!("║       xlayer-dispute Bisection Challenger     ║");
    info!("╚═══════════════════════════════════════════════╝");

    // Load config from environment
    let config = Config::from_env();
    config.validate()?;

    info!("");
    info!("Configuration:");
    info!("  Trace length:     {} states", config.trace_length);
    info!("  Fault at step:    {}", config.fault_at);
    info!("  Checkpoints:      {:?}", config.checkpoints);
    info!("  Gas limit:        {}", config.gas_limit);
    info!("  Fan-out:          {}", config.fan_out);
    info!("  Max rounds:       {}", config.max_rounds);
    if let Some(path) = &config.snapshot_path {
        info!("  Snapshot:         {}", path.display());
    }
    info!("");

    let sequencer = Sequencer::new(faulty_log(config.trace_length, config.fault_at));
    let mut game = DisputeGame::new(&config, CounterMachine, 0, sequencer)?;

    let outcome = game.run().await?;

    match (outcome.verdict, outcome.disputed) {
        (Verdict::FraudProven, Some((before, after))) => {
            info!("✓ Fraud proven on {} .. {} after {} rounds", before, after, outcome.rounds);
        }
        (Verdict::ClaimUpheld, Some((before, after))) => {
            info!("✗ Claim upheld on {} .. {} after {} rounds", before, after, outcome.rounds);
        }
        _ => info!("✓ No dispute: sequencer trace matches"),
    }

    Ok(())
}
