use ledger::{
    batch::EpochEngine,
    config::Config,
    snapshot::LedgerFile,
    state::SharedLedger,
    validation::LedgerValidator,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// The main entry point for the ledger application.
///
/// Loads the configuration (path from the first argument, defaulting to
/// `config/default.toml`), loads the ledger file it points at, applies every
/// epoch in order and prints the resulting unspent outputs.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/default.toml".to_string());
    let config = Config::load(&config_path)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    info!("Ledger starting with config: {:?}", config);

    let (pool, epochs) = LedgerFile::load(&config.ledger.genesis_path)?.into_parts();
    info!(
        "Starting pool holds {} outputs worth {}",
        pool.len(),
        pool.total_value()
    );

    let engine = EpochEngine::new(LedgerValidator::with_ecdsa(&pool), &config.ledger);
    let ledger = SharedLedger::new(engine);

    for candidates in &epochs {
        let report = ledger.process_epoch(candidates).await;
        for tx in &report.accepted {
            info!("Epoch #{} accepted {:?}", report.epoch_id, tx.hash);
        }
        if config.ledger.report_rejections {
            for rejection in &report.rejected {
                warn!(
                    "Epoch #{} rejected candidate {} ({:?}): {}",
                    report.epoch_id, rejection.position, rejection.tx_hash, rejection.reason
                );
            }
        }
    }

    let pool = ledger.snapshot().await;
    println!("{} unspent outputs worth {}", pool.len(), pool.total_value());
    for id in pool.sorted_ids() {
        if let Some(output) = pool.get(&id) {
            println!("{} {:?} {}", id, output.owner, output.value);
        }
    }

    Ok(())
}
