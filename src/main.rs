use wan_locator::config::{LocatorConfig, USAGE};
use wan_locator::membership::listener::LocalMembershipListener;
use wan_locator::membership::protocol::LocatorMessage;
use wan_locator::membership::reconciler::Reconciler;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let config = match LocatorConfig::from_args(args.iter().skip(1).cloned()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Usage: {} {}", args[0], USAGE);
            eprintln!("Example: {} --site 1 --bind 127.0.0.1:10334 --server", args[0]);
            eprintln!(
                "Example: {} --site 1 --bind 127.0.0.1:10335 --peer 127.0.0.1:10334",
                args[0]
            );
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    tracing::info!(
        "Starting locator {} for site {}",
        config.locator,
        config.site_id
    );

    // 1. Registries + reconciler:
    let (listener, mut outbound) =
        LocalMembershipListener::new(config.site_id, config.locator.clone());
    let reconciler = Reconciler::new(listener.clone());

    // 2. Local facts:
    reconciler.add_locator(config.site_id, &config.locator, None);
    for peer in &config.peers {
        reconciler.add_locator(config.site_id, peer, None);
    }

    // 3. Outbound joins (handed to the transport):
    tokio::spawn(async move {
        while let Some(join) = outbound.recv().await {
            if let LocatorMessage::Join { site_id, locator, .. } = &join.message {
                tracing::debug!(
                    "Outbound join of {} (site {}) to {}",
                    locator,
                    site_id,
                    join.target
                );
            }
        }
        tracing::debug!("Outbound channel closed");
    });

    // 4. Stats reporter:
    let stats_listener = listener.clone();
    let stats_interval = config.stats_interval;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(stats_interval);

        loop {
            interval.tick().await;
            let snapshot = stats_listener.locators_snapshot();
            tracing::info!("Known sites: {}", snapshot.len());
            for (site_id, locators) in &snapshot {
                tracing::info!(
                    "  - site {}: {} locator(s), servers={:?}",
                    site_id,
                    locators.len(),
                    stats_listener.server_locators(*site_id)
                );
            }
        }
    });

    tracing::info!("Press Ctrl+C to shutdown");
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down locator {}", config.locator);

    Ok(())
}
