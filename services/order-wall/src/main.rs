use anyhow::Context;
use order_wall::session::LadderState;
use order_wall::{spawn_poller, Ladder, OrderWallConfig, SnapshotClient};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use types::side::Side;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = OrderWallConfig::from_env().context("loading configuration")?;
    let client = SnapshotClient::new(&config).context("building HTTP client")?;

    info!(
        endpoint = %client.endpoint(),
        interval_ms = config.poll_interval.as_millis() as u64,
        side = %config.query.side,
        decimals = config.query.decimals,
        policy = %config.numeric_policy,
        "Starting order wall"
    );

    let handle = spawn_poller(client, config.query.clone(), config.poll_interval);
    let mut updates = handle.subscribe();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown requested");
                break;
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                report(&state, config.display_levels);
            }
        }
    }

    let metrics = handle.metrics();
    handle.shutdown().await;
    info!(metrics = ?metrics.export(), "Order wall stopped");
    Ok(())
}

fn report(state: &LadderState, levels: usize) {
    if state.loading {
        return;
    }
    if let Some(message) = state.view.error_message() {
        warn!(error = %message, "Order wall unavailable");
        return;
    }
    if let Some(ladder) = state.view.ladder() {
        print_ladder(ladder, levels);
    }
}

fn print_ladder(ladder: &Ladder, levels: usize) {
    let summary = &ladder.summary;
    info!(
        best_bid = %summary.best_bid,
        best_ask = %summary.best_ask,
        mid = %summary.mid_price,
        spread_bps = %summary.spread_bps,
        buys = ladder.buys.len(),
        sells = ladder.sells.len(),
        "{} order wall",
        ladder.base
    );

    for side in [Side::Sell, Side::Buy] {
        let mut rows: Vec<_> = ladder.top(side, levels).iter().collect();
        // Asks print top-down so the spread sits in the middle
        if side == Side::Sell {
            rows.reverse();
        }
        for row in rows {
            println!(
                "{:<4} {:>8} {:<8} {:>14} {:>14} {:>14} {:>6}% {:+}",
                side.as_str(),
                row.price_label,
                row.source.as_str(),
                row.base_liquidity.round_dp(2),
                row.usd_liquidity.round_dp(2),
                row.cumulative_usd.round_dp(2),
                ladder.bar_width(row).round_dp(0),
                row.delta_usd.round_dp(2),
            );
        }
    }
}
