use std::path::PathBuf;
use std::sync::Arc;

use simpulse::config::{self, SchedulerSettings};
use simpulse::host::sim::SimulatedWorld;
use simpulse::services::transport::{HttpTransport, Transport};
use simpulse::{Reactor, TelemetryScheduler};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const PROFILE_ENV: &str = "SIMPULSE_PROFILE";
const DEFAULT_PROFILE_DIR: &str = "profile";

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // 1. Logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    tracing::info!("simpulse host starting");

    // 2. Config
    let profile_root = std::env::var_os(PROFILE_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PROFILE_DIR));
    let telemetry_config = config::load_or_create(&profile_root);
    let settings = SchedulerSettings::default();

    // 3. Transport capability
    let transport: Option<Arc<dyn Transport>> = match HttpTransport::new(settings.request_timeout) {
        Ok(http) => Some(Arc::new(http) as Arc<dyn Transport>),
        Err(e) => {
            tracing::warn!(error = %e, "transport unavailable");
            None
        }
    };

    let mut scheduler = TelemetryScheduler::new(telemetry_config, transport, settings);
    if let Err(e) = scheduler.arm() {
        tracing::warn!(error = %e, "telemetry will not run");
    }

    // 4. Host loop
    let mut reactor = Reactor::new(SimulatedWorld::demo(), scheduler);

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal.cancel();
        }
    });

    reactor.run(shutdown).await;

    let stats = reactor.scheduler.stats();
    tracing::info!(
        dispatched = stats.delivery_stats.dispatched,
        succeeded = stats.delivery_stats.succeeded,
        failed = stats.delivery_stats.failed,
        timed_out = stats.delivery_stats.timed_out,
        skipped = stats.tick_stats.skipped,
        "simpulse host stopped"
    );
    Ok(())
}
