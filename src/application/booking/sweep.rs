//! Background task that periodically finishes elapsed reservations.
//!
//! Runs in a tokio::spawn loop. Each tick moves every `active` reservation
//! whose window has ended to `finished`, then releases checkouts that stayed
//! `pending` past their TTL. Transient storage errors are retried with
//! backoff before the tick is given up.

use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::lifecycle::ReservationService;
use crate::domain::DomainError;
use crate::shared::shutdown::ShutdownSignal;
use crate::shared::utills::{retry_with_backoff, RetryConfig};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Reservations moved to finished
    pub finished: u64,
    /// Abandoned checkouts moved to payment_failed
    pub expired: u64,
}

/// Run one finish pass now, retrying transient failures.
pub async fn run_finish_sweep(service: &ReservationService) -> Result<u64, DomainError> {
    retry_with_backoff(
        RetryConfig::default(),
        || service.finish_elapsed(Utc::now()),
        DomainError::is_transient,
        "finish_sweep",
    )
    .await
}

/// Finish elapsed reservations, then expire abandoned checkouts.
pub async fn run_sweep(service: &ReservationService) -> Result<SweepReport, DomainError> {
    let finished = run_finish_sweep(service).await?;
    let expired = retry_with_backoff(
        RetryConfig::default(),
        || service.expire_abandoned(Utc::now()),
        DomainError::is_transient,
        "expiry_sweep",
    )
    .await?;
    Ok(SweepReport { finished, expired })
}

/// Start the finish sweep background task. The first sweep runs immediately.
pub fn start_finish_sweep_task(
    service: ReservationService,
    shutdown: ShutdownSignal,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval_secs = interval.as_secs(), "🧹 Finish sweep task started");

        let mut ticker = tokio::time::interval(interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = run_sweep(&service).await {
                        warn!(error = %e, "Finish sweep failed");
                    }
                }
                _ = shutdown.notified().wait() => {
                    info!("🧹 Finish sweep task shutting down");
                    break;
                }
            }
        }

        info!("🧹 Finish sweep task stopped");
    })
}
