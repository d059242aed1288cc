//! Application event loop.
//!
//! One tokio task pulls events off the session-layer channel, hands each to
//! the `TraderSession`, and forwards the resulting commands. Events are
//! processed strictly in arrival order, to completion, so no locking exists
//! anywhere in the trading state.

use std::time::Instant;

use basis_core::{ExchangeCommand, ExchangeEvent};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::session::TraderSession;

/// Main application.
pub struct Application {
    session: TraderSession,
    started: Instant,
}

impl Application {
    /// Create a new application from configuration.
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        info!(
            position_limit = config.quoter.position_limit,
            hedge_limit = config.hedge.hedge_limit,
            unhedged_limit_ms = config.hedge.unhedged_limit_ms,
            "session configured"
        );
        Self {
            session: TraderSession::new(config.quoter, config.hedge),
            started: Instant::now(),
        }
    }

    /// Run the event loop until the event channel closes.
    ///
    /// A session error is fatal by design: the loop logs it and returns,
    /// halting trading rather than continuing on corrupted state.
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<ExchangeEvent>,
        commands: mpsc::Sender<ExchangeCommand>,
    ) -> AppResult<()> {
        info!("event loop started");
        while let Some(event) = events.recv().await {
            let now_ms = self.started.elapsed().as_millis() as u64;
            let outbound = match self.session.handle(event, now_ms) {
                Ok(outbound) => outbound,
                Err(err) => {
                    error!(%err, "fatal session error, halting");
                    return Err(err.into());
                }
            };
            for command in outbound {
                if commands.send(command).await.is_err() {
                    warn!("command channel closed, stopping");
                    return Ok(());
                }
            }
        }
        info!(
            etf_position = self.session.ledger().etf_position(),
            future_position = self.session.ledger().future_position(),
            realized_pnl = self.session.ledger().total_realized_pnl(),
            "event channel closed, shutting down"
        );
        Ok(())
    }
}
