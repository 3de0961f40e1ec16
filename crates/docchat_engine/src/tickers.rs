use std::sync::{mpsc, Arc};
use std::time::Duration;

use docchat_logging::{docchat_debug, docchat_trace};
use tokio::runtime::Handle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::{EngineEvent, SessionId};

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickerPeriods {
    pub step: Duration,
    pub progress: Duration,
}

/// The step and progress tickers of one upload attempt.
///
/// Both tasks share one cancellation token; cancelling is idempotent and dropping
/// the set cancels it too. A task re-checks the token after every wake-up, but a
/// tick already past that check on another worker can still land after
/// cancellation. Consumers drop ticks by session id and upload status.
#[derive(Debug)]
pub struct TickerSet {
    session: SessionId,
    token: CancellationToken,
}

impl TickerSet {
    pub fn start(
        runtime: &Handle,
        session: SessionId,
        periods: TickerPeriods,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let token = CancellationToken::new();
        runtime.spawn(run_ticker(
            periods.step,
            token.clone(),
            sink.clone(),
            EngineEvent::StepTick { session },
        ));
        runtime.spawn(run_ticker(
            periods.progress,
            token.clone(),
            sink,
            EngineEvent::ProgressTick { session },
        ));
        docchat_debug!("Tickers started for session {}", session);
        Self { session, token }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    /// A handle that cancels this set from elsewhere (e.g. the ingest task).
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn cancel(&self) {
        if !self.token.is_cancelled() {
            docchat_debug!("Tickers cancelled for session {}", self.session);
        }
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for TickerSet {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

async fn run_ticker(
    period: Duration,
    token: CancellationToken,
    sink: Arc<dyn EventSink>,
    event: EngineEvent,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; the first emission is one period in.
    interval.tick().await;

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = interval.tick() => {
                if token.is_cancelled() {
                    break;
                }
                docchat_trace!("Ticker emits {:?}", event);
                sink.emit(event.clone());
            }
        }
    }
}
