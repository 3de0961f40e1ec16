use std::io;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use docchat_logging::{docchat_debug, docchat_info, docchat_warn};
use thiserror::Error;
use tokio::runtime::Handle;

use crate::tickers::{ChannelEventSink, EventSink, TickerPeriods, TickerSet};
use crate::{
    ConversationId, EngineEvent, Gateway, GatewayError, GatewaySettings, ReqwestGateway,
    SessionId, UploadFile,
};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start engine: {0}")]
    Startup(#[from] io::Error),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

enum EngineCommand {
    StartTickers {
        session: SessionId,
        periods: TickerPeriods,
    },
    CancelTickers {
        session: SessionId,
    },
    Ingest {
        session: SessionId,
        file: UploadFile,
    },
    ScheduleHandoff {
        session: SessionId,
        delay: Duration,
    },
    Query {
        conversation: ConversationId,
        text: String,
    },
}

/// Front of the background engine thread.
///
/// Commands are applied in the order they are sent; results come back as
/// [`EngineEvent`]s on a single channel.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: GatewaySettings) -> Result<Self, EngineError> {
        let gateway = ReqwestGateway::new(settings)?;
        Self::with_gateway(Arc::new(gateway))
    }

    pub fn with_gateway(gateway: Arc<dyn Gateway>) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Runtime::new()?;

        thread::Builder::new()
            .name("docchat-engine".to_string())
            .spawn(move || {
                let mut worker = Worker {
                    runtime: runtime.handle().clone(),
                    gateway,
                    sink: Arc::new(ChannelEventSink::new(event_tx)),
                    tickers: None,
                };
                while let Ok(command) = cmd_rx.recv() {
                    worker.handle(command);
                }
                worker.stop_tickers();
                docchat_debug!("Engine thread exiting");
            })?;

        Ok(Self { cmd_tx, event_rx })
    }

    /// Starts the tickers of `session`, cancelling those of any older session.
    pub fn start_tickers(&self, session: SessionId, periods: TickerPeriods) {
        self.send(EngineCommand::StartTickers { session, periods });
    }

    pub fn cancel_tickers(&self, session: SessionId) {
        self.send(EngineCommand::CancelTickers { session });
    }

    /// Uploads `file`. The tickers of `session` are cancelled as soon as the call
    /// resolves, before the completion event is emitted.
    pub fn ingest(&self, session: SessionId, file: UploadFile) {
        self.send(EngineCommand::Ingest { session, file });
    }

    pub fn schedule_handoff(&self, session: SessionId, delay: Duration) {
        self.send(EngineCommand::ScheduleHandoff { session, delay });
    }

    pub fn query(&self, conversation: ConversationId, text: impl Into<String>) {
        self.send(EngineCommand::Query {
            conversation,
            text: text.into(),
        });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            docchat_warn!("Engine thread is gone; command dropped");
        }
    }
}

struct Worker {
    runtime: Handle,
    gateway: Arc<dyn Gateway>,
    sink: Arc<dyn EventSink>,
    tickers: Option<TickerSet>,
}

impl Worker {
    fn handle(&mut self, command: EngineCommand) {
        match command {
            EngineCommand::StartTickers { session, periods } => {
                self.stop_tickers();
                self.tickers = Some(TickerSet::start(
                    &self.runtime,
                    session,
                    periods,
                    self.sink.clone(),
                ));
            }
            EngineCommand::CancelTickers { session } => {
                if self.tickers.as_ref().is_some_and(|set| set.session() == session) {
                    self.stop_tickers();
                }
            }
            EngineCommand::Ingest { session, file } => {
                let tickers = self
                    .tickers
                    .as_ref()
                    .filter(|set| set.session() == session)
                    .map(TickerSet::token);
                let gateway = self.gateway.clone();
                let sink = self.sink.clone();
                self.runtime.spawn(async move {
                    let filename = file.filename.clone();
                    let result = gateway.ingest(file).await;
                    if let Some(token) = tickers {
                        token.cancel();
                    }
                    match &result {
                        Ok(_) => docchat_info!("Ingest of {} succeeded", filename),
                        Err(err) => docchat_warn!("Ingest of {} failed: {}", filename, err),
                    }
                    sink.emit(EngineEvent::IngestCompleted { session, result });
                });
            }
            EngineCommand::ScheduleHandoff { session, delay } => {
                let sink = self.sink.clone();
                self.runtime.spawn(async move {
                    tokio::time::sleep(delay).await;
                    sink.emit(EngineEvent::HandoffDue { session });
                });
            }
            EngineCommand::Query { conversation, text } => {
                let gateway = self.gateway.clone();
                let sink = self.sink.clone();
                self.runtime.spawn(async move {
                    let result = gateway.query(&text).await;
                    if let Err(err) = &result {
                        docchat_warn!("Query failed: {}", err);
                    }
                    sink.emit(EngineEvent::QueryCompleted {
                        conversation,
                        result,
                    });
                });
            }
        }
    }

    fn stop_tickers(&mut self) {
        if let Some(tickers) = self.tickers.take() {
            tickers.cancel();
        }
    }
}
