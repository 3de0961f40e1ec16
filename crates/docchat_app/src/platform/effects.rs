use std::time::Duration;

use docchat_core::{Confidence, Effect, Msg, QueryAnswer, SourceFragment};
use docchat_engine::{
    ChatResponse, EngineError, EngineEvent, EngineHandle, GatewaySettings, SourceSnippet,
    TickerPeriods, UploadFile,
};
use docchat_logging::{docchat_debug, docchat_error, docchat_info};

/// Executes core effects on the engine and turns engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
    staged: Option<UploadFile>,
}

impl EffectRunner {
    pub fn new(settings: GatewaySettings) -> Result<Self, EngineError> {
        Ok(Self {
            engine: EngineHandle::new(settings)?,
            staged: None,
        })
    }

    /// Holds the selected document until the core asks for it to be ingested.
    pub fn stage_file(&mut self, file: UploadFile) {
        self.staged = Some(file);
    }

    /// Runs `effects`; returns messages that resolve immediately.
    pub fn enqueue(&mut self, effects: Vec<Effect>) -> Vec<Msg> {
        let mut immediate = Vec::new();
        for effect in effects {
            match effect {
                Effect::StartTickers { session, timing } => {
                    self.engine.start_tickers(
                        session,
                        TickerPeriods {
                            step: timing.step_period,
                            progress: timing.progress_period,
                        },
                    );
                }
                Effect::CancelTickers { session } => self.engine.cancel_tickers(session),
                Effect::Ingest { session, filename } => match self.take_staged(&filename) {
                    Some(file) => {
                        docchat_info!(
                            "Ingest session={} file={} bytes={}",
                            session,
                            filename,
                            file.byte_len()
                        );
                        self.engine.ingest(session, file);
                    }
                    None => {
                        docchat_error!("No staged file for {} (session {})", filename, session);
                        immediate.push(Msg::IngestFailed {
                            session,
                            message: Some(format!("{filename} is no longer available")),
                        });
                    }
                },
                Effect::ScheduleHandoff { session, delay } => {
                    self.engine.schedule_handoff(session, delay)
                }
                Effect::Query { conversation, text } => {
                    docchat_info!("Query conversation={} len={}", conversation, text.len());
                    self.engine.query(conversation, text);
                }
            }
        }
        immediate
    }

    pub fn next_msg(&self, timeout: Duration) -> Option<Msg> {
        self.engine.recv_timeout(timeout).map(map_event)
    }

    fn take_staged(&mut self, filename: &str) -> Option<UploadFile> {
        self.staged.take_if(|file| file.filename == filename)
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::StepTick { session } => Msg::StepTick { session },
        EngineEvent::ProgressTick { session } => Msg::ProgressTick { session },
        EngineEvent::IngestCompleted { session, result } => match result {
            Ok(_) => Msg::IngestSucceeded { session },
            Err(err) => Msg::IngestFailed {
                session,
                message: Some(err.message),
            },
        },
        EngineEvent::HandoffDue { session } => Msg::CompletionDelayElapsed { session },
        EngineEvent::QueryCompleted {
            conversation,
            result,
        } => match result {
            Ok(response) => Msg::QueryAnswered {
                conversation,
                answer: map_answer(response),
            },
            Err(err) => {
                docchat_debug!("Query failure replaced by fallback turn: {}", err);
                Msg::QueryFailed { conversation }
            }
        },
    }
}

fn map_answer(response: ChatResponse) -> QueryAnswer {
    QueryAnswer {
        answer: response.answer,
        sources: response
            .sources
            .map(|sources| sources.into_iter().map(map_source).collect()),
        confidence: response.confidence.as_deref().and_then(Confidence::parse),
    }
}

fn map_source(snippet: SourceSnippet) -> SourceFragment {
    SourceFragment {
        text: snippet.text,
        source: snippet.source,
        page: snippet.page,
    }
}
