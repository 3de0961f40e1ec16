use std::time::Duration;

use crate::{ConversationId, ProgressTiming, SessionId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Start the step and progress tickers for an upload attempt.
    StartTickers {
        session: SessionId,
        timing: ProgressTiming,
    },
    /// Stop both tickers of an upload attempt. Safe to repeat.
    CancelTickers { session: SessionId },
    Ingest { session: SessionId, filename: String },
    /// Report `Msg::CompletionDelayElapsed` after `delay`.
    ScheduleHandoff { session: SessionId, delay: Duration },
    Query {
        conversation: ConversationId,
        text: String,
    },
}
