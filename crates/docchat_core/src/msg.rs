use crate::{ConversationId, MessageId, QueryAnswer, SessionId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User picked a document (already filtered to accepted types upstream).
    FileSelected { name: String },
    /// Step ticker fired for an upload attempt.
    StepTick { session: SessionId },
    /// Progress ticker fired for an upload attempt.
    ProgressTick { session: SessionId },
    /// The `ingest` call resolved successfully.
    IngestSucceeded { session: SessionId },
    /// The `ingest` call failed; `message` is whatever the transport could extract.
    IngestFailed {
        session: SessionId,
        message: Option<String>,
    },
    /// The post-success display delay is over.
    CompletionDelayElapsed { session: SessionId },
    /// User asked to start over after an error.
    ResetClicked,
    /// User edited the question input box.
    InputChanged(String),
    /// User submitted the current input.
    Submitted,
    /// User clicked one of the suggested first questions.
    SuggestionClicked(String),
    /// The `query` call returned an answer.
    QueryAnswered {
        conversation: ConversationId,
        answer: QueryAnswer,
    },
    /// The `query` call failed.
    QueryFailed { conversation: ConversationId },
    /// User expanded or collapsed the sources of a message.
    SourcesToggled(MessageId),
    /// User left the chat to upload another document.
    BackToUpload,
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
