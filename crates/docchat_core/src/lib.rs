//! DocChat core: pure ingestion/conversation state machines and view-model helpers.
mod conversation;
mod disclosure;
mod effect;
mod ingest;
mod msg;
mod state;
mod timing;
mod update;
mod view_model;

pub use conversation::{
    Confidence, ConversationId, ConversationState, Message, MessageId, QueryAnswer, Role,
    SourceFragment, FALLBACK_ANSWER, SUGGESTED_QUESTIONS,
};
pub use disclosure::SourceDisclosure;
pub use effect::Effect;
pub use ingest::{SessionId, UploadSession, UploadStatus, GENERIC_UPLOAD_ERROR, STEP_LABELS};
pub use msg::Msg;
pub use state::{AppState, Screen};
pub use timing::{ProgressTiming, STEP_COUNT};
pub use update::update;
pub use view_model::{
    AppViewModel, ChatView, MessageView, StepState, StepView, SuggestionView, UploadView,
};
