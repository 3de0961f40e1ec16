use crate::{Confidence, MessageId, Role, Screen, SourceFragment, UploadStatus};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub screen: Screen,
    pub upload: UploadView,
    pub chat: Option<ChatView>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadView {
    pub status: UploadStatus,
    pub filename: String,
    pub progress: u8,
    pub active_step: u8,
    pub steps: Vec<StepView>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Done,
    Active,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepView {
    pub number: u8,
    pub label: &'static str,
    pub state: StepState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatView {
    pub filename: String,
    pub messages: Vec<MessageView>,
    pub input: String,
    pub pending: bool,
    pub can_submit: bool,
    /// Empty once the conversation has its first message.
    pub suggestions: Vec<SuggestionView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageView {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    pub sources: Vec<SourceFragment>,
    pub sources_expanded: bool,
    pub confidence: Option<Confidence>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionView {
    pub text: &'static str,
    pub enabled: bool,
}
