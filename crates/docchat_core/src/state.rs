use crate::view_model::{
    AppViewModel, ChatView, MessageView, StepState, StepView, SuggestionView, UploadView,
};
use crate::{
    ConversationId, ConversationState, ProgressTiming, SourceDisclosure, UploadSession,
    UploadStatus, STEP_LABELS, SUGGESTED_QUESTIONS,
};

/// Which of the two host-shell views is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Upload,
    Chat,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    pub(crate) screen: Screen,
    pub(crate) upload: UploadSession,
    pub(crate) conversation: Option<ConversationState>,
    pub(crate) disclosure: SourceDisclosure,
    last_conversation: ConversationId,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timing(timing: ProgressTiming) -> Self {
        Self {
            upload: UploadSession::new(timing),
            ..Self::default()
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn upload(&self) -> &UploadSession {
        &self.upload
    }

    pub fn conversation(&self) -> Option<&ConversationState> {
        self.conversation.as_ref()
    }

    pub fn disclosure(&self) -> &SourceDisclosure {
        &self.disclosure
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            screen: self.screen,
            upload: self.upload_view(),
            chat: self.conversation.as_ref().map(|c| self.chat_view(c)),
            dirty: self.dirty,
        }
    }

    /// True while an ingest, its hand-off or a query is still outstanding.
    pub fn has_work_in_flight(&self) -> bool {
        matches!(
            self.upload.status(),
            UploadStatus::Uploading | UploadStatus::Success
        ) || self
            .conversation
            .as_ref()
            .is_some_and(ConversationState::is_pending)
    }

    /// Returns whether the view changed since the last call, clearing the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Hand-off from the upload view: starts a fresh conversation about `filename`.
    pub(crate) fn enter_chat(&mut self, filename: String) {
        self.last_conversation += 1;
        self.conversation = Some(ConversationState::new(self.last_conversation, filename));
        self.disclosure.clear();
        self.upload.reset();
        self.screen = Screen::Chat;
        self.mark_dirty();
    }

    pub(crate) fn leave_chat(&mut self) {
        self.conversation = None;
        self.disclosure.clear();
        self.upload.reset();
        self.screen = Screen::Upload;
        self.mark_dirty();
    }

    fn upload_view(&self) -> UploadView {
        let upload = &self.upload;
        let status = upload.status();
        let steps = STEP_LABELS
            .iter()
            .copied()
            .zip(1u8..)
            .map(|(label, number)| StepView {
                number,
                label,
                state: if status == UploadStatus::Success || number < upload.active_step() {
                    StepState::Done
                } else if number == upload.active_step() {
                    StepState::Active
                } else {
                    StepState::Pending
                },
            })
            .collect();

        UploadView {
            status,
            filename: upload.filename().to_string(),
            progress: upload.progress(),
            active_step: upload.active_step(),
            steps,
            error_message: upload.error_message().map(ToOwned::to_owned),
        }
    }

    fn chat_view(&self, conversation: &ConversationState) -> ChatView {
        let messages = conversation
            .messages()
            .iter()
            .map(|message| MessageView {
                id: message.id(),
                role: message.role(),
                content: message.content().to_string(),
                sources: message.sources().map(<[_]>::to_vec).unwrap_or_default(),
                sources_expanded: message.has_sources()
                    && self.disclosure.is_expanded(message.id()),
                confidence: message.confidence(),
            })
            .collect();

        let suggestions = if conversation.suggestions_visible() {
            SUGGESTED_QUESTIONS
                .iter()
                .copied()
                .map(|text| SuggestionView {
                    text,
                    enabled: !conversation.is_pending(),
                })
                .collect()
        } else {
            Vec::new()
        };

        ChatView {
            filename: conversation.filename().to_string(),
            messages,
            input: conversation.input().to_string(),
            pending: conversation.is_pending(),
            can_submit: conversation.can_submit(),
            suggestions,
        }
    }
}
