use crate::Effect;

/// Identity of one document conversation; answers for any other id are stale.
pub type ConversationId = u64;
/// Stable identity of a message, assigned at append time.
pub type MessageId = u64;

/// Appended instead of an answer when the `query` call fails.
pub const FALLBACK_ANSWER: &str = "Sorry, I encountered an error. Please try again.";

/// First-turn affordance, offered only while the conversation is empty.
pub const SUGGESTED_QUESTIONS: [&str; 3] = [
    "What is this document about?",
    "Summarize the key points",
    "What are the main conclusions?",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    /// Parses the backend's label; unknown labels yield `None`.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Confidence::High),
            "medium" => Some(Confidence::Medium),
            "low" => Some(Confidence::Low),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Confidence::High => "High",
            Confidence::Medium => "Medium",
            Confidence::Low => "Low",
        }
    }
}

/// A retrieved excerpt backing an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFragment {
    pub text: String,
    pub source: String,
    /// 1-based; 0 when the backend does not know the page.
    pub page: u32,
}

/// Successful result of a query round-trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryAnswer {
    pub answer: String,
    pub sources: Option<Vec<SourceFragment>>,
    pub confidence: Option<Confidence>,
}

impl QueryAnswer {
    pub fn text(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            sources: None,
            confidence: None,
        }
    }
}

/// One turn of the conversation. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    id: MessageId,
    role: Role,
    content: String,
    sources: Option<Vec<SourceFragment>>,
    confidence: Option<Confidence>,
}

impl Message {
    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Present only on assistant answers that came with retrieval results.
    pub fn sources(&self) -> Option<&[SourceFragment]> {
        self.sources.as_deref()
    }

    pub fn confidence(&self) -> Option<Confidence> {
        self.confidence
    }

    pub fn has_sources(&self) -> bool {
        self.sources.as_ref().is_some_and(|sources| !sources.is_empty())
    }
}

/// Conversation controller for one document.
///
/// Turns are serialized by the `pending` lock: a submission appends the user
/// turn and locks synchronously, and the matching answer (or fallback) unlocks.
/// At most one query is ever outstanding, so user and assistant turns alternate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationState {
    id: ConversationId,
    filename: String,
    messages: Vec<Message>,
    input: String,
    pending: bool,
    next_message_id: MessageId,
}

impl ConversationState {
    pub fn new(id: ConversationId, filename: impl Into<String>) -> Self {
        Self {
            id,
            filename: filename.into(),
            messages: Vec::new(),
            input: String::new(),
            pending: false,
            next_message_id: 1,
        }
    }

    pub fn id(&self) -> ConversationId {
        self.id
    }

    /// Document this conversation is about.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn message(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|message| message.id == id)
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn can_submit(&self) -> bool {
        !self.pending && !self.input.trim().is_empty()
    }

    pub fn suggestions_visible(&self) -> bool {
        self.messages.is_empty()
    }

    /// Edits to the input are allowed while pending; only submitting is locked.
    pub fn set_input(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        if text == self.input {
            return false;
        }
        self.input = text;
        true
    }

    /// Submits `override_text` if given and non-empty, otherwise the input buffer.
    /// Blank text or an outstanding query make this a silent no-op.
    pub fn submit(&mut self, override_text: Option<&str>) -> Vec<Effect> {
        let text = override_text
            .filter(|text| !text.is_empty())
            .unwrap_or(self.input.as_str())
            .trim()
            .to_string();
        if text.is_empty() || self.pending {
            return Vec::new();
        }

        self.append(Role::User, text.clone(), None, None);
        self.input.clear();
        self.pending = true;
        vec![Effect::Query {
            conversation: self.id,
            text,
        }]
    }

    pub fn on_answer(&mut self, conversation: ConversationId, answer: QueryAnswer) -> bool {
        if !self.awaits(conversation) {
            return false;
        }
        let sources = answer.sources.filter(|sources| !sources.is_empty());
        self.append(Role::Assistant, answer.answer, sources, answer.confidence);
        self.pending = false;
        true
    }

    /// The failure itself stays here; it only shows up as the fallback turn.
    pub fn on_failure(&mut self, conversation: ConversationId) -> bool {
        if !self.awaits(conversation) {
            return false;
        }
        self.append(Role::Assistant, FALLBACK_ANSWER.to_string(), None, None);
        self.pending = false;
        true
    }

    fn awaits(&self, conversation: ConversationId) -> bool {
        conversation == self.id && self.pending
    }

    fn append(
        &mut self,
        role: Role,
        content: String,
        sources: Option<Vec<SourceFragment>>,
        confidence: Option<Confidence>,
    ) {
        let id = self.next_message_id;
        self.next_message_id += 1;
        self.messages.push(Message {
            id,
            role,
            content,
            sources,
            confidence,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_trims_and_clears_input() {
        let mut conversation = ConversationState::new(1, "a.pdf");
        conversation.set_input("  hello  ");
        let effects = conversation.submit(None);

        assert_eq!(
            effects,
            vec![Effect::Query {
                conversation: 1,
                text: "hello".to_string()
            }]
        );
        assert_eq!(conversation.messages()[0].content(), "hello");
        assert!(conversation.input().is_empty());
        assert!(conversation.is_pending());
    }

    #[test]
    fn empty_override_falls_back_to_input() {
        let mut conversation = ConversationState::new(1, "a.pdf");
        conversation.set_input("typed");
        conversation.submit(Some(""));
        assert_eq!(conversation.messages()[0].content(), "typed");
    }

    #[test]
    fn empty_source_list_is_dropped() {
        let mut conversation = ConversationState::new(1, "a.pdf");
        conversation.submit(Some("q"));
        conversation.on_answer(
            1,
            QueryAnswer {
                answer: "a".to_string(),
                sources: Some(Vec::new()),
                confidence: None,
            },
        );
        assert_eq!(conversation.messages()[1].sources(), None);
    }

    #[test]
    fn message_ids_are_sequential() {
        let mut conversation = ConversationState::new(1, "a.pdf");
        conversation.submit(Some("q"));
        conversation.on_failure(1);
        let ids: Vec<_> = conversation.messages().iter().map(Message::id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn confidence_labels_parse_case_insensitively() {
        assert_eq!(Confidence::parse("HIGH"), Some(Confidence::High));
        assert_eq!(Confidence::parse("unsure"), None);
    }
}
