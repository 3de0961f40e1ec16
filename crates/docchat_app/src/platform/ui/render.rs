use std::collections::BTreeSet;

use docchat_core::{
    AppViewModel, ChatView, MessageId, MessageView, Role, Screen, StepState, UploadStatus,
    UploadView,
};

use super::constants::PROGRESS_BAR_WIDTH;

/// Output produced for one view update.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame {
    /// Transient line redrawn in place (upload progress).
    pub status: Option<String>,
    /// Lines appended to the transcript.
    pub lines: Vec<String>,
}

/// Turns successive view models into terminal output, printing only what changed.
#[derive(Debug, Default)]
pub struct Renderer {
    screen: Option<Screen>,
    last_status: Option<String>,
    printed: BTreeSet<MessageId>,
    expanded: BTreeSet<MessageId>,
    pending_shown: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame(&mut self, view: &AppViewModel) -> Frame {
        let mut frame = Frame::default();
        if self.screen != Some(view.screen) {
            self.screen = Some(view.screen);
            self.last_status = None;
            self.printed.clear();
            self.expanded.clear();
            self.pending_shown = false;
            frame.lines.extend(header(view));
        }

        match (view.screen, view.chat.as_ref()) {
            (Screen::Chat, Some(chat)) => self.chat(chat, &mut frame),
            _ => self.upload(&view.upload, &mut frame),
        }
        frame
    }

    fn upload(&mut self, upload: &UploadView, frame: &mut Frame) {
        let status = upload_status(upload);
        if status == self.last_status {
            return;
        }
        self.last_status = status.clone();
        match upload.status {
            UploadStatus::Uploading => frame.status = status,
            _ => frame.lines.extend(status),
        }
    }

    fn chat(&mut self, chat: &ChatView, frame: &mut Frame) {
        for message in &chat.messages {
            if self.printed.insert(message.id) {
                frame.lines.extend(message_lines(message));
            }
            let was_expanded = self.expanded.contains(&message.id);
            if message.sources_expanded != was_expanded {
                if message.sources_expanded {
                    self.expanded.insert(message.id);
                    frame.lines.extend(source_lines(message));
                } else {
                    self.expanded.remove(&message.id);
                    frame.lines.push(format!("  (sources of #{} hidden)", message.id));
                }
            }
        }

        if chat.pending && !self.pending_shown {
            frame.lines.push("  ... thinking".to_string());
        }
        self.pending_shown = chat.pending;
    }
}

fn header(view: &AppViewModel) -> Vec<String> {
    match (view.screen, view.chat.as_ref()) {
        (Screen::Chat, Some(chat)) => {
            let mut lines = vec![format!(
                "I've analyzed {}. Ask me anything about its contents!",
                chat.filename
            )];
            for (index, suggestion) in chat.suggestions.iter().enumerate() {
                lines.push(format!("  /suggest {}  {}", index + 1, suggestion.text));
            }
            lines
        }
        _ => vec!["Upload your document: type a path to a PDF or TXT file.".to_string()],
    }
}

pub fn upload_status(upload: &UploadView) -> Option<String> {
    match upload.status {
        UploadStatus::Idle => None,
        UploadStatus::Uploading => {
            let step = upload
                .steps
                .iter()
                .find(|step| step.state == StepState::Active)
                .map(|step| step.label)
                .unwrap_or_default();
            Some(format!(
                "{} {} {:>3}%  {}...",
                upload.filename,
                progress_bar(upload.progress),
                upload.progress,
                step
            ))
        }
        UploadStatus::Success => Some(format!(
            "{} {} 100%  ready",
            upload.filename,
            progress_bar(100)
        )),
        UploadStatus::Error => Some(format!(
            "Upload of {} failed: {}. Type /reset to try again.",
            upload.filename,
            upload.error_message.as_deref().unwrap_or_default()
        )),
    }
}

fn progress_bar(progress: u8) -> String {
    let filled = PROGRESS_BAR_WIDTH * usize::from(progress.min(100)) / 100;
    format!(
        "[{}{}]",
        "#".repeat(filled),
        "-".repeat(PROGRESS_BAR_WIDTH - filled)
    )
}

fn message_lines(message: &MessageView) -> Vec<String> {
    let speaker = match message.role {
        Role::User => "you",
        Role::Assistant => "assistant",
    };
    let mut lines = vec![format!("[#{}] {}: {}", message.id, speaker, message.content)];
    let mut notes = Vec::new();
    if let Some(confidence) = message.confidence {
        notes.push(format!("confidence {}", confidence.as_str()));
    }
    if !message.sources.is_empty() {
        notes.push(format!(
            "{} sources, /sources {} to view",
            message.sources.len(),
            message.id
        ));
    }
    if !notes.is_empty() {
        lines.push(format!("  ({})", notes.join("; ")));
    }
    lines
}

fn source_lines(message: &MessageView) -> Vec<String> {
    message
        .sources
        .iter()
        .enumerate()
        .map(|(index, source)| {
            format!(
                "  {}. {} p.{}: {}",
                index + 1,
                source.source,
                source.page,
                source.text
            )
        })
        .collect()
}
