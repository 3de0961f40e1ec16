use crate::{AppState, Effect, Msg, Screen};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FileSelected { name } => {
            if state.screen != Screen::Upload {
                return (state, Vec::new());
            }
            let effects = state.upload.select_file(&name);
            if !effects.is_empty() {
                state.mark_dirty();
            }
            effects
        }
        Msg::StepTick { session } => {
            if state.upload.on_step_tick(session) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::ProgressTick { session } => {
            if state.upload.on_progress_tick(session) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::IngestSucceeded { session } => {
            let effects = state.upload.on_ingest_succeeded(session);
            if !effects.is_empty() {
                state.mark_dirty();
            }
            effects
        }
        Msg::IngestFailed { session, message } => {
            let effects = state.upload.on_ingest_failed(session, message);
            if !effects.is_empty() {
                state.mark_dirty();
            }
            effects
        }
        Msg::CompletionDelayElapsed { session } => {
            if state.screen == Screen::Upload {
                if let Some(filename) = state.upload.take_handoff(session) {
                    state.enter_chat(filename);
                }
            }
            Vec::new()
        }
        Msg::ResetClicked => {
            if state.screen == Screen::Upload && state.upload.reset() {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::InputChanged(text) => {
            let changed = state
                .conversation
                .as_mut()
                .is_some_and(|conversation| conversation.set_input(text));
            if changed {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::Submitted => submit(&mut state, None),
        Msg::SuggestionClicked(text) => {
            let offered = state
                .conversation
                .as_ref()
                .is_some_and(|conversation| conversation.suggestions_visible());
            if offered {
                submit(&mut state, Some(&text))
            } else {
                Vec::new()
            }
        }
        Msg::QueryAnswered {
            conversation,
            answer,
        } => {
            let appended = state
                .conversation
                .as_mut()
                .is_some_and(|current| current.on_answer(conversation, answer));
            if appended {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::QueryFailed { conversation } => {
            let appended = state
                .conversation
                .as_mut()
                .is_some_and(|current| current.on_failure(conversation));
            if appended {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::SourcesToggled(id) => {
            let has_sources = state
                .conversation
                .as_ref()
                .and_then(|conversation| conversation.message(id))
                .is_some_and(|message| message.has_sources());
            if has_sources {
                state.disclosure.toggle(id);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::BackToUpload => {
            if state.screen == Screen::Chat {
                state.leave_chat();
            }
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn submit(state: &mut AppState, override_text: Option<&str>) -> Vec<Effect> {
    let Some(conversation) = state.conversation.as_mut() else {
        return Vec::new();
    };
    let effects = conversation.submit(override_text);
    if !effects.is_empty() {
        state.mark_dirty();
    }
    effects
}
