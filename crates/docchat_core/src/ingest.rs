use crate::{Effect, ProgressTiming, STEP_COUNT};

/// Generation id of one upload attempt. Every tick and completion carries the id
/// of the attempt that produced it; anything else is stale and ignored.
pub type SessionId = u64;

/// Labels of the simulated ingestion phases, indexed by `active_step - 1`.
pub const STEP_LABELS: [&str; STEP_COUNT as usize] =
    ["Extracting text", "Analyzing content", "Building index"];

/// Shown when an ingest failure carries no usable message.
pub const GENERIC_UPLOAD_ERROR: &str = "Upload failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadStatus {
    #[default]
    Idle,
    Uploading,
    Success,
    Error,
}

/// Ingestion session controller.
///
/// Owns one upload attempt at a time and reconciles the simulated step/progress
/// tickers with the real completion of the `ingest` call. The real completion
/// always wins: once the status leaves `Uploading`, ticks are inert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSession {
    status: UploadStatus,
    filename: String,
    progress: u8,
    active_step: u8,
    error_message: String,
    session: SessionId,
    tickers_running: bool,
    handoff_pending: bool,
    timing: ProgressTiming,
}

impl Default for UploadSession {
    fn default() -> Self {
        Self::new(ProgressTiming::default())
    }
}

impl UploadSession {
    pub fn new(timing: ProgressTiming) -> Self {
        Self {
            status: UploadStatus::Idle,
            filename: String::new(),
            progress: 0,
            active_step: 1,
            error_message: String::new(),
            session: 0,
            tickers_running: false,
            handoff_pending: false,
            timing,
        }
    }

    pub fn status(&self) -> UploadStatus {
        self.status
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn active_step(&self) -> u8 {
        self.active_step
    }

    /// Set only while the status is `Error`.
    pub fn error_message(&self) -> Option<&str> {
        (self.status == UploadStatus::Error).then_some(self.error_message.as_str())
    }

    /// Id of the most recent upload attempt (0 before the first one).
    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Begins a new upload attempt. Ignored unless the session is `Idle` or
    /// `Error`; there is no queued retry while an attempt is in flight.
    pub fn select_file(&mut self, name: &str) -> Vec<Effect> {
        match self.status {
            UploadStatus::Idle | UploadStatus::Error => {}
            UploadStatus::Uploading | UploadStatus::Success => return Vec::new(),
        }

        self.session += 1;
        self.status = UploadStatus::Uploading;
        self.filename = name.to_string();
        self.progress = 0;
        self.active_step = 1;
        self.error_message.clear();
        self.tickers_running = true;
        self.handoff_pending = false;

        vec![
            Effect::StartTickers {
                session: self.session,
                timing: self.timing,
            },
            Effect::Ingest {
                session: self.session,
                filename: self.filename.clone(),
            },
        ]
    }

    /// Advances the highlighted phase. Returns whether anything changed.
    pub fn on_step_tick(&mut self, session: SessionId) -> bool {
        if !self.accepts_ticks(session) || self.active_step >= STEP_COUNT {
            return false;
        }
        self.active_step += 1;
        true
    }

    /// Advances the simulated progress bar. Returns whether anything changed.
    pub fn on_progress_tick(&mut self, session: SessionId) -> bool {
        if !self.accepts_ticks(session) {
            return false;
        }
        let ceiling = self.timing.effective_ceiling();
        let next = self
            .progress
            .saturating_add(self.timing.progress_increment)
            .min(ceiling)
            .max(self.progress);
        if next == self.progress {
            return false;
        }
        self.progress = next;
        true
    }

    pub fn on_ingest_succeeded(&mut self, session: SessionId) -> Vec<Effect> {
        if !self.is_outstanding(session) {
            return Vec::new();
        }
        let mut effects = self.stop_tickers();
        self.progress = 100;
        self.active_step = STEP_COUNT;
        self.status = UploadStatus::Success;
        self.handoff_pending = true;
        effects.push(Effect::ScheduleHandoff {
            session,
            delay: self.timing.handoff_delay,
        });
        effects
    }

    pub fn on_ingest_failed(&mut self, session: SessionId, message: Option<String>) -> Vec<Effect> {
        if !self.is_outstanding(session) {
            return Vec::new();
        }
        let effects = self.stop_tickers();
        self.status = UploadStatus::Error;
        self.error_message = message
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| GENERIC_UPLOAD_ERROR.to_string());
        effects
    }

    /// Consumes the pending hand-off of a successful attempt, yielding the
    /// accepted filename exactly once.
    pub fn take_handoff(&mut self, session: SessionId) -> Option<String> {
        if session != self.session || self.status != UploadStatus::Success || !self.handoff_pending
        {
            return None;
        }
        self.handoff_pending = false;
        Some(self.filename.clone())
    }

    /// Returns to `Idle`. Ignored while `Uploading` and while a successful
    /// attempt still owes its hand-off. Returns whether anything changed.
    pub fn reset(&mut self) -> bool {
        if self.status == UploadStatus::Uploading || self.handoff_pending {
            return false;
        }
        let before = (self.status, self.filename.is_empty(), self.progress, self.active_step);
        self.status = UploadStatus::Idle;
        self.filename.clear();
        self.progress = 0;
        self.active_step = 1;
        self.error_message.clear();
        self.handoff_pending = false;
        before != (UploadStatus::Idle, true, 0, 1)
    }

    fn is_outstanding(&self, session: SessionId) -> bool {
        session == self.session && self.status == UploadStatus::Uploading
    }

    fn accepts_ticks(&self, session: SessionId) -> bool {
        self.is_outstanding(session) && self.tickers_running
    }

    fn stop_tickers(&mut self) -> Vec<Effect> {
        if !self.tickers_running {
            return Vec::new();
        }
        self.tickers_running = false;
        vec![Effect::CancelTickers {
            session: self.session,
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uploading(name: &str) -> UploadSession {
        let mut session = UploadSession::default();
        session.select_file(name);
        session
    }

    #[test]
    fn progress_stops_at_ceiling() {
        let mut session = uploading("a.pdf");
        let id = session.session();
        for _ in 0..200 {
            session.on_progress_tick(id);
        }
        assert_eq!(session.progress(), 95);
        assert!(!session.on_progress_tick(id));
    }

    #[test]
    fn ceiling_is_clamped_below_hundred() {
        let timing = ProgressTiming {
            progress_ceiling: 100,
            progress_increment: 50,
            ..ProgressTiming::default()
        };
        let mut session = UploadSession::new(timing);
        session.select_file("a.pdf");
        let id = session.session();
        for _ in 0..5 {
            session.on_progress_tick(id);
        }
        assert_eq!(session.progress(), 99);
    }

    #[test]
    fn step_stops_at_last_phase() {
        let mut session = uploading("a.pdf");
        let id = session.session();
        assert!(session.on_step_tick(id));
        assert!(session.on_step_tick(id));
        assert!(!session.on_step_tick(id));
        assert_eq!(session.active_step(), STEP_COUNT);
    }

    #[test]
    fn blank_failure_message_falls_back() {
        let mut session = uploading("a.pdf");
        let id = session.session();
        session.on_ingest_failed(id, Some("   ".to_string()));
        assert_eq!(session.error_message(), Some(GENERIC_UPLOAD_ERROR));
    }

    #[test]
    fn reset_is_ignored_while_uploading() {
        let mut session = uploading("a.pdf");
        assert!(!session.reset());
        assert_eq!(session.status(), UploadStatus::Uploading);
    }

    #[test]
    fn reset_waits_for_the_handoff() {
        let mut session = uploading("a.pdf");
        let id = session.session();
        session.on_ingest_succeeded(id);
        assert!(!session.reset());
        assert_eq!(session.status(), UploadStatus::Success);
        assert_eq!(session.progress(), 100);

        assert_eq!(session.take_handoff(id), Some("a.pdf".to_string()));
        assert!(session.reset());
        assert_eq!(session.status(), UploadStatus::Idle);
    }
}
