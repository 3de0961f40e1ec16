use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use docchat_core::{update, AppState, Msg, Screen, UploadStatus, SUGGESTED_QUESTIONS};
use docchat_engine::UploadFile;
use docchat_logging::{docchat_info, docchat_warn};

use super::config::{AppConfig, Cli};
use super::effects::EffectRunner;
use super::logging;
use super::ui::commands::{self, Command};
use super::ui::constants::{ACCEPTED_EXTENSIONS, HELP_TEXT, INPUT_POLL_MS};
use super::ui::render::{Frame, Renderer};

pub fn run_app(cli: Cli) -> anyhow::Result<()> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_cli(&cli);
    logging::initialize(config.log_destination);
    docchat_info!("Starting docchat against {}", config.endpoint_base);

    let runner = EffectRunner::new(config.gateway_settings()).context("starting engine")?;
    let state = AppState::with_timing(config.timing.to_progress_timing());
    let mut shell = Shell::new(state, runner);
    let input = spawn_stdin_reader();

    shell.render();
    if let Some(path) = cli.file {
        shell.handle_command(Command::Upload(path));
    }
    shell.run(input)
}

/// Host shell: owns the state, feeds it messages and prints the results.
struct Shell {
    state: AppState,
    runner: EffectRunner,
    inbox: VecDeque<Msg>,
    renderer: Renderer,
    status_visible: bool,
    quit: bool,
}

impl Shell {
    fn new(state: AppState, runner: EffectRunner) -> Self {
        Self {
            state,
            runner,
            inbox: VecDeque::new(),
            renderer: Renderer::new(),
            status_visible: false,
            quit: false,
        }
    }

    fn run(&mut self, input: mpsc::Receiver<String>) -> anyhow::Result<()> {
        let poll = Duration::from_millis(INPUT_POLL_MS);
        let mut input_open = true;
        while !self.quit {
            while input_open {
                match input.try_recv() {
                    Ok(line) => self.handle_line(&line),
                    Err(mpsc::TryRecvError::Empty) => break,
                    Err(mpsc::TryRecvError::Disconnected) => {
                        docchat_info!("Input closed");
                        input_open = false;
                    }
                }
            }
            // Without input, stay only until outstanding engine work settles.
            if !input_open && !self.state.has_work_in_flight() {
                break;
            }
            if let Some(msg) = self.runner.next_msg(poll) {
                self.inbox.push_back(msg);
            }
            self.drain_inbox();
        }
        self.finish_status_line();
        Ok(())
    }

    fn handle_line(&mut self, line: &str) {
        match commands::parse(line) {
            Ok(command) => self.handle_command(command),
            Err(usage) => self.say(&usage),
        }
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Upload(path) => self.select_file(&path),
            Command::Text(text) => match self.state.screen() {
                Screen::Upload => self.select_file(Path::new(&text)),
                Screen::Chat => {
                    self.inbox.push_back(Msg::InputChanged(text));
                    self.inbox.push_back(Msg::Submitted);
                }
            },
            Command::Suggest(index) => match SUGGESTED_QUESTIONS.get(index - 1) {
                Some(question) => self
                    .inbox
                    .push_back(Msg::SuggestionClicked((*question).to_string())),
                None => self.say("no such suggestion"),
            },
            Command::Sources(id) => self.inbox.push_back(Msg::SourcesToggled(id)),
            Command::Reset => self.inbox.push_back(Msg::ResetClicked),
            Command::Back => self.inbox.push_back(Msg::BackToUpload),
            Command::Help => self.say(HELP_TEXT),
            Command::Quit => self.quit = true,
            Command::Empty => {}
        }
        self.drain_inbox();
    }

    /// Stands in for the drop zone: only accepted document types get through.
    fn select_file(&mut self, path: &Path) {
        if self.state.screen() != Screen::Upload {
            self.say("type /back first to upload another document");
            return;
        }
        if matches!(
            self.state.upload().status(),
            UploadStatus::Uploading | UploadStatus::Success
        ) {
            self.say("an upload is already in progress");
            return;
        }
        let accepted = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                ACCEPTED_EXTENSIONS
                    .iter()
                    .any(|accepted| accepted.eq_ignore_ascii_case(ext))
            });
        if !accepted {
            self.say("only PDF and TXT documents are accepted");
            return;
        }

        match UploadFile::from_path(path) {
            Ok(file) => {
                let name = file.filename.clone();
                self.runner.stage_file(file);
                self.inbox.push_back(Msg::FileSelected { name });
            }
            Err(err) => {
                docchat_warn!("Could not read {:?}: {}", path, err);
                self.say(&format!("could not read {}: {}", path.display(), err.message));
            }
        }
    }

    fn drain_inbox(&mut self) {
        while let Some(msg) = self.inbox.pop_front() {
            let state = std::mem::take(&mut self.state);
            let (state, effects) = update(state, msg);
            self.state = state;
            self.inbox.extend(self.runner.enqueue(effects));
        }
        if self.state.consume_dirty() {
            self.render();
        }
    }

    fn render(&mut self) {
        let frame = self.renderer.frame(&self.state.view());
        self.print(frame);
    }

    fn print(&mut self, frame: Frame) {
        let mut out = io::stdout().lock();
        if !frame.lines.is_empty() {
            if self.status_visible {
                let _ = writeln!(out);
                self.status_visible = false;
            }
            for line in &frame.lines {
                let _ = writeln!(out, "{line}");
            }
        }
        if let Some(status) = frame.status {
            // Redraw the progress line in place.
            let _ = write!(out, "\r\x1b[2K{status}");
            self.status_visible = true;
        }
        let _ = out.flush();
    }

    fn say(&mut self, text: &str) {
        self.print(Frame {
            status: None,
            lines: vec![text.to_string()],
        });
    }

    fn finish_status_line(&mut self) {
        if self.status_visible {
            println!();
            self.status_visible = false;
        }
    }
}

fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}
