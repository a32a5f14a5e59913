use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use docqa_core::{update, AppState, Msg, UploadedFile};
use docqa_logging::{qa_info, qa_warn};

use super::commands::{Command, CommandParser, HELP_TEXT};
use super::effects::{EffectRunner, EffectSink};
use super::logging;
use super::render;
use super::settings::{AppSettings, BASE_URL_ENV};

const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);
const BUSY_NOTICE: &str = "A request is already in progress; wait for it to finish.";
const PASTE_PROMPT: &str = "Pasting; finish with a line containing only `.`";

/// Everything the dispatch loop reacts to.
pub enum AppEvent {
    Msg(Msg),
    Notice(String),
    Show,
    Quit,
    /// Standard input reached its end. The loop exits once nothing is in flight.
    InputClosed,
}

pub fn run_app() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("resolving working directory")?;
    let settings =
        AppSettings::load(&cwd)?.with_base_url_override(std::env::var(BASE_URL_ENV).ok());
    logging::initialize(&settings.log_options()?);
    let backend_settings = settings.backend_settings()?;
    qa_info!("Starting docqa against {}", backend_settings.base_url);

    let (app_tx, app_rx) = mpsc::channel::<AppEvent>();
    let runner = EffectRunner::new(backend_settings.clone(), app_tx.clone())
        .context("starting request engine")?;

    println!("docqa - ask questions about a document");
    match runner.check_health(HEALTH_CHECK_TIMEOUT) {
        Ok(status) => println!("Backend {}: {}", backend_settings.base_url, status),
        Err(failure) => {
            qa_warn!("Health check failed: {}", failure);
            println!(
                "Backend {} is not reachable ({}); requests will fail until it is up.",
                backend_settings.base_url, failure
            );
        }
    }
    println!("Type `help` for commands.");

    spawn_input_reader(app_tx);

    let mut shell = Shell::new(runner, io::stdout());
    shell.print_view();
    shell.run(app_rx);
    qa_info!("docqa exiting");
    Ok(())
}

struct Shell<S, W> {
    state: AppState,
    sink: S,
    out: W,
}

impl<S: EffectSink, W: Write> Shell<S, W> {
    fn new(sink: S, out: W) -> Self {
        Self {
            state: AppState::new(),
            sink,
            out,
        }
    }

    fn run(&mut self, app_rx: mpsc::Receiver<AppEvent>) {
        let mut input_closed = false;
        while let Ok(first) = app_rx.recv() {
            // Drain whatever else is queued so one batch renders once.
            let mut batch = vec![first];
            batch.extend(app_rx.try_iter());

            let mut show = false;
            let mut quit = false;
            for event in batch {
                match event {
                    AppEvent::Msg(msg) => self.dispatch_msg(msg),
                    AppEvent::Notice(text) => self.say(&text),
                    AppEvent::Show => show = true,
                    AppEvent::Quit => quit = true,
                    AppEvent::InputClosed => {
                        input_closed = true;
                        if let Some(operation) = self.state.in_flight() {
                            qa_info!("Input closed; waiting for {:?} to finish", operation);
                        }
                    }
                }
            }

            if self.state.consume_dirty() || show {
                self.print_view();
            }
            if quit {
                if let Some(operation) = self.state.in_flight() {
                    qa_warn!("Exiting with {:?} still outstanding", operation);
                }
                break;
            }
            if input_closed && self.state.in_flight().is_none() {
                break;
            }
        }
    }

    fn dispatch_msg(&mut self, msg: Msg) {
        let is_submit = matches!(msg, Msg::ProcessClicked | Msg::AskClicked);
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;

        if is_submit && effects.is_empty() {
            qa_info!("Submission ignored while {:?} is outstanding", self.state.in_flight());
            self.say(BUSY_NOTICE);
            return;
        }
        for alert in self.sink.enqueue(effects) {
            self.say(&format!("! {}", alert.hint()));
        }
    }

    fn say(&mut self, text: &str) {
        let _ = writeln!(self.out, "{text}");
        let _ = self.out.flush();
    }

    fn print_view(&mut self) {
        for line in render::render(&self.state.view()) {
            let _ = writeln!(self.out, "{line}");
        }
        let _ = self.out.flush();
    }
}

fn spawn_input_reader(app_tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        let mut parser = CommandParser::new();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    qa_warn!("Failed to read input: {}", err);
                    break;
                }
            };
            let was_pasting = parser.is_pasting();
            let Some(command) = parser.feed(&line) else {
                if parser.is_pasting() && !was_pasting {
                    let _ = app_tx.send(AppEvent::Notice(PASTE_PROMPT.to_string()));
                }
                continue;
            };
            let quit = command == Command::Quit;
            for event in events_for(command) {
                if app_tx.send(event).is_err() {
                    return;
                }
            }
            if quit {
                return;
            }
        }
        if let Some(command) = parser.finish() {
            for event in events_for(command) {
                let _ = app_tx.send(event);
            }
        }
        // End of input is not a quit: piped sessions still see their last reply.
        let _ = app_tx.send(AppEvent::InputClosed);
    });
}

fn events_for(command: Command) -> Vec<AppEvent> {
    match command {
        Command::SelectFile(path) => match read_upload(&path) {
            Ok(file) => vec![AppEvent::Msg(Msg::FileSelected(file))],
            Err(err) => vec![AppEvent::Notice(format!("! {err:#}"))],
        },
        Command::SetText(text) => vec![AppEvent::Msg(Msg::TextEdited(text))],
        Command::Process => vec![AppEvent::Msg(Msg::ProcessClicked)],
        Command::Ask(Some(question)) => vec![
            AppEvent::Msg(Msg::QueryEdited(question)),
            AppEvent::Msg(Msg::AskClicked),
        ],
        Command::Ask(None) => vec![AppEvent::Msg(Msg::AskClicked)],
        Command::Show => vec![AppEvent::Show],
        Command::Help => vec![AppEvent::Notice(HELP_TEXT.to_string())],
        Command::Quit => vec![AppEvent::Quit],
        Command::Invalid(message) => vec![AppEvent::Notice(format!("! {message}"))],
    }
}

fn read_upload(path: &Path) -> anyhow::Result<UploadedFile> {
    let bytes = fs::read(path).with_context(|| format!("could not read {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .with_context(|| format!("{} does not name a file", path.display()))?;
    Ok(UploadedFile::new(filename, bytes))
}
